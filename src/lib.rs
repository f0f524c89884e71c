//! 演唱会购票小程序核心库
//!
//! 提供小程序前端依赖的网络与登录会话能力:
//! - 环境配置解析与域名白名单
//! - 带超时/重试/指数退避的请求调度
//! - 错误分类 (平台错误码、HTTP状态码、原始签名)
//! - 有界持久化的网络活动日志
//! - 登录会话缓存 (7天本地有效期 + 服务端校验)
//! - 微信登录编排 (授权 -> 凭证 -> 后端换取会话)

pub mod models;
pub mod services;
pub mod utils;
