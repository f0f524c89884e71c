//! 服务层模块
//!
//! 包含所有业务逻辑服务:
//! - `config_service`: 解析环境标志与 `.env` 覆盖项,产出API配置
//! - `whitelist`: 出站请求的域名白名单闸门
//! - `error_classifier`: 平台错误码/HTTP状态码到文案与重试裁决的映射
//! - `activity_logger`: 有界持久化的网络活动日志 (诊断旁路)
//! - `request_dispatcher`: 唯一的出站HTTP通道,负责超时/重试/退避
//! - `wechat_api`: 请求调度器之上的类型化业务端点
//! - `session_store`: 登录会话的本地缓存与服务端校验
//! - `auth_service`: 微信登录编排 (授权 -> 凭证 -> 后端换取)
//!
//! # 服务架构
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            WxAuthService                  │
//! │  ┌──────────────┐    ┌────────────────┐  │
//! │  │ SessionStore │    │ WechatApiClient │  │
//! │  └──────┬───────┘    └───────┬────────┘  │
//! │         │                    │           │
//! │  ┌──────▼────────────────────▼────────┐  │
//! │  │         RequestDispatcher          │  │
//! │  │  (whitelist + retry + classifier)  │  │
//! │  └──────────────┬─────────────────────┘  │
//! │                 │                        │
//! │         ┌───────▼────────┐               │
//! │         │ ActivityLogger │               │
//! │         └───────┬────────┘               │
//! └─────────────────┼────────────────────────┘
//!                   ▼
//!              KvStorage
//! ```

pub mod activity_logger;
pub mod auth_service;
pub mod config_service;
pub mod error_classifier;
pub mod request_dispatcher;
pub mod session_store;
pub mod wechat_api;
pub mod whitelist;

// 重导出常用类型,简化外部引用
pub use activity_logger::ActivityLogger;
pub use auth_service::{LoginFlow, LoginState, UserProfile, WechatPlatform, WxAuthService};
pub use config_service::ConfigService;
pub use error_classifier::ErrorVerdict;
pub use request_dispatcher::{ApiResponse, HttpMethod, RequestDescriptor, RequestDispatcher};
pub use session_store::SessionStore;
pub use wechat_api::{WechatApiClient, WechatApiResponse};
pub use whitelist::DomainWhitelist;
