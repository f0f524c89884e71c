//! 数据模型模块
//!
//! 包含所有核心数据结构:
//! - errors: 错误类型定义 (网络、平台边界、存储错误)
//! - api_config: 环境与API配置 (端点表、地址拼接)
//! - user_session: 用户信息与登录会话 (过期判断、登录结果)
//! - activity_log: 网络活动日志条目 (有界环形序列的元素)
//! - ticket: 票券与核销二维码载荷 (当前为演示数据)

pub mod activity_log;
pub mod api_config;
pub mod errors;
pub mod ticket;
pub mod user_session;

// 重导出常用类型,简化外部引用
pub use activity_log::{ActivityKind, ActivityLogEntry, MAX_LOG_ENTRIES};
pub use api_config::{endpoints, ApiConfig, Environment};
pub use errors::{ApiError, PlatformError, StorageError};
pub use ticket::{QrCodeData, Ticket, TicketStatus};
pub use user_session::{
    UserSession, WechatLoginData, WechatLoginParams, WechatPhoneData, WxLoginResult,
    WxPhoneResult, WxUserInfo,
};
