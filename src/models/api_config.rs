use serde::{Deserialize, Serialize};

/// 构建环境
///
/// 进程生命周期内选定一次,决定默认API地址、超时与域名白名单。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// 读取进程级环境标志
    ///
    /// 优先级: APP_ENV 环境变量 ("development" / "production"),
    /// 未设置时按构建配置推断 (debug构建视为开发环境)。
    pub fn current() -> Self {
        match std::env::var("APP_ENV").ok().as_deref() {
            Some("development") => Environment::Development,
            Some("production") => Environment::Production,
            _ => {
                if cfg!(debug_assertions) {
                    Environment::Development
                } else {
                    Environment::Production
                }
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// API配置
///
/// 不可变记录,进程内解析一次后不再变更。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// 接口基础地址
    pub base_url: String,

    /// 单次请求超时 (毫秒)
    pub timeout_ms: u64,

    /// 重试次数 (不含首次尝试)
    pub retry_count: u32,

    /// 所属环境
    pub environment: Environment,
}

impl ApiConfig {
    /// 各环境的内置默认配置
    pub fn defaults_for(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                base_url: "http://127.0.0.1:5000/api".to_string(),
                timeout_ms: 15_000, // 开发环境超时时间长一些,便于调试
                retry_count: 1,     // 开发环境重试次数少一些
                environment,
            },
            Environment::Production => Self {
                base_url: "https://test.3fenban.com/api".to_string(),
                timeout_ms: 10_000,
                retry_count: 3, // 生产环境多重试几次
                environment,
            },
        }
    }

    /// 拼接完整的API地址
    ///
    /// 端点缺少前导斜杠时自动补齐。
    pub fn build_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// 配置摘要 (用于日志)
    pub fn summary_for_logging(&self) -> String {
        format!(
            "env={} base_url={} timeout={}ms retry={}",
            self.environment.as_str(),
            self.base_url,
            self.timeout_ms,
            self.retry_count
        )
    }
}

/// API端点路径
pub mod endpoints {
    // 首页相关
    pub const BANNERS: &str = "/banners";
    pub const CONCERTS: &str = "/concerts";

    // 演唱会相关
    pub const CONCERT_DETAIL: &str = "/concert/detail";
    pub const CONCERT_INDEX: &str = "/concert/index";
    pub const CONCERT_SESSIONS: &str = "/concert/sessions";

    // 订单相关
    pub const ORDER_CREATE: &str = "/order/create";
    pub const ORDER_STATUS: &str = "/order/status";

    // 用户相关
    pub const USER_INFO: &str = "/user/info";
    pub const USER_UPDATE: &str = "/user/update";
    pub const USER_AUTH: &str = "/user/auth";

    // 支付相关
    pub const WECHAT_PAY_UNIFIEDORDER: &str = "/wechatpay/unifiedorder";

    // 票务相关
    pub const TICKETS: &str = "/tickets";
    pub const TICKET_VERIFY: &str = "/verify";

    // 微信登录相关
    pub const WECHAT_LOGIN: &str = "/wechat/login";
    pub const WECHAT_CHECK: &str = "/wechat/check";
    pub const WECHAT_PHONE: &str = "/wechat/phone";
}
