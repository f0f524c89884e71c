use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 微信用户信息
///
/// 后端登录接口返回并缓存在本地的用户档案。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WxUserInfo {
    pub id: i64,
    pub openid: String,
    pub nickname: String,
    pub avatar: String,

    /// 绑定手机号 (可选,通过手机号授权流程获取)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// 持有票券数量
    pub ticket_count: u32,

    /// 最近登录时间 (本地过期判断的依据)
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl WxUserInfo {
    /// 距最近登录的天数
    ///
    /// last_login 缺失时返回 None,由调用方决定是否视为过期。
    pub fn days_since_last_login(&self, now: DateTime<Utc>) -> Option<f64> {
        self.last_login
            .map(|last| (now - last).num_seconds() as f64 / 86_400.0)
    }
}

/// 用户会话
///
/// 不变式: token 与用户信息同存同亡,不存在半截会话。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    pub token: String,
    pub user: WxUserInfo,
}

/// 登录结果
///
/// 业务层失败不抛错,以结构化结果返回,便于前端内联展示。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WxLoginResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<WxUserInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WxLoginResult {
    /// 登录成功
    pub fn ok(user: WxUserInfo, token: String) -> Self {
        Self {
            success: true,
            user: Some(user),
            token: Some(token),
            message: None,
        }
    }

    /// 登录失败 (携带可展示文案)
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            token: None,
            message: Some(message.into()),
        }
    }
}

/// 手机号获取结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WxPhoneResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WxPhoneResult {
    pub fn ok(phone: String) -> Self {
        Self {
            success: true,
            phone: Some(phone),
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            phone: None,
            message: Some(message.into()),
        }
    }
}

/// 微信登录请求参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatLoginParams {
    /// 一次性登录凭证
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// 微信登录响应数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatLoginData {
    pub user: WxUserInfo,
    pub token: String,
}

/// 手机号接口响应数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatPhoneData {
    pub phone: String,
    /// 绑定手机号后刷新的用户信息
    pub user: WxUserInfo,
}
