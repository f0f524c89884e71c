use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{PlatformError, WechatLoginParams, WxLoginResult, WxPhoneResult};
use crate::services::session_store::SessionStore;
use crate::services::wechat_api::WechatApiClient;

/// 用户授权信息 (宿主平台返回)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub nickname: String,
    pub avatar_url: String,
}

/// 小程序宿主平台能力
///
/// 登录编排器与宿主运行时之间的边界: 授权弹窗与登录凭证
/// 都由宿主提供。生产环境对接真实运行时,测试注入模拟实现。
#[async_trait]
pub trait WechatPlatform: Send + Sync {
    /// 请求用户资料授权
    ///
    /// `desc` 为授权弹窗中展示的用途说明。
    async fn get_user_profile(&self, desc: &str) -> Result<UserProfile, PlatformError>;

    /// 获取一次性登录凭证 (code)
    async fn login(&self) -> Result<String, PlatformError>;
}

/// 登录流程状态
///
/// 线性推进,无回边:
/// Start -> AwaitingUserConsent -> AwaitingLoginCredential
///       -> AwaitingBackendExchange -> Success | Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginState {
    Start,
    AwaitingUserConsent,
    AwaitingLoginCredential,
    AwaitingBackendExchange,
    Success,
    Failed,
}

/// 登录流程记录
///
/// 追踪一次登录从发起到终态的状态与时间点。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginFlow {
    pub state: LoginState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl LoginFlow {
    pub fn new() -> Self {
        Self {
            state: LoginState::Start,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// 推进到下一阶段
    pub fn advance(&mut self, state: LoginState) {
        tracing::debug!(from = ?self.state, to = ?state, "登录流程推进");
        self.state = state;
        if self.is_final() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// 是否已到终态
    pub fn is_final(&self) -> bool {
        matches!(self.state, LoginState::Success | LoginState::Failed)
    }

    /// 流程耗时 (秒)
    pub fn duration_seconds(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_seconds()
    }
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// 登录编排器
///
/// 串联三步握手: 用户授权 -> 登录凭证 -> 后端换取会话。
/// 单趟顺序执行,本层不做重试 — 重试已在请求调度器内完成。
pub struct WxAuthService {
    platform: Arc<dyn WechatPlatform>,
    api: Arc<WechatApiClient>,
    session_store: Arc<SessionStore>,
}

impl WxAuthService {
    pub fn new(
        platform: Arc<dyn WechatPlatform>,
        api: Arc<WechatApiClient>,
        session_store: Arc<SessionStore>,
    ) -> Self {
        Self {
            platform,
            api,
            session_store,
        }
    }

    /// 微信一键登录
    ///
    /// 业务失败不抛错,返回 `success:false` 与可展示文案。
    pub async fn login(&self) -> WxLoginResult {
        let mut flow = LoginFlow::new();
        tracing::info!("开始微信登录流程");

        // 1. 获取用户授权
        flow.advance(LoginState::AwaitingUserConsent);
        let profile = match self.platform.get_user_profile("用于完善会员资料").await {
            Ok(profile) => profile,
            Err(error) => return self.fail(&mut flow, platform_failure_message(&error)),
        };
        tracing::debug!(nickname = %profile.nickname, "用户信息获取成功");

        // 2. 获取登录凭证
        flow.advance(LoginState::AwaitingLoginCredential);
        let code = match self.platform.login().await {
            Ok(code) if !code.is_empty() => code,
            Ok(_) | Err(PlatformError::MissingCredential) => {
                return self.fail(&mut flow, "获取登录凭证失败".to_string());
            }
            Err(error) => return self.fail(&mut flow, platform_failure_message(&error)),
        };
        tracing::debug!(code_len = code.len(), "登录凭证获取成功");

        // 3. 调用后端登录接口换取会话
        flow.advance(LoginState::AwaitingBackendExchange);
        let params = WechatLoginParams {
            code,
            nickname: Some(profile.nickname),
            avatar_url: Some(profile.avatar_url),
        };
        let result = self.api.login(&params).await;

        if result.success {
            let data = match result.data {
                Some(data) => data,
                None => return self.fail(&mut flow, "登录响应缺少用户数据".to_string()),
            };

            // 会话落盘失败不影响本次登录结果,但下次启动需要重新登录
            if let Err(error) = self.session_store.save(&data.user, &data.token) {
                tracing::warn!(错误 = %error, "登录信息保存失败");
            }

            flow.advance(LoginState::Success);
            tracing::info!(
                user_id = data.user.id,
                耗时秒 = flow.duration_seconds(),
                "微信登录成功"
            );
            return WxLoginResult::ok(data.user, data.token);
        }

        // 业务失败: 特判域名配置类错误
        let message = match result.error_code.as_deref() {
            Some("6000100") => {
                "网络请求失败(6000100)：\n请检查域名配置或网络连接，\n或联系技术支持".to_string()
            }
            _ => result
                .message
                .unwrap_or_else(|| "登录失败，请重试".to_string()),
        };
        self.fail(&mut flow, message)
    }

    /// 获取微信绑定手机号
    ///
    /// 需要已有会话;成功后用刷新的用户信息与原token更新本地缓存。
    pub async fn fetch_phone_number(&self, code: &str) -> WxPhoneResult {
        if code.is_empty() {
            return WxPhoneResult::fail("获取手机号授权失败");
        }

        let (token, user) = match (
            self.session_store.current_token(),
            self.session_store.current_user(),
        ) {
            (Some(token), Some(user)) => (token, user),
            _ => return WxPhoneResult::fail("请先登录"),
        };

        let response = self.api.fetch_phone_number(code, &user.openid).await;
        if response.success {
            if let Some(data) = response.data {
                if let Err(error) = self.session_store.save(&data.user, &token) {
                    tracing::warn!(错误 = %error, "更新用户信息失败");
                }
                tracing::info!(openid = %data.user.openid, "手机号绑定成功");
                return WxPhoneResult::ok(data.phone);
            }
        }

        WxPhoneResult::fail(
            response
                .message
                .unwrap_or_else(|| "获取手机号失败，请重试".to_string()),
        )
    }

    fn fail(&self, flow: &mut LoginFlow, message: String) -> WxLoginResult {
        flow.advance(LoginState::Failed);
        tracing::warn!(
            耗时秒 = flow.duration_seconds(),
            原因 = %message,
            "微信登录失败"
        );
        WxLoginResult::fail(message)
    }
}

/// 平台错误的展示文案
fn platform_failure_message(error: &PlatformError) -> String {
    match error {
        PlatformError::UserCancelled => "用户取消授权，请重新尝试登录".to_string(),
        PlatformError::MissingCredential => "获取登录凭证失败".to_string(),
        PlatformError::System { code: 6000100, .. } => {
            "系统错误(6000100)：请检查网络连接或重新启动小程序".to_string()
        }
        PlatformError::System { raw_message, .. }
            if raw_message.contains("url not in domain list") =>
        {
            "网络配置错误，请联系技术支持".to_string()
        }
        PlatformError::System { .. } => "登录失败，请重试".to_string(),
    }
}
