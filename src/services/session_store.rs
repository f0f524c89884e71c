use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::models::{StorageError, UserSession, WxUserInfo};
use crate::services::wechat_api::WechatApiClient;
use crate::utils::KvStorage;

/// 存储键: 登录token
const TOKEN_KEY: &str = "wx_token";

/// 存储键: 用户信息
const USER_KEY: &str = "wx_user";

/// 本地登录态有效期 (天)
const LOGIN_EXPIRE_DAYS: i64 = 7;

/// 会话存储
///
/// 登录态的唯一权威来源。显式注入到需要认证状态的组件,
/// 不提供进程级全局单例。
///
/// 不变式: token 与用户信息同存同亡 — `load` 把半截数据视为无会话。
pub struct SessionStore {
    storage: Arc<KvStorage>,
    api: Arc<WechatApiClient>,
}

impl SessionStore {
    pub fn new(storage: Arc<KvStorage>, api: Arc<WechatApiClient>) -> Self {
        Self { storage, api }
    }

    /// 读取当前会话
    ///
    /// 判定顺序:
    /// 1. 任一键缺失 -> 无会话
    /// 2. 距最近登录超过7天 -> 本地清除,**不**发起服务端校验
    /// 3. 服务端校验未通过或出错 -> 清除并返回无会话
    /// 4. 校验通过 -> 返回会话
    ///
    /// 过期为懒检查,仅在访问时发生,无后台定时器。
    pub async fn load(&self) -> Option<UserSession> {
        let token: String = self.read_key(TOKEN_KEY)?;
        let user: WxUserInfo = self.read_key(USER_KEY)?;

        // 本地过期判断
        if let Some(days) = user.days_since_last_login(Utc::now()) {
            if days > LOGIN_EXPIRE_DAYS as f64 {
                tracing::info!(
                    openid = %user.openid,
                    距上次登录天数 = days,
                    "本地登录态已过期"
                );
                self.clear();
                return None;
            }
        }

        // 服务端登录态校验
        if !self.api.check_session(&token).await {
            tracing::info!(openid = %user.openid, "服务端登录态校验未通过,清除本地会话");
            self.clear();
            return None;
        }

        Some(UserSession { token, user })
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(error) => {
                tracing::error!(key = %key, 错误 = %error, "读取登录信息失败");
                None
            }
        }
    }

    /// 保存登录信息
    ///
    /// 先写token,后写用户信息。两次写之间进程崩溃会留下半截状态,
    /// 属已接受的不一致窗口 — `load` 会把它当作无会话自愈。
    pub fn save(&self, user: &WxUserInfo, token: &str) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, &token)?;
        self.storage.set(USER_KEY, user)?;

        tracing::info!(openid = %user.openid, user_id = user.id, "登录信息已保存");
        Ok(())
    }

    /// 清除登录信息 (幂等)
    pub fn clear(&self) {
        if let Err(error) = self.storage.remove(TOKEN_KEY) {
            tracing::warn!(错误 = %error, "清除token失败");
        }
        if let Err(error) = self.storage.remove(USER_KEY) {
            tracing::warn!(错误 = %error, "清除用户信息失败");
        }
    }

    /// 当前缓存的用户信息 (不触发过期检查与服务端校验)
    pub fn current_user(&self) -> Option<WxUserInfo> {
        self.read_key(USER_KEY)
    }

    /// 当前缓存的token (不触发过期检查与服务端校验)
    pub fn current_token(&self) -> Option<String> {
        self.read_key(TOKEN_KEY)
    }

    /// 登出
    pub fn logout(&self) {
        self.clear();
    }
}
