use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::models::{endpoints, ApiError, WechatLoginData, WechatLoginParams, WechatPhoneData};
use crate::services::error_classifier;
use crate::services::request_dispatcher::{HttpMethod, RequestDescriptor, RequestDispatcher};

/// 微信API响应信封
///
/// 后端统一返回 `{success, data?, message?, error_code?}`。
/// 传输层错误也折叠进该信封,上层永远拿到结构化结果,
/// 不需要 (也不应该) 重新解读原始平台错误。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WechatApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl<T> WechatApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error_code: None,
        }
    }

    pub fn fail(message: impl Into<String>, error_code: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error_code,
        }
    }
}

/// 微信API客户端
///
/// 职责单一: 在请求调度器之上提供类型化的业务端点调用。
/// 重试、白名单与活动日志都发生在调度器内,这里只处理业务信封。
pub struct WechatApiClient {
    dispatcher: Arc<RequestDispatcher>,
}

impl WechatApiClient {
    pub fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// 发起业务API请求
    ///
    /// 不向上抛传输错误: 失败统一折叠为 `{success:false, message, error_code}`。
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: HttpMethod,
        data: Option<Value>,
    ) -> WechatApiResponse<T> {
        let url = self.dispatcher.config().build_url(endpoint);
        tracing::debug!(method = method.as_str(), url = %url, "微信API请求");

        let descriptor = RequestDescriptor {
            url,
            method,
            headers: HashMap::new(),
            body: data,
            timeout_ms: None,
        };

        let response = match self.dispatcher.dispatch(&descriptor, None).await {
            Ok(response) => response,
            Err(error) => return Self::failure_from_error(&error, endpoint),
        };

        Self::parse_envelope(response.data)
    }

    /// 微信登录: 以一次性登录凭证换取会话
    pub async fn login(&self, params: &WechatLoginParams) -> WechatApiResponse<WechatLoginData> {
        let body = match serde_json::to_value(params) {
            Ok(value) => value,
            Err(error) => {
                return WechatApiResponse::fail(format!("请求参数序列化失败: {}", error), None)
            }
        };
        self.request(endpoints::WECHAT_LOGIN, HttpMethod::Post, Some(body))
            .await
    }

    /// 校验服务端登录态
    ///
    /// 任何失败 (传输或业务) 都视为登录态无效。
    pub async fn check_session(&self, token: &str) -> bool {
        let response: WechatApiResponse<Value> = self
            .request(
                endpoints::WECHAT_CHECK,
                HttpMethod::Post,
                Some(json!({ "token": token })),
            )
            .await;
        response.success
    }

    /// 获取微信绑定手机号
    pub async fn fetch_phone_number(
        &self,
        code: &str,
        openid: &str,
    ) -> WechatApiResponse<WechatPhoneData> {
        self.request(
            endpoints::WECHAT_PHONE,
            HttpMethod::Post,
            Some(json!({ "code": code, "openid": openid })),
        )
        .await
    }

    /// 解析业务信封
    ///
    /// 兼容两种返回形状:
    /// - `{success, data: {...}}`: 数据在 data 字段内
    /// - `{success, ...}` 或裸数据: 整个响应体即数据
    fn parse_envelope<T: DeserializeOwned>(data: Value) -> WechatApiResponse<T> {
        if let Some(object) = data.as_object() {
            if object.get("success").and_then(Value::as_bool) == Some(false) {
                // 业务层面的失败
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("请求失败")
                    .to_string();
                let error_code = object
                    .get("error_code")
                    .or_else(|| object.get("errorCode"))
                    .map(code_as_string);
                return WechatApiResponse {
                    success: false,
                    data: None,
                    message: Some(message),
                    error_code,
                };
            }
        }

        let is_envelope = data
            .as_object()
            .map(|object| object.contains_key("success"))
            .unwrap_or(false);
        let payload = if is_envelope {
            let inner = data
                .as_object()
                .and_then(|object| object.get("data").cloned());
            inner.unwrap_or(data)
        } else {
            data
        };

        match serde_json::from_value::<T>(payload) {
            Ok(parsed) => WechatApiResponse::ok(parsed),
            Err(error) => {
                tracing::error!(错误 = %error, "响应数据解析失败");
                WechatApiResponse::fail(format!("响应数据解析失败: {}", error), None)
            }
        }
    }

    /// 把已分类的传输错误折叠为业务失败信封
    fn failure_from_error<T>(error: &ApiError, context: &str) -> WechatApiResponse<T> {
        // 6000100 给出完整的排查指引
        if matches!(error, ApiError::PlatformCode { code: 6000100 }) {
            tracing::error!(context = %context, "微信API请求失败(6000100)");
            return WechatApiResponse::fail(
                "系统错误(6000100)：请检查以下设置：\n1. 域名是否已在小程序管理后台配置\n2. 网络连接是否正常\n3. 开发工具是否开启了域名校验",
                Some("6000100".to_string()),
            );
        }

        let verdict = error_classifier::classify(error);
        WechatApiResponse::fail(verdict.message, error.error_code())
    }
}

/// 错误码字段的字符串形式 (后端可能返回字符串或数字)
fn code_as_string(code: &Value) -> String {
    match code {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
