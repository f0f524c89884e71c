use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ActivityKind, ApiConfig, ApiError};
use crate::services::activity_logger::ActivityLogger;
use crate::services::error_classifier;
use crate::services::whitelist::DomainWhitelist;

/// HTTP方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    fn as_reqwest(&self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// 请求描述
///
/// 每个调用点构造一次,不可变,生命周期归发起调用所有。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: HttpMethod,

    /// 附加请求头 (Content-Type: application/json 始终携带)
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// JSON请求体
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// 单次尝试超时 (毫秒),缺省使用配置值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestDescriptor {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: HashMap::new(),
            body: None,
            timeout_ms: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Post,
            headers: HashMap::new(),
            body: Some(body),
            timeout_ms: None,
        }
    }

    /// 附加请求头 (构建器模式)
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// 指定单次尝试超时 (构建器模式)
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// 响应
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status_code: u16,

    /// 响应体 (按JSON解析,无法解析时保留原始文本)
    pub data: Value,
}

/// 请求调度器
///
/// 所有出站HTTP请求的唯一通道: 白名单校验、单次超时、指数退避重试、
/// 活动日志与错误分类都在这里完成。上层只会看到已分类的结果,
/// 不应再解读原始平台错误。
pub struct RequestDispatcher {
    client: Client,
    config: ApiConfig,
    logger: Arc<ActivityLogger>,

    /// 退避基准时长,第k次失败后等待 base * 2^k
    backoff_base: Duration,
}

impl RequestDispatcher {
    /// 创建调度器
    pub fn new(config: ApiConfig, logger: Arc<ActivityLogger>) -> Self {
        Self {
            client: Client::new(),
            config,
            logger,
            backoff_base: Duration::from_secs(1),
        }
    }

    /// 指定退避基准时长 (测试用,默认1秒)
    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// 发起请求 (带重试)
    ///
    /// # 算法
    /// 1. 白名单校验失败立即拒绝,不发起任何HTTP尝试
    /// 2. 总尝试次数 = (retry_override ?? 配置重试次数) + 1
    /// 3. 每次尝试前记录REQUEST日志,按配置超时发起调用
    /// 4. 成功记录RESPONSE日志 (状态码 + 载荷大小) 并立即返回
    /// 5. 失败记录ERROR日志并分类;不可重试或已是最后一次则播报并返回错误
    /// 6. 否则等待 2^尝试序号 个退避单位后重试
    ///
    /// 超时按单次尝试计,不跨重试累计。一次dispatch内各尝试严格串行。
    pub async fn dispatch(
        &self,
        descriptor: &RequestDescriptor,
        retry_override: Option<u32>,
    ) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();

        // 白名单是第一道闸门: 不放行的URL一次HTTP尝试都不会发出
        if !DomainWhitelist::is_allowed(&descriptor.url, self.config.environment) {
            let error = ApiError::DomainNotAllowed {
                url: descriptor.url.clone(),
            };
            self.logger.record(
                ActivityKind::Error,
                json!({
                    "request_id": request_id,
                    "url": descriptor.url,
                    "attempt": 0,
                    "error": error_payload(&error),
                }),
            );
            error_classifier::report_network_error(&error, &descriptor.url);
            return Err(error);
        }

        let retry_count = retry_override.unwrap_or(self.config.retry_count);
        let mut attempt: u32 = 0;

        loop {
            self.logger.record(
                ActivityKind::Request,
                json!({
                    "request_id": request_id,
                    "url": descriptor.url,
                    "method": descriptor.method.as_str(),
                    "attempt": attempt + 1,
                }),
            );

            match self.attempt_once(descriptor).await {
                Ok(response) => {
                    let data_size = response.data.to_string().len();
                    self.logger.record(
                        ActivityKind::Response,
                        json!({
                            "request_id": request_id,
                            "url": descriptor.url,
                            "status_code": response.status_code,
                            "data_size": data_size,
                        }),
                    );
                    tracing::debug!(
                        request_id = %request_id,
                        url = %descriptor.url,
                        status_code = response.status_code,
                        attempt = attempt + 1,
                        "请求成功"
                    );
                    return Ok(response);
                }
                Err(error) => {
                    self.logger.record(
                        ActivityKind::Error,
                        json!({
                            "request_id": request_id,
                            "url": descriptor.url,
                            "attempt": attempt + 1,
                            "error": error_payload(&error),
                        }),
                    );

                    let verdict = error_classifier::classify(&error);
                    if !verdict.retryable || attempt >= retry_count {
                        error_classifier::report_network_error(&error, &descriptor.url);
                        return Err(error);
                    }

                    // 指数退避: 第k次失败后等待 2^k 个基准时长
                    let backoff = self.backoff_base * 2u32.pow(attempt);
                    tracing::warn!(
                        request_id = %request_id,
                        url = %descriptor.url,
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        提示 = %verdict.message,
                        "请求失败,准备重试"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// 单次HTTP尝试
    async fn attempt_once(&self, descriptor: &RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let timeout = Duration::from_millis(descriptor.timeout_ms.unwrap_or(self.config.timeout_ms));

        let mut request = self
            .client
            .request(descriptor.method.as_reqwest(), &descriptor.url)
            .timeout(timeout)
            .header("Content-Type", "application/json");

        for (name, value) in &descriptor.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // 非2xx一律视为失败尝试,由分类器决定是否重试
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let data = match serde_json::from_slice::<Value>(&bytes) {
            Ok(value) => value,
            Err(_) => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
        };

        Ok(ApiResponse {
            status_code: status.as_u16(),
            data,
        })
    }
}

/// 错误的日志载荷 (带标签的结构化形式)
fn error_payload(error: &ApiError) -> Value {
    serde_json::to_value(error).unwrap_or_else(|_| json!({ "message": error.to_string() }))
}
