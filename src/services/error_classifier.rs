use crate::models::ApiError;

/// 错误分类结果
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorVerdict {
    /// 面向用户的提示文案
    pub message: String,

    /// 是否可重试
    pub retryable: bool,
}

/// 平台错误码文案表
///
/// 覆盖宿主运行时已知的系统级网络错误码,未知码走兜底文案。
const PLATFORM_CODE_MESSAGES: &[(i64, &str)] = &[
    (6000100, "系统错误：网络请求失败，请检查网络连接"),
    (6000101, "系统错误：请求超时，请重试"),
    (6000102, "系统错误：网络中断，请检查网络设置"),
    (6000103, "系统错误：SSL证书验证失败"),
    (6000104, "系统错误：域名解析失败"),
    (6000105, "系统错误：请求被拦截"),
];

/// HTTP状态码文案表
const HTTP_STATUS_MESSAGES: &[(u16, &str)] = &[
    (400, "请求参数错误"),
    (401, "未授权，请重新登录"),
    (403, "禁止访问"),
    (404, "请求的资源不存在"),
    (500, "服务器内部错误"),
    (502, "网关错误"),
    (503, "服务不可用"),
    (504, "网关超时"),
];

/// 通用兜底文案
const FALLBACK_MESSAGE: &str = "网络请求失败，请重试";

/// 对已产生的错误给出文案与重试裁决
///
/// 全函数: 任何输入都映射到非空文案与明确的布尔裁决,不会panic。
/// 查找顺序: 平台错误码表 -> HTTP状态码表 -> 原始文本签名 -> 兜底。
pub fn classify(error: &ApiError) -> ErrorVerdict {
    ErrorVerdict {
        message: message_for(error),
        retryable: is_retryable(error),
    }
}

fn message_for(error: &ApiError) -> String {
    match error {
        ApiError::DomainNotAllowed { .. } => {
            "域名未在小程序管理后台配置，请联系管理员".to_string()
        }
        ApiError::PlatformCode { code } => PLATFORM_CODE_MESSAGES
            .iter()
            .find(|(known, _)| known == code)
            .map(|(_, message)| (*message).to_string())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        ApiError::HttpStatus { status } => HTTP_STATUS_MESSAGES
            .iter()
            .find(|(known, _)| known == status)
            .map(|(_, message)| (*message).to_string())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        ApiError::Timeout => "请求超时，请检查网络连接后重试".to_string(),
        ApiError::ConnectFailed(_) => "系统错误：网络请求失败，请检查网络连接".to_string(),
        ApiError::Transport(raw) => message_from_signature(raw),
        ApiError::JsonParseFailed(_) => "响应数据格式异常，请稍后重试".to_string(),
    }
}

/// 原始文本签名匹配
///
/// 仅对传输层保留的原始信息做脆弱签名兜底,
/// 其余错误均已在边界处打上明确标签。
fn message_from_signature(raw: &str) -> String {
    if raw.contains("6000100") {
        "系统错误：网络请求失败，请检查域名配置和网络连接".to_string()
    } else if raw.contains("url not in domain list") {
        "域名未在小程序管理后台配置，请联系管理员".to_string()
    } else if raw.contains("timeout") {
        "请求超时，请检查网络连接后重试".to_string()
    } else {
        FALLBACK_MESSAGE.to_string()
    }
}

/// 重试裁决
///
/// 不可重试: HTTP 400/401/403,以及域名配置类错误。
/// 其余(超时、连接失败、5xx、未知平台错误码)均可在次数上限内重试。
pub fn is_retryable(error: &ApiError) -> bool {
    match error {
        ApiError::DomainNotAllowed { .. } => false,
        ApiError::HttpStatus { status } => !matches!(*status, 400 | 401 | 403),
        ApiError::Transport(raw) => !raw.contains("url not in domain list"),
        _ => true,
    }
}

/// 统一的错误播报出口
///
/// 原实现在此弹出Toast;核心库中改为结构化错误日志,
/// 分类文案同时作为返回值供上层展示。
pub fn report_network_error(error: &ApiError, context: &str) -> ErrorVerdict {
    let verdict = classify(error);
    tracing::error!(
        context = %context,
        error = %error,
        提示 = %verdict.message,
        retryable = verdict.retryable,
        "网络请求错误"
    );
    verdict
}
