use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 网络请求相关错误
///
/// 在平台边界统一产生的带标签错误类型。
/// 每个变体都携带明确的种类/错误码/原始信息,
/// 错误分类器据此在封闭枚举上匹配,而不是嗅探错误对象的形状。
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum ApiError {
    /// 域名未通过白名单校验
    ///
    /// 请求未发出即被拒绝,不参与重试。
    #[error("域名未在白名单中: {url}")]
    DomainNotAllowed { url: String },

    /// HTTP状态码错误
    ///
    /// 服务端返回了非2xx状态码。
    #[error("HTTP错误 {status}")]
    HttpStatus { status: u16 },

    /// 平台系统级错误码
    ///
    /// 宿主运行时为系统级网络故障发出的数字错误码
    /// (如 6000100 网络请求失败),区别于HTTP状态码。
    #[error("系统错误 {code}")]
    PlatformCode { code: i64 },

    /// 请求超时
    ///
    /// 单次尝试超过配置的 timeout_ms。超时按次计,不跨重试累计。
    #[error("请求超时")]
    Timeout,

    /// 无法建立连接
    #[error("无法连接到服务器: {0}")]
    ConnectFailed(String),

    /// 其他传输层错误
    ///
    /// 保留原始信息,供分类器做签名匹配兜底。
    #[error("网络请求失败: {0}")]
    Transport(String),

    /// 响应数据解析失败
    #[error("响应数据解析失败: {0}")]
    JsonParseFailed(String),
}

impl ApiError {
    /// 错误码的字符串形式 (平台码或HTTP状态码)
    ///
    /// 供业务信封的 error_code 字段透传给前端。
    pub fn error_code(&self) -> Option<String> {
        match self {
            ApiError::PlatformCode { code } => Some(code.to_string()),
            ApiError::HttpStatus { status } => Some(status.to_string()),
            _ => None,
        }
    }
}

/// 实现从reqwest::Error到ApiError的转换
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::ConnectFailed(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::HttpStatus {
                status: status.as_u16(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::JsonParseFailed(err.to_string())
    }
}

/// 小程序宿主平台错误
///
/// 授权弹窗与登录凭证获取的失败场景,
/// 在宿主边界产生,编排器据此给出用户可读文案。
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum PlatformError {
    /// 用户拒绝授权
    #[error("用户取消授权")]
    UserCancelled,

    /// 未获取到一次性登录凭证
    #[error("获取登录凭证失败")]
    MissingCredential,

    /// 宿主系统错误
    ///
    /// 携带宿主的数字错误码与原始信息。
    #[error("平台系统错误 {code}: {raw_message}")]
    System { code: i64, raw_message: String },
}

/// 本地存储相关错误
#[derive(Debug, Error, Serialize, Deserialize)]
#[serde(tag = "error", content = "details")]
pub enum StorageError {
    /// 存储目录不可用
    #[error("存储目录不可用: {0}")]
    DirectoryUnavailable(String),

    /// 文件读写失败
    #[error("读写失败: {0}")]
    Io(String),

    /// 序列化/反序列化失败
    #[error("数据序列化失败: {0}")]
    Serialization(String),
}

/// 实现从std::io::Error到StorageError的转换
impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_platform() {
        let error = ApiError::PlatformCode { code: 6000100 };
        assert_eq!(error.error_code(), Some("6000100".to_string()));
    }

    #[test]
    fn test_error_code_http_status() {
        let error = ApiError::HttpStatus { status: 401 };
        assert_eq!(error.error_code(), Some("401".to_string()));
    }

    #[test]
    fn test_error_code_absent_for_transport() {
        let error = ApiError::Transport("connection reset".to_string());
        assert_eq!(error.error_code(), None);
        assert_eq!(ApiError::Timeout.error_code(), None);
    }

    #[test]
    fn test_api_error_serializes_tagged() {
        let error = ApiError::HttpStatus { status: 503 };
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(value["error"], "HttpStatus");
        assert_eq!(value["details"]["status"], 503);
    }

    #[test]
    fn test_storage_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: StorageError = io_error.into();
        assert!(matches!(error, StorageError::Io(_)));
    }
}
