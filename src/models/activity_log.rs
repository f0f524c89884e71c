use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 日志序列的容量上限
///
/// 超出后从最旧一端淘汰 (FIFO)。
pub const MAX_LOG_ENTRIES: usize = 100;

/// 网络活动类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Request,
    Response,
    Error,
}

/// 网络活动日志条目
///
/// 诊断旁路的最小记录单元: 时间戳 + 类型 + 不透明载荷。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    /// 记录时间
    pub timestamp: DateTime<Utc>,

    /// 活动类型
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// 载荷 (JSON格式,灵活扩展)
    pub data: Value,
}

impl ActivityLogEntry {
    /// 创建新条目
    pub fn new(kind: ActivityKind, data: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_carries_payload() {
        let entry = ActivityLogEntry::new(ActivityKind::Request, json!({ "url": "/banners" }));
        assert_eq!(entry.kind, ActivityKind::Request);
        assert_eq!(entry.data["url"], "/banners");
    }

    #[test]
    fn test_kind_serializes_uppercase() {
        let entry = ActivityLogEntry::new(ActivityKind::Error, json!({}));
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "ERROR");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_entry_round_trips() {
        let entry = ActivityLogEntry::new(ActivityKind::Response, json!({ "status_code": 200 }));
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: ActivityLogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
