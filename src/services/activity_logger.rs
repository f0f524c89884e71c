use std::sync::Arc;

use serde_json::Value;

use crate::models::{ActivityKind, ActivityLogEntry, Environment, StorageError, MAX_LOG_ENTRIES};
use crate::utils::KvStorage;

/// 存储键: 网络活动日志
const LOG_STORAGE_KEY: &str = "network_logs";

/// 网络活动日志器
///
/// 诊断旁路: 把请求/响应/错误事件追加到本地存储的有界序列,
/// 超过100条时从最旧一端淘汰 (FIFO)。
///
/// `record` 对调用方永不失败 — 存储异常仅记录警告后丢弃,
/// 不允许影响被记录的业务操作本身。
///
/// 读-改-写序列不加锁: 并发记录时条目可能被后写者覆盖丢失。
/// 日志仅用于诊断,可以容忍;若未来要求完整性,应改为原子追加原语。
pub struct ActivityLogger {
    storage: Arc<KvStorage>,
    environment: Environment,
}

impl ActivityLogger {
    pub fn new(storage: Arc<KvStorage>, environment: Environment) -> Self {
        Self {
            storage,
            environment,
        }
    }

    /// 追加一条活动日志
    pub fn record(&self, kind: ActivityKind, data: Value) {
        let entry = ActivityLogEntry::new(kind, data);

        // 开发环境同步输出到进程日志,便于调试
        if self.environment == Environment::Development {
            tracing::debug!(kind = ?entry.kind, data = %entry.data, "网络活动");
        }

        if let Err(error) = self.append(entry) {
            tracing::warn!(错误 = %error, "保存网络日志失败");
        }
    }

    fn append(&self, entry: ActivityLogEntry) -> Result<(), StorageError> {
        let mut entries: Vec<ActivityLogEntry> =
            self.storage.get(LOG_STORAGE_KEY)?.unwrap_or_default();
        entries.push(entry);

        // 仅保留最近100条
        if entries.len() > MAX_LOG_ENTRIES {
            let overflow = entries.len() - MAX_LOG_ENTRIES;
            entries.drain(..overflow);
        }

        self.storage.set(LOG_STORAGE_KEY, &entries)
    }

    /// 读取全部日志 (时间序)
    pub fn read_all(&self) -> Vec<ActivityLogEntry> {
        match self.storage.get(LOG_STORAGE_KEY) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(error) => {
                tracing::warn!(错误 = %error, "获取网络日志失败");
                Vec::new()
            }
        }
    }

    /// 清空日志 (幂等)
    pub fn clear(&self) {
        if let Err(error) = self.storage.remove(LOG_STORAGE_KEY) {
            tracing::warn!(错误 = %error, "清除网络日志失败");
        }
    }
}
