use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::StorageError;

/// 本地键值存储
///
/// 对应小程序宿主的本地Storage能力: 每个key一个JSON文件,
/// 覆盖写入,读取缺失的key返回空而非报错。
///
/// 读-改-写序列(如活动日志的追加)不提供原子性,
/// 并发写入以最后写入为准。
pub struct KvStorage {
    root: PathBuf,
}

impl KvStorage {
    /// 在指定目录创建存储
    ///
    /// 目录不存在时自动创建。
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// 使用系统应用数据目录
    ///
    /// - Windows: `C:\Users\<user>\AppData\Roaming\wechat-ticketing`
    /// - macOS: `~/Library/Application Support/wechat-ticketing`
    /// - Linux: `~/.local/share/wechat-ticketing`
    pub fn open_default() -> Result<Self, StorageError> {
        let base = dirs::data_dir().ok_or_else(|| {
            StorageError::DirectoryUnavailable("无法定位应用数据目录".to_string())
        })?;
        Self::new(base.join("wechat-ticketing"))
    }

    /// 存储根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// 读取键值
    ///
    /// 键不存在返回 `Ok(None)`。
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }

    /// 写入键值 (覆盖)
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        fs::write(self.key_path(key), json)?;
        Ok(())
    }

    /// 删除键 (幂等)
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    fn test_storage() -> (tempfile::TempDir, KvStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = KvStorage::new(dir.path().join("storage")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, storage) = test_storage();
        let sample = Sample {
            name: "票务".to_string(),
            count: 3,
        };

        storage.set("sample", &sample).unwrap();
        let loaded: Option<Sample> = storage.get("sample").unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, storage) = test_storage();
        let loaded: Option<Sample> = storage.get("nonexistent").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let (_dir, storage) = test_storage();
        storage.set("key", &1u32).unwrap();
        storage.set("key", &2u32).unwrap();
        let loaded: Option<u32> = storage.get("key").unwrap();
        assert_eq!(loaded, Some(2));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (_dir, storage) = test_storage();
        storage.set("key", &1u32).unwrap();

        storage.remove("key").unwrap();
        assert!(storage.get::<u32>("key").unwrap().is_none());

        // 再次删除不报错
        storage.remove("key").unwrap();
    }

    #[test]
    fn test_corrupt_content_reports_serialization_error() {
        let (_dir, storage) = test_storage();
        std::fs::write(storage.root().join("bad.json"), "not-json").unwrap();

        let result = storage.get::<Sample>("bad");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
