// ==========================================
// 经销商经营指标系统 - 内存键值存储
// ==========================================
// 用途: 测试替身 / 临时会话（进程退出即丢失）
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::storage::kv_store_trait::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 当前键数量
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 全量快照（测试断言用）
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.lock().map(|entries| entries.clone()).unwrap_or_default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepositoryResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn list_keys(&self, prefix: &str) -> RepositoryResult<Vec<String>> {
        Ok(self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::kv_store_trait::KvEntry;

    #[test]
    fn test_get_set_remove() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));

        store.remove("a").unwrap();
        assert!(!store.contains("a").unwrap());
        // 删除不存在的键不报错
        store.remove("a").unwrap();
    }

    #[test]
    fn test_prefix_and_batch_operations() {
        let store = MemoryKvStore::new();
        store
            .set_many(&[
                KvEntry::new("metrics_2025_novos", "{}"),
                KvEntry::new("metrics_2025_usados", "{}"),
                KvEntry::new("dre_2025_novos", "[]"),
            ])
            .unwrap();

        assert_eq!(
            store.list_keys("metrics_").unwrap(),
            vec!["metrics_2025_novos".to_string(), "metrics_2025_usados".to_string()]
        );

        let got = store
            .get_many(&["dre_2025_novos".to_string(), "missing".to_string()])
            .unwrap();
        assert_eq!(got[0].1.as_deref(), Some("[]"));
        assert_eq!(got[1].1, None);

        assert_eq!(store.remove_by_prefix("metrics_").unwrap(), 2);
        assert_eq!(store.len(), 1);
    }
}
