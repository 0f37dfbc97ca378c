// ==========================================
// 经销商经营指标系统 - 键值存储 Trait
// ==========================================
// 职责: 定义仓储层所需的键值存储端口（不包含实现）
// 实现者: MemoryKvStore（内存）/ SqliteKvStore（SQLite kv_store 表）
// 红线: 不含业务逻辑,只做字符串存取
// ==========================================

use crate::repository::error::RepositoryResult;

/// 批量写入条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
}

impl KvEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ==========================================
// KeyValueStore Trait
// ==========================================
// 存储介质对仓储层不透明（本地文件 / 远端镜像均可）
pub trait KeyValueStore: Send + Sync {
    /// 读取单个键
    ///
    /// # 返回
    /// - Ok(Some(value)): 键存在
    /// - Ok(None): 键不存在
    fn get(&self, key: &str) -> RepositoryResult<Option<String>>;

    /// 写入单个键（覆盖）
    fn set(&self, key: &str, value: &str) -> RepositoryResult<()>;

    /// 删除单个键（键不存在时视为成功）
    fn remove(&self, key: &str) -> RepositoryResult<()>;

    /// 列出指定前缀的全部键（升序）
    fn list_keys(&self, prefix: &str) -> RepositoryResult<Vec<String>>;

    /// 键是否存在
    fn contains(&self, key: &str) -> RepositoryResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    // ===== 批量操作 =====

    /// 批量读取，结果顺序与输入一致
    fn get_many(&self, keys: &[String]) -> RepositoryResult<Vec<(String, Option<String>)>> {
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            values.push((key.clone(), self.get(key)?));
        }
        Ok(values)
    }

    /// 批量写入
    ///
    /// 默认实现逐条写入；支持事务的实现应覆盖为整批提交
    fn set_many(&self, entries: &[KvEntry]) -> RepositoryResult<usize> {
        for entry in entries {
            self.set(&entry.key, &entry.value)?;
        }
        Ok(entries.len())
    }

    /// 按前缀删除，返回删除的键数量
    fn remove_by_prefix(&self, prefix: &str) -> RepositoryResult<usize> {
        let keys = self.list_keys(prefix)?;
        for key in &keys {
            self.remove(key)?;
        }
        Ok(keys.len())
    }
}
