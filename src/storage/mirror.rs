// ==========================================
// 经销商经营指标系统 - 存储镜像
// ==========================================
// 职责: 在两个键值存储之间同步全部已知键（本地 ↔ 远端）
// 规则: 源中存在 → 批量写入目标; 源中不存在 → 从目标删除
// 注: 只处理已知键布局,不做通配扫描
// ==========================================

use crate::repository::error::RepositoryResult;
use crate::storage::keys::all_known_keys;
use crate::storage::kv_store_trait::{KeyValueStore, KvEntry};
use tracing::info;

/// 镜像结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// 写入目标的键数量
    pub copied: usize,
    /// 从目标删除的键数量
    pub removed: usize,
}

/// 将 source 的全部已知键镜像到 target
pub fn mirror_records(
    source: &dyn KeyValueStore,
    target: &dyn KeyValueStore,
) -> RepositoryResult<MirrorReport> {
    let keys = all_known_keys();
    let values = source.get_many(&keys)?;

    let mut entries = Vec::new();
    let mut absent = Vec::new();
    for (key, value) in values {
        match value {
            Some(v) => entries.push(KvEntry::new(key, v)),
            None => absent.push(key),
        }
    }

    let copied = target.set_many(&entries)?;

    let mut removed = 0;
    for key in &absent {
        if target.contains(key)? {
            target.remove(key)?;
            removed += 1;
        }
    }

    info!(copied = copied, removed = removed, "存储镜像完成");
    Ok(MirrorReport { copied, removed })
}
