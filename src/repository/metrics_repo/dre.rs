use super::core::MetricsRepository;
use crate::domain::defaults::default_dre;
use crate::domain::dre::{validate_dre, DreDataset, DreLine};
use crate::domain::types::{Department, FiscalYear, RecordKind};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::storage::keys::record_key;
use tracing::{debug, info, warn};

// ==========================================
// 损益表 (DRE) 读写
// ==========================================
// 红线: "不存在"与"存在但为空"读取时均为 None,不合成默认损益表
impl MetricsRepository {
    /// 读取已存储的损益表记录（保留空列表）
    ///
    /// # 返回
    /// - `Ok(Some(lines))`: 记录存在且通过校验（可能为空列表）
    /// - `Ok(None)`: 记录不存在
    /// - `Err(CorruptedRecord)`: 记录无法解析或校验失败
    pub fn try_read_dre(
        &self,
        year: FiscalYear,
        department: Department,
    ) -> RepositoryResult<Option<DreDataset>> {
        let key = record_key(year, department, RecordKind::Dre);
        let raw = match self.kv().get(&key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let lines: DreDataset =
            serde_json::from_str(&raw).map_err(|e| RepositoryError::CorruptedRecord {
                key: key.clone(),
                message: e.to_string(),
            })?;

        validate_dre(&lines).map_err(|message| RepositoryError::CorruptedRecord { key, message })?;

        Ok(Some(lines))
    }

    /// 读取损益表（永不报错）
    ///
    /// # 规则
    /// - 不存在 / 空 / 损坏 → None（调用方视为"尚未导入"）
    /// - 派生部门: 非空覆盖记录优先，否则按行 id 合并真实部门
    pub fn load_dre(&self, year: FiscalYear, department: Department) -> Option<DreDataset> {
        let stored = match self.try_read_dre(year, department) {
            Ok(stored) => stored.filter(|lines| !lines.is_empty()),
            Err(e) => {
                warn!(
                    year = %year,
                    department = %department,
                    error = %e,
                    "损益表记录读取失败，视为未导入"
                );
                None
            }
        };

        match stored {
            Some(lines) => Some(lines),
            None if department.is_derived() => self.engine().consolidate_dre(self, year),
            None => default_dre(),
        }
    }

    /// 保存损益表
    ///
    /// # 返回
    /// - `Ok(())`: 已持久化（空列表也会写入）
    /// - `Err(GuardedWriteRejected)`: 派生部门且未 force
    /// - `Err(ValidationError)`: id 为空/重复或含非有限数值
    pub fn try_save_dre(
        &self,
        year: FiscalYear,
        lines: &[DreLine],
        department: Department,
        force: bool,
    ) -> RepositoryResult<()> {
        Self::check_write_guard(year, department, RecordKind::Dre, force)?;
        validate_dre(lines).map_err(RepositoryError::ValidationError)?;

        let payload = serde_json::to_string(lines)?;
        let key = record_key(year, department, RecordKind::Dre);
        self.kv().set(&key, &payload)?;

        debug!(key = %key, lines = lines.len(), "损益表记录已写入");
        Ok(())
    }

    /// 保存损益表（返回是否成功）
    pub fn save_dre(
        &self,
        year: FiscalYear,
        lines: &[DreLine],
        department: Department,
        force: bool,
    ) -> bool {
        match self.try_save_dre(year, lines, department, force) {
            Ok(()) => {
                if department.is_derived() {
                    info!(year = %year, lines = lines.len(), "合并部门损益表覆盖记录已写入 (force)");
                }
                true
            }
            Err(e) => {
                warn!(
                    year = %year,
                    department = %department,
                    error = %e,
                    "损益表保存被拒绝"
                );
                false
            }
        }
    }

    /// 删除损益表记录（写保护同 save_dre）
    pub fn try_remove_dre(
        &self,
        year: FiscalYear,
        department: Department,
        force: bool,
    ) -> RepositoryResult<()> {
        Self::check_write_guard(year, department, RecordKind::Dre, force)?;
        self.kv().remove(&record_key(year, department, RecordKind::Dre))
    }

    pub fn remove_dre(&self, year: FiscalYear, department: Department, force: bool) -> bool {
        match self.try_remove_dre(year, department, force) {
            Ok(()) => true,
            Err(e) => {
                warn!(year = %year, department = %department, error = %e, "损益表删除被拒绝");
                false
            }
        }
    }
}
