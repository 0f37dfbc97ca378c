use crate::domain::defaults::default_metrics;
use crate::domain::dre::DreDataset;
use crate::domain::metrics::MetricsDataset;
use crate::domain::types::{Department, FiscalYear, RecordKind};
use crate::engine::consolidation::{ConsolidationEngine, MetricsSource};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::storage::keys::{self, record_key};
use crate::storage::kv_store_trait::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

// ==========================================
// MetricsRepository - 指标数据仓储
// ==========================================
// 存储端口由外部注入（无全局单例），便于用内存实现测试
pub struct MetricsRepository {
    store: Arc<dyn KeyValueStore>,
    engine: ConsolidationEngine,
}

impl MetricsRepository {
    /// 创建新的指标仓储
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            engine: ConsolidationEngine::new(),
        }
    }

    /// 底层存储（供偏好设置等共用同一存储）
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub(super) fn kv(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub(super) fn engine(&self) -> &ConsolidationEngine {
        &self.engine
    }

    /// 派生部门写保护
    pub(super) fn check_write_guard(
        year: FiscalYear,
        department: Department,
        kind: RecordKind,
        force: bool,
    ) -> RepositoryResult<()> {
        if department.is_derived() && !force {
            return Err(RepositoryError::GuardedWriteRejected {
                year,
                department,
                kind,
            });
        }
        Ok(())
    }

    // ==========================================
    // 指标读取
    // ==========================================

    /// 读取已存储的指标记录
    ///
    /// # 返回
    /// - `Ok(Some(dataset))`: 记录存在且通过校验
    /// - `Ok(None)`: 记录不存在
    /// - `Err(CorruptedRecord)`: 记录无法解析或结构校验失败
    pub fn try_read_metrics(
        &self,
        year: FiscalYear,
        department: Department,
    ) -> RepositoryResult<Option<MetricsDataset>> {
        let key = record_key(year, department, RecordKind::Metrics);
        let raw = match self.kv().get(&key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let dataset: MetricsDataset =
            serde_json::from_str(&raw).map_err(|e| RepositoryError::CorruptedRecord {
                key: key.clone(),
                message: e.to_string(),
            })?;

        dataset
            .validate()
            .map_err(|message| RepositoryError::CorruptedRecord { key, message })?;

        Ok(Some(dataset))
    }

    /// 读取指标数据集（永不报错）
    ///
    /// # 规则
    /// - 真实部门: 记录不存在或损坏 → 该年度默认数据集
    /// - 派生部门: 存在覆盖记录 → 原样返回; 否则 → 合并引擎实时计算
    pub fn load_metrics(&self, year: FiscalYear, department: Department) -> MetricsDataset {
        match self.try_read_metrics(year, department) {
            Ok(Some(dataset)) => dataset,
            Ok(None) => self.fallback_metrics(year, department),
            Err(e) => {
                warn!(
                    year = %year,
                    department = %department,
                    error = %e,
                    "指标记录读取失败，回退为默认值"
                );
                self.fallback_metrics(year, department)
            }
        }
    }

    fn fallback_metrics(&self, year: FiscalYear, department: Department) -> MetricsDataset {
        if department.is_derived() {
            self.engine.consolidate(self, year)
        } else {
            default_metrics(year)
        }
    }

    // ==========================================
    // 指标写入
    // ==========================================

    /// 保存指标数据集
    ///
    /// # 返回
    /// - `Ok(())`: 已持久化
    /// - `Err(GuardedWriteRejected)`: 派生部门且未 force
    /// - `Err(ValidationError)`: 数据集结构不合法
    pub fn try_save_metrics(
        &self,
        year: FiscalYear,
        dataset: &MetricsDataset,
        department: Department,
        force: bool,
    ) -> RepositoryResult<()> {
        Self::check_write_guard(year, department, RecordKind::Metrics, force)?;
        dataset.validate().map_err(RepositoryError::ValidationError)?;

        let payload = serde_json::to_string(dataset)?;
        let key = record_key(year, department, RecordKind::Metrics);
        self.kv().set(&key, &payload)?;

        debug!(key = %key, bytes = payload.len(), "指标记录已写入");
        Ok(())
    }

    /// 保存指标数据集（返回是否成功）
    pub fn save_metrics(
        &self,
        year: FiscalYear,
        dataset: &MetricsDataset,
        department: Department,
        force: bool,
    ) -> bool {
        match self.try_save_metrics(year, dataset, department, force) {
            Ok(()) => {
                if department.is_derived() {
                    info!(year = %year, "合并部门指标覆盖记录已写入 (force)");
                }
                true
            }
            Err(e) => {
                warn!(
                    year = %year,
                    department = %department,
                    error = %e,
                    "指标保存被拒绝"
                );
                false
            }
        }
    }

    // ==========================================
    // 存在性查询
    // ==========================================

    /// 是否存在显式写入的指标记录（区分"真实零值"与"从未写入"）
    pub fn has_stored_data(&self, year: FiscalYear, department: Department) -> bool {
        self.has_record(year, department, RecordKind::Metrics)
    }

    /// 是否存在显式写入的损益表记录
    pub fn has_stored_dre(&self, year: FiscalYear, department: Department) -> bool {
        self.has_record(year, department, RecordKind::Dre)
    }

    fn has_record(&self, year: FiscalYear, department: Department, kind: RecordKind) -> bool {
        let key = record_key(year, department, kind);
        match self.kv().contains(&key) {
            Ok(found) => found,
            Err(e) => {
                warn!(key = %key, error = %e, "记录存在性查询失败");
                false
            }
        }
    }

    // ==========================================
    // 清理操作
    // ==========================================

    /// 清理单个 (年度, 部门) 的指标与损益表记录
    pub fn try_clear_fiscal_year_data(
        &self,
        year: FiscalYear,
        department: Department,
    ) -> RepositoryResult<()> {
        for kind in RecordKind::ALL {
            self.kv().remove(&record_key(year, department, kind))?;
        }
        Ok(())
    }

    pub fn clear_fiscal_year_data(&self, year: FiscalYear, department: Department) -> bool {
        match self.try_clear_fiscal_year_data(year, department) {
            Ok(()) => {
                info!(year = %year, department = %department, "已清理部门年度数据");
                true
            }
            Err(e) => {
                warn!(year = %year, department = %department, error = %e, "清理部门年度数据失败");
                false
            }
        }
    }

    /// 清理某年度全部部门（含派生部门覆盖记录）
    pub fn clear_year_data(&self, year: FiscalYear) -> bool {
        let result = keys::year_record_keys(year)
            .iter()
            .try_for_each(|key| self.kv().remove(key));

        match result {
            Ok(()) => {
                info!(year = %year, "已清理年度数据");
                true
            }
            Err(e) => {
                warn!(year = %year, error = %e, "清理年度数据失败");
                false
            }
        }
    }

    /// 清理全部记录与两个选择偏好
    pub fn clear_all_data(&self) -> bool {
        let mut all_keys = keys::all_record_keys();
        all_keys.extend(keys::preference_keys());

        let result = all_keys.iter().try_for_each(|key| self.kv().remove(key));
        match result {
            Ok(()) => {
                info!(keys = all_keys.len(), "已清理全部数据");
                true
            }
            Err(e) => {
                warn!(error = %e, "清理全部数据失败");
                false
            }
        }
    }
}

// ==========================================
// 合并引擎数据来源
// ==========================================
impl MetricsSource for MetricsRepository {
    fn load_metrics(&self, year: FiscalYear, department: Department) -> MetricsDataset {
        MetricsRepository::load_metrics(self, year, department)
    }

    fn load_dre(&self, year: FiscalYear, department: Department) -> Option<DreDataset> {
        MetricsRepository::load_dre(self, year, department)
    }
}
