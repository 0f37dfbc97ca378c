// ==========================================
// 经销商经营指标系统 - 损益表 (DRE)
// ==========================================
// DRE = Demonstração do Resultado do Exercício
// 红线: 行顺序即展示顺序,保存/读取必须保持
// 红线: 行 id 在数据集内唯一
// ==========================================

use crate::domain::metrics::MonthSeries;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 损益表单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreLine {
    pub id: String,
    pub label: String,
    pub values: MonthSeries,

    /// 是否为小计行（仅展示用途）
    #[serde(rename = "isSubtotal", default, skip_serializing_if = "Option::is_none")]
    pub is_subtotal: Option<bool>,
}

impl DreLine {
    pub fn new(id: impl Into<String>, label: impl Into<String>, values: MonthSeries) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            values,
            is_subtotal: None,
        }
    }

    pub fn subtotal(mut self) -> Self {
        self.is_subtotal = Some(true);
        self
    }

    pub fn is_subtotal(&self) -> bool {
        self.is_subtotal.unwrap_or(false)
    }
}

/// 损益表数据集（有序）
pub type DreDataset = Vec<DreLine>;

/// 校验损益表
///
/// # 校验规则
/// 1. id 不能为空
/// 2. id 不能重复
/// 3. 数值必须有限
///
/// 注: 空列表合法（读取时等价于"未导入"）
pub fn validate_dre(lines: &[DreLine]) -> Result<(), String> {
    let mut seen = HashSet::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        if line.id.trim().is_empty() {
            return Err(format!("第 {} 行 id 为空", idx + 1));
        }
        if !seen.insert(line.id.as_str()) {
            return Err(format!("DRE 行 id 重复: {}", line.id));
        }
        if !line.values.is_finite() {
            return Err(format!("DRE 行 {} 含有非有限数值", line.id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_subtotal_omitted_when_unset() {
        let line = DreLine::new("1", "Receita", MonthSeries::zeros());
        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("isSubtotal").is_none());

        let subtotal = line.clone().subtotal();
        let json = serde_json::to_value(&subtotal).unwrap();
        assert_eq!(json["isSubtotal"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let lines = vec![
            DreLine::new("1", "Receita", MonthSeries::zeros()),
            DreLine::new("1", "Custo", MonthSeries::zeros()),
        ];
        assert!(validate_dre(&lines).is_err());
    }

    #[test]
    fn test_validate_accepts_empty_and_ordered() {
        assert!(validate_dre(&[]).is_ok());

        let lines = vec![
            DreLine::new("10", "Receita", MonthSeries::zeros()),
            DreLine::new("2", "Custo", MonthSeries::zeros()),
            DreLine::new("3", "Lucro", MonthSeries::zeros()).subtotal(),
        ];
        assert!(validate_dre(&lines).is_ok());
    }

    #[test]
    fn test_validate_rejects_infinite() {
        let mut values = [0.0; 12];
        values[0] = f64::INFINITY;
        let lines = vec![DreLine::new("1", "Receita", MonthSeries::new(values))];
        assert!(validate_dre(&lines).is_err());
    }
}
