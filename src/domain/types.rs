// ==========================================
// 经销商经营指标系统 - 领域类型定义
// ==========================================
// 职责: 会计年度 / 部门 / 记录类型 三个封闭枚举
// 红线: 合并部门 (consolidado) 为派生部门,不是数据源
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 会计年度 (Fiscal Year)
// ==========================================
// 序列化格式: 数字年份 (2025),映射键中为字符串 ("2025")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum FiscalYear {
    Y2024,
    Y2025,
    Y2026,
    Y2027,
}

impl FiscalYear {
    /// 全部支持的年度（升序）
    pub const ALL: [FiscalYear; 4] = [
        FiscalYear::Y2024,
        FiscalYear::Y2025,
        FiscalYear::Y2026,
        FiscalYear::Y2027,
    ];

    pub fn as_u16(self) -> u16 {
        match self {
            FiscalYear::Y2024 => 2024,
            FiscalYear::Y2025 => 2025,
            FiscalYear::Y2026 => 2026,
            FiscalYear::Y2027 => 2027,
        }
    }

    /// 两位年份后缀，用于月份标签（"Jan/25"）
    pub fn short_suffix(self) -> String {
        format!("{:02}", self.as_u16() % 100)
    }

    pub fn from_u16(year: u16) -> Option<FiscalYear> {
        FiscalYear::ALL.into_iter().find(|y| y.as_u16() == year)
    }
}

impl TryFrom<u16> for FiscalYear {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        FiscalYear::from_u16(value).ok_or_else(|| format!("不支持的会计年度: {}", value))
    }
}

impl From<FiscalYear> for u16 {
    fn from(year: FiscalYear) -> Self {
        year.as_u16()
    }
}

impl FromStr for FiscalYear {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let year: u16 = s
            .trim()
            .parse()
            .map_err(|_| format!("无效的年度: {}", s))?;
        FiscalYear::try_from(year)
    }
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

// ==========================================
// 部门 (Department)
// ==========================================
// 7 个真实部门 + 1 个派生部门
// 序列化格式: camelCase 字面量（与持久化键一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "novos")]
    Novos, // 新车
    #[serde(rename = "usados")]
    Usados, // 二手车
    #[serde(rename = "vendaDireta")]
    VendaDireta, // 直销
    #[serde(rename = "pecas")]
    Pecas, // 配件
    #[serde(rename = "oficina")]
    Oficina, // 维修车间
    #[serde(rename = "funilaria")]
    Funilaria, // 钣喷
    #[serde(rename = "administracao")]
    Administracao, // 行政
    #[serde(rename = "consolidado")]
    Consolidado, // 合并（派生）
}

impl Department {
    /// 真实部门（合并计算的数据源，顺序即规范顺序）
    pub const REAL: [Department; 7] = [
        Department::Novos,
        Department::Usados,
        Department::VendaDireta,
        Department::Pecas,
        Department::Oficina,
        Department::Funilaria,
        Department::Administracao,
    ];

    /// 全部部门（含派生部门）
    pub const ALL: [Department; 8] = [
        Department::Novos,
        Department::Usados,
        Department::VendaDireta,
        Department::Pecas,
        Department::Oficina,
        Department::Funilaria,
        Department::Administracao,
        Department::Consolidado,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::Novos => "novos",
            Department::Usados => "usados",
            Department::VendaDireta => "vendaDireta",
            Department::Pecas => "pecas",
            Department::Oficina => "oficina",
            Department::Funilaria => "funilaria",
            Department::Administracao => "administracao",
            Department::Consolidado => "consolidado",
        }
    }

    /// 是否为派生部门（写入需显式 force）
    pub fn is_derived(self) -> bool {
        matches!(self, Department::Consolidado)
    }
}

impl FromStr for Department {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == trimmed)
            .ok_or_else(|| format!("未知部门: {}", s))
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 记录类型 (Record Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Metrics, // 经营指标
    Dre,     // 损益表 (DRE)
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Metrics, RecordKind::Dre];

    /// 持久化键前缀
    pub fn key_prefix(self) -> &'static str {
        match self {
            RecordKind::Metrics => "metrics",
            RecordKind::Dre => "dre",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Metrics => write!(f, "METRICS"),
            RecordKind::Dre => write!(f, "DRE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fiscal_year_parse_and_suffix() {
        assert_eq!("2025".parse::<FiscalYear>().unwrap(), FiscalYear::Y2025);
        assert!("2023".parse::<FiscalYear>().is_err());
        assert!("abc".parse::<FiscalYear>().is_err());
        assert_eq!(FiscalYear::Y2027.short_suffix(), "27");
    }

    #[test]
    fn test_fiscal_year_serializes_as_number() {
        let json = serde_json::to_string(&FiscalYear::Y2026).unwrap();
        assert_eq!(json, "2026");

        let year: FiscalYear = serde_json::from_str("2024").unwrap();
        assert_eq!(year, FiscalYear::Y2024);
        assert!(serde_json::from_str::<FiscalYear>("1999").is_err());
    }

    #[test]
    fn test_department_literals_round_trip() {
        for dept in Department::ALL {
            assert_eq!(dept.as_str().parse::<Department>().unwrap(), dept);
            let json = serde_json::to_string(&dept).unwrap();
            assert_eq!(json, format!("\"{}\"", dept.as_str()));
        }
        assert!("oficinas".parse::<Department>().is_err());
    }

    #[test]
    fn test_only_consolidado_is_derived() {
        assert!(Department::Consolidado.is_derived());
        assert!(Department::REAL.iter().all(|d| !d.is_derived()));
    }
}
