// ==========================================
// 配方原料库存系统 - 行标准化器
// ==========================================
// 职责: 单行原始单元格 → IngredientDraft + 行级问题
// 状态: 供应商沿用槽位，随导入会话创建，会话结束即丢弃
// ==========================================

use crate::domain::ingredient::{CanonicalField, IngredientDraft};
use crate::importer::header_mapper::ColumnMap;
use crate::importer::report::RowIssue;

const SAMPLE_TRUE_TOKENS: &[&str] = &["da", "yes", "1", "true"];
const SAMPLE_FALSE_TOKENS: &[&str] = &["nu", "no", "0", "false"];

/// 单行标准化结果
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedRow {
    /// 全部单元格为空白：跳过，不计错误
    Blank,
    /// 缺少原料名称：不写库，计入 errors
    Rejected { issues: Vec<RowIssue> },
    /// 可写入（issues 为降级字段的软错误）
    Accepted {
        draft: IngredientDraft,
        issues: Vec<RowIssue>,
    },
}

/// 解析样品标记（大小写不敏感）
///
/// 未识别的值返回 None
pub fn parse_sample_flag(value: &str) -> Option<bool> {
    let lower = value.trim().to_lowercase();
    if SAMPLE_TRUE_TOKENS.contains(&lower.as_str()) {
        Some(true)
    } else if SAMPLE_FALSE_TOKENS.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// 解析数量 / 价格
///
/// 逗号视为小数点，随后丢弃数字和小数点以外的字符
pub fn parse_decimal(value: &str) -> Option<f64> {
    let cleaned: String = value
        .replace(',', ".")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ==========================================
// RowNormalizer
// ==========================================
#[derive(Debug)]
pub struct RowNormalizer {
    columns: ColumnMap,
    carried_supplier: Option<String>,
}

impl RowNormalizer {
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            carried_supplier: None,
        }
    }

    /// 最近一次出现的非空供应商名
    pub fn carried_supplier(&self) -> Option<&str> {
        self.carried_supplier.as_deref()
    }

    /// 标准化一行
    ///
    /// # 参数
    /// - cells: 按列位置排列的单元格（多余列忽略，缺失列视为空串）
    /// - row_number: 文件内行号（表头为第 1 行）
    pub fn normalize<S: AsRef<str>>(&mut self, cells: &[S], row_number: usize) -> NormalizedRow {
        if cells.iter().all(|c| c.as_ref().trim().is_empty()) {
            return NormalizedRow::Blank;
        }

        let mut draft = IngredientDraft {
            row_number,
            ..Default::default()
        };
        let mut issues = Vec::new();

        for (idx, field) in self.columns.iter() {
            let value = cells.get(idx).map(|c| c.as_ref().trim()).unwrap_or("");

            match field {
                CanonicalField::SupplierName => {
                    if !value.is_empty() {
                        self.carried_supplier = Some(value.to_string());
                    }
                    draft.supplier_name = self.carried_supplier.clone();
                }
                CanonicalField::IsSample => {
                    let flag = parse_sample_flag(value).unwrap_or_else(|| {
                        if !value.is_empty() {
                            issues.push(RowIssue::InvalidSample {
                                row: row_number,
                                value: value.to_string(),
                            });
                        }
                        false
                    });
                    draft.is_sample = Some(flag);
                }
                CanonicalField::Moq | CanonicalField::Price => {
                    let parsed = parse_decimal(value);
                    if parsed.is_none() && !value.is_empty() {
                        issues.push(RowIssue::InvalidNumber {
                            row: row_number,
                            field,
                            value: value.to_string(),
                        });
                    }
                    if field == CanonicalField::Moq {
                        draft.moq = parsed;
                    } else {
                        draft.price = parsed;
                    }
                }
                CanonicalField::Name => draft.name = non_empty(value),
                CanonicalField::Inci => draft.inci = non_empty(value),
                CanonicalField::Description => draft.description = non_empty(value),
            }
        }

        if draft.name.is_none() {
            issues.push(RowIssue::MissingName { row: row_number });
            return NormalizedRow::Rejected { issues };
        }

        NormalizedRow::Accepted { draft, issues }
    }
}
