// ==========================================
// 配方原料库存系统 - 原料领域模型
// ==========================================
// 职责: 导入管道的中间结构体与导入报告
// 对齐: ingredients / suppliers 表
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// CanonicalField - 标准字段
// ==========================================
// 用途: 源表头（任意拼写）→ 导入器认识的固定字段集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    SupplierName,
    Name,
    Inci,
    Moq,
    Price,
    Description,
    IsSample,
}

impl CanonicalField {
    /// 字段名（与数据库列名 / 错误消息一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::SupplierName => "supplier_name",
            CanonicalField::Name => "name",
            CanonicalField::Inci => "inci",
            CanonicalField::Moq => "moq",
            CanonicalField::Price => "price",
            CanonicalField::Description => "description",
            CanonicalField::IsSample => "is_sample",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// IngredientDraft - 导入中间结构体
// ==========================================
// 用途: 单行原始数据经类型转换后的工作记录
// 生命周期: 仅在导入流程内，写库或拒绝后即丢弃
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub name: Option<String>,
    pub inci: Option<String>,
    pub description: Option<String>,
    pub moq: Option<f64>,
    pub price: Option<f64>,
    pub is_sample: Option<bool>, // 无样品列时为 None

    // 派生字段
    pub supplier_name: Option<String>, // 已应用供应商沿用规则

    // 元信息
    pub row_number: usize,
}

impl IngredientDraft {
    /// 是否有库存（默认跟随 is_sample）
    pub fn in_stock(&self) -> bool {
        self.is_sample.unwrap_or(false)
    }

    /// 附加供应商 ID，转换为待写入记录
    ///
    /// 调用前必须已确认 name 非空（由行标准化器保证）
    pub fn into_new_ingredient(self, supplier_id: Option<i64>) -> NewIngredient {
        let in_stock = self.in_stock();
        NewIngredient {
            name: self.name.unwrap_or_default(),
            inci: self.inci,
            description: self.description,
            moq: self.moq,
            price: self.price,
            is_sample: self.is_sample.unwrap_or(false),
            in_stock,
            supplier_id,
            row_number: self.row_number,
        }
    }
}

// ==========================================
// NewIngredient - 待写入原料
// ==========================================
// 对齐: ingredients 表（stock_amount 不由导入器写入）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub inci: Option<String>,
    pub description: Option<String>,
    pub moq: Option<f64>,
    pub price: Option<f64>,
    pub is_sample: bool,
    pub in_stock: bool,
    pub supplier_id: Option<i64>,

    #[serde(skip)]
    pub row_number: usize,
}

// ==========================================
// IngredientRow - 已落库原料（只读视图）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRow {
    pub id: i64,
    pub name: String,
    pub inci: Option<String>,
    pub description: Option<String>,
    pub moq: Option<f64>,
    pub price: Option<f64>,
    pub is_sample: bool,
    pub in_stock: bool,
    pub supplier_id: Option<i64>,
    pub supplier_name: Option<String>,
}

// ==========================================
// ImportReport - 导入报告
// ==========================================
// 用途: 接口返回的 result 字段
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// 读取到的数据行数（含全空白行）
    pub total: usize,
    /// 成功写入（或进入批量队列）的行数
    pub success: usize,
    /// 被拒绝的行数（缺名称 / 单行写入失败）
    pub errors: usize,
    /// 每个有问题的行一组消息，超出上限时截断并追加汇总项
    pub error_details: Vec<Vec<String>>,
}

impl ImportReport {
    /// 人类可读的汇总消息
    pub fn summary_message(&self) -> String {
        format!(
            "Imported {} ingredients with {} errors",
            self.success, self.errors
        )
    }
}
