// ==========================================
// 配方原料库存系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与导入报告
// 红线: 不含数据访问逻辑
// ==========================================

pub mod ingredient;

// 重导出核心类型
pub use ingredient::{CanonicalField, ImportReport, IngredientDraft, IngredientRow, NewIngredient};
