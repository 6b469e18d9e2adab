// ==========================================
// 配方原料库存系统 - 原料导入 Trait
// ==========================================
// 职责: 定义原料 CSV 导入接口（不包含实现）
// ==========================================

use crate::domain::ingredient::ImportReport;
use crate::importer::error::ImportResult;
use std::io::Read;
use std::path::Path;

// ==========================================
// IngredientImporter Trait
// ==========================================
// 用途: 原料导入主接口
// 实现者: IngredientImporterImpl
pub trait IngredientImporter: Send + Sync {
    /// 从 CSV 文件导入原料
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入完成（可能含被拒绝的行）
    /// - Err(InvalidFormat / MissingRequiredColumn): 导入未开始，无写入
    /// - Err(其他): 导入中止，本次写入全部回滚
    ///
    /// # 导入流程
    /// 1. 表头映射（失败时不开启事务）
    /// 2. 开启事务
    /// 3. 逐行: 标准化 → 供应商解析 → 写入
    /// 4. 写入剩余批次，提交
    fn import_from_path(&self, path: &Path) -> ImportResult<ImportReport>;

    /// 从任意字节流导入原料（语义同 import_from_path）
    fn import_from_reader<Rd: Read>(&self, rdr: Rd) -> ImportResult<ImportReport>;
}
