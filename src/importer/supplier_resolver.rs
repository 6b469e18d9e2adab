// ==========================================
// 配方原料库存系统 - 供应商解析
// ==========================================
// 职责: 供应商名 → 供应商 ID（首次出现时创建）
// 缓存: 仅在一次导入内有效，随导入会话丢弃
// ==========================================

use crate::importer::report::RowIssue;
use crate::repository::IngredientImportRepository;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct SupplierResolver {
    cache: HashMap<String, i64>,
}

impl SupplierResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析供应商 ID
    ///
    /// # 返回
    /// - Ok(None): 无供应商名（不访问存储）
    /// - Ok(Some(id)): 已存在或新建的供应商
    /// - Err(RowIssue): 存储失败，调用方以空供应商继续该行
    pub fn resolve<R>(
        &mut self,
        repo: &R,
        supplier_name: Option<&str>,
        row_number: usize,
    ) -> Result<Option<i64>, RowIssue>
    where
        R: IngredientImportRepository + ?Sized,
    {
        let Some(name) = supplier_name else {
            return Ok(None);
        };

        if let Some(id) = self.cache.get(name) {
            return Ok(Some(*id));
        }

        match repo.find_or_create_supplier(name) {
            Ok(id) => {
                tracing::debug!(supplier = name, supplier_id = id, "供应商已解析");
                self.cache.insert(name.to_string(), id);
                Ok(Some(id))
            }
            Err(e) => {
                tracing::warn!(row_number, supplier = name, error = %e, "供应商创建失败");
                Err(RowIssue::SupplierFailed {
                    row: row_number,
                    supplier: name.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// 本次导入已解析的不同供应商数
    pub fn resolved_count(&self) -> usize {
        self.cache.len()
    }
}
