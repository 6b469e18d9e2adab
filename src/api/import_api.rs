// ==========================================
// 配方原料库存系统 - 原料导入API
// ==========================================
// 职责: 封装原料导入（读取配置 → 阻塞线程池执行导入 → 组装响应）
// 说明: 与 Web 框架无关，HTTP 层与命令行共用
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader, ImportSettings};
use crate::domain::ingredient::ImportReport;
use crate::importer::{IngredientImporter, IngredientImporterImpl};
use crate::repository::IngredientImportRepositoryImpl;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 导入API响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportApiResponse {
    /// 导入报告
    pub result: ImportReport,
    /// 汇总消息
    pub message: String,
}

impl From<ImportReport> for ImportApiResponse {
    fn from(result: ImportReport) -> Self {
        let message = result.summary_message();
        Self { result, message }
    }
}

/// 导入API
pub struct ImportApi {
    db_path: String,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 读取导入参数（config_kv，缺省为默认值）
    pub async fn load_settings(&self) -> ApiResult<ImportSettings> {
        let manager = ConfigManager::new(&self.db_path)
            .map_err(|e| ApiError::DatabaseError(format!("failed to open config store: {}", e)))?;

        manager
            .load_import_settings()
            .await
            .map_err(|e| ApiError::DatabaseError(format!("failed to read import settings: {}", e)))
    }

    /// 导入原料 CSV（读取配置后执行）
    ///
    /// # 返回
    /// - Ok(ImportApiResponse): 导入完成
    /// - Err(ApiError::InvalidInput): CSV 结构错误（400）
    /// - Err(ApiError::ImportFailed): 导入中止并已回滚（500）
    pub async fn import_ingredients_from_path(&self, file_path: PathBuf) -> ApiResult<ImportApiResponse> {
        let settings = self.load_settings().await?;
        self.import_ingredients(file_path, settings).await
    }

    /// 使用给定参数导入原料 CSV
    ///
    /// 导入为同步 SQLite 事务，放到阻塞线程池执行；每次导入独占一个连接
    pub async fn import_ingredients(
        &self,
        file_path: PathBuf,
        settings: ImportSettings,
    ) -> ApiResult<ImportApiResponse> {
        let db_path = self.db_path.clone();

        let report = tokio::task::spawn_blocking(move || -> ApiResult<ImportReport> {
            let repo = IngredientImportRepositoryImpl::new(&db_path)
                .map_err(|e| ApiError::ImportFailed(e.to_string()))?;
            let importer = IngredientImporterImpl::new(repo, settings);
            Ok(importer.import_from_path(&file_path)?)
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("import task failed: {}", e)))??;

        Ok(ImportApiResponse::from(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_message_follows_counts() {
        let response = ImportApiResponse::from(ImportReport {
            total: 3,
            success: 2,
            errors: 1,
            error_details: vec![vec!["Row 4: Missing ingredient name".to_string()]],
        });
        assert_eq!(response.message, "Imported 2 ingredients with 1 errors");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["result"]["success"], 2);
        assert_eq!(json["message"], "Imported 2 ingredients with 1 errors");
    }
}
