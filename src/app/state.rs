// ==========================================
// 配方原料库存系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ImportApi;
use crate::db::{ensure_schema, open_sqlite_connection};

/// 默认监听地址
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";

/// 应用状态
///
/// 在 HTTP 服务中作为 `web::Data` 共享
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 原料导入API
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 启动时建表（幂等），导入时每次请求再独立打开连接
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        drop(conn);

        let import_api = Arc::new(ImportApi::new(db_path.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            import_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: FORMULA_INVENTORY_DB_PATH → 用户数据目录 → ./formula_inventory.db
pub fn get_default_db_path() -> String {
    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("FORMULA_INVENTORY_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./formula_inventory.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        let dir = if cfg!(debug_assertions) {
            data_dir.join("formula-inventory-dev")
        } else {
            data_dir.join("formula-inventory")
        };

        // 目录创建失败时退回当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("formula_inventory.db");
        }
    }

    path.to_string_lossy().to_string()
}

/// 获取 HTTP 监听地址（FORMULA_INVENTORY_BIND，默认 127.0.0.1:8080）
pub fn get_bind_address() -> String {
    std::env::var("FORMULA_INVENTORY_BIND")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
}
