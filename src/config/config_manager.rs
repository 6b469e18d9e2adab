// ==========================================
// 配方原料库存系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::{
    ImportConfigReader, DEFAULT_BATCH_SIZE, DEFAULT_INDIVIDUAL_WRITE_THRESHOLD,
    DEFAULT_MAX_ERROR_DETAILS, DEFAULT_MAX_UPLOAD_KB,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取正数配置，缺失 / 格式错误 / 非正数时回退默认值
    fn get_positive_or_default<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + PartialOrd + Default + Copy,
    {
        let Some(raw) = self.get_global_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(v) if v > T::default() => Ok(v),
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %raw,
                    "配置值无效，使用默认值"
                );
                Ok(default)
            }
        }
    }
}

// ==========================================
// ImportConfigReader Trait 实现
// ==========================================
#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_individual_write_threshold(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_or_default(
            config_keys::IMPORT_INDIVIDUAL_WRITE_THRESHOLD,
            DEFAULT_INDIVIDUAL_WRITE_THRESHOLD,
        )
    }

    async fn get_batch_size(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_or_default(config_keys::IMPORT_BATCH_SIZE, DEFAULT_BATCH_SIZE)
    }

    async fn get_max_error_details(&self) -> Result<usize, Box<dyn Error>> {
        self.get_positive_or_default(
            config_keys::IMPORT_MAX_ERROR_DETAILS,
            DEFAULT_MAX_ERROR_DETAILS,
        )
    }

    async fn get_max_upload_kb(&self) -> Result<u64, Box<dyn Error>> {
        self.get_positive_or_default(config_keys::IMPORT_MAX_UPLOAD_KB, DEFAULT_MAX_UPLOAD_KB)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 写入策略
    pub const IMPORT_INDIVIDUAL_WRITE_THRESHOLD: &str = "import_individual_write_threshold";
    pub const IMPORT_BATCH_SIZE: &str = "import_batch_size";

    // 报告
    pub const IMPORT_MAX_ERROR_DETAILS: &str = "import_max_error_details";

    // 上传
    pub const IMPORT_MAX_UPLOAD_KB: &str = "import_max_upload_kb";
}
