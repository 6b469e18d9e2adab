// ==========================================
// 配方原料库存系统 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入模块所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// 单条写入阈值默认值（已读行数 ≤ 该值时逐条写入）
pub const DEFAULT_INDIVIDUAL_WRITE_THRESHOLD: usize = 50;
/// 批量写入批大小默认值
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// error_details 保留条数默认值
pub const DEFAULT_MAX_ERROR_DETAILS: usize = 50;
/// 上传文件大小上限默认值（KB）
pub const DEFAULT_MAX_UPLOAD_KB: u64 = 10_240;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入模块所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取逐条写入阈值
    ///
    /// # 默认值
    /// - 50
    async fn get_individual_write_threshold(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取批量写入批大小
    ///
    /// # 默认值
    /// - 100
    async fn get_batch_size(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取 error_details 保留条数
    ///
    /// # 默认值
    /// - 50
    async fn get_max_error_details(&self) -> Result<usize, Box<dyn Error>>;

    /// 获取上传文件大小上限（KB）
    ///
    /// # 默认值
    /// - 10240
    async fn get_max_upload_kb(&self) -> Result<u64, Box<dyn Error>>;

    /// 一次性读取全部导入参数
    async fn load_import_settings(&self) -> Result<ImportSettings, Box<dyn Error>> {
        let individual_write_threshold = self.get_individual_write_threshold().await?;
        let batch_size = self.get_batch_size().await?;
        let max_error_details = self.get_max_error_details().await?;
        let max_upload_kb = self.get_max_upload_kb().await?;

        Ok(ImportSettings {
            individual_write_threshold,
            batch_size,
            max_error_details,
            max_upload_kb,
        })
    }
}

// ==========================================
// ImportSettings - 导入参数快照
// ==========================================
// 用途: 导入开始前读取一次，导入器本身不访问配置存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub individual_write_threshold: usize,
    pub batch_size: usize,
    pub max_error_details: usize,
    pub max_upload_kb: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            individual_write_threshold: DEFAULT_INDIVIDUAL_WRITE_THRESHOLD,
            batch_size: DEFAULT_BATCH_SIZE,
            max_error_details: DEFAULT_MAX_ERROR_DETAILS,
            max_upload_kb: DEFAULT_MAX_UPLOAD_KB,
        }
    }
}
