// ==========================================
// 配方原料库存系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把导入错误映射为对外的响应类别
//   400 无法开始（上传校验 / CSV 结构错误）
//   500 中途中止（已回滚）
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
///
/// Display 即对外的 `error` 字段内容
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 请求错误（400）
    // ==========================================
    /// 上传文件校验失败
    #[error("{0}")]
    ValidationError(String),

    /// CSV 结构错误（导入未开始）
    #[error("{0}")]
    InvalidInput(String),

    // ==========================================
    // 导入中止（500，已回滚）
    // ==========================================
    #[error("Import failed: {0}")]
    ImportFailed(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::ValidationError(_) | ApiError::InvalidInput(_) => 400,
            ApiError::ImportFailed(_)
            | ApiError::DatabaseError(_)
            | ApiError::InternalError(_) => 500,
        }
    }
}

// ==========================================
// 从 ImportError 转换
// 结构错误 → 400；其余均视为导入中止 → 500
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        if err.is_structural() {
            ApiError::InvalidInput(err.to_string())
        } else {
            ApiError::ImportFailed(err.to_string())
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
