// ==========================================
// 配方原料库存系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 这里只放导入级（硬）错误；行级问题以 RowIssue 值的形式流转
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 结构错误（导入未开始） =====
    #[error("Invalid CSV format or empty file")]
    InvalidFormat,

    #[error("CSV file must contain an ingredient name column (INGREDIENTE, INGREDIENT or NAME)")]
    MissingRequiredColumn,

    // ===== 文件相关错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== 写入错误（导入中止并回滚） =====
    #[error("bulk insert of rows {first_row}-{last_row} failed: {source}")]
    BulkWriteFailed {
        first_row: usize,
        last_row: usize,
        #[source]
        source: RepositoryError,
    },

    /// 行级写入失败时 SQLite 已自行回滚事务，后续写入无法继续
    #[error("transaction aborted at row {row}: {message}")]
    TransactionAborted { row: usize, message: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    /// 是否为结构错误（文件无法开始导入，无写入发生）
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ImportError::InvalidFormat | ImportError::MissingRequiredColumn
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_messages() {
        assert_eq!(
            ImportError::InvalidFormat.to_string(),
            "Invalid CSV format or empty file"
        );
        assert_eq!(
            ImportError::MissingRequiredColumn.to_string(),
            "CSV file must contain an ingredient name column (INGREDIENTE, INGREDIENT or NAME)"
        );
        assert!(ImportError::MissingRequiredColumn.is_structural());
        assert!(!ImportError::TransactionAborted {
            row: 3,
            message: "x".to_string()
        }
        .is_structural());
    }

    #[test]
    fn test_bulk_failure_names_row_range() {
        let err = ImportError::BulkWriteFailed {
            first_row: 52,
            last_row: 61,
            source: RepositoryError::ConstraintViolation("forced failure".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "bulk insert of rows 52-61 failed: constraint violated: forced failure"
        );
    }
}
