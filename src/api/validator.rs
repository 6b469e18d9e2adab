// ==========================================
// 配方原料库存系统 - 上传文件校验器
// ==========================================
// 职责: 导入前校验上传字段（必填 / 扩展名 / 大小）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use std::path::Path;

/// 上传字段名
pub const UPLOAD_FIELD: &str = "csv_file";

/// 允许的扩展名
const ALLOWED_EXTENSIONS: &[&str] = &["csv", "txt"];

// ==========================================
// UploadedFile - 已接收的上传文件元信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// 客户端提供的文件名
    pub file_name: Option<String>,
    /// 文件字节数
    pub size_bytes: u64,
}

// ==========================================
// UploadValidator - 上传校验器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct UploadValidator {
    max_kb: u64,
}

impl UploadValidator {
    pub fn new(max_kb: u64) -> Self {
        Self { max_kb }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_kb.saturating_mul(1024)
    }

    /// 请求中缺少上传字段
    pub fn missing_file() -> ApiError {
        ApiError::ValidationError("The csv file field is required.".to_string())
    }

    /// 校验上传文件
    ///
    /// # 返回
    /// - Ok(()): 校验通过
    /// - Err(ApiError::ValidationError): 缺少文件 / 扩展名不允许 / 超出大小
    pub fn validate(&self, upload: Option<&UploadedFile>) -> ApiResult<()> {
        let Some(upload) = upload else {
            return Err(Self::missing_file());
        };

        let extension_ok = upload
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);
        if !extension_ok {
            return Err(ApiError::ValidationError(format!(
                "The csv file must be a file of type: {}.",
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        self.check_size(upload.size_bytes)
    }

    /// 大小校验（接收流式上传时逐块调用）
    pub fn check_size(&self, size_bytes: u64) -> ApiResult<()> {
        if size_bytes > self.max_bytes() {
            return Err(ApiError::ValidationError(format!(
                "The csv file must not be greater than {} kilobytes.",
                self.max_kb
            )));
        }
        Ok(())
    }
}
