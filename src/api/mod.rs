// ==========================================
// 配方原料库存系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供 HTTP 路由与命令行调用
// ==========================================

pub mod error;
pub mod import_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, ImportApiResponse};
pub use validator::{UploadValidator, UploadedFile, UPLOAD_FIELD};
