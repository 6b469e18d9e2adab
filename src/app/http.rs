// ==========================================
// 配方原料库存系统 - HTTP 路由
// ==========================================
// 路由: POST /ingredients/import（multipart 字段 csv_file）
// 响应: 200 {result, message} / 400 / 500 {error}
// ==========================================

use crate::api::{ApiError, ApiResult, UploadValidator, UploadedFile, UPLOAD_FIELD};
use crate::app::state::AppState;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::web::{post, scope, Data};
use actix_web::{HttpResponse, ResponseError, Scope};
use futures::StreamExt;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const API_PATH: &str = "/ingredients";

/// 原料相关路由
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/import", post().to(import_ingredients))
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(ResponseError::status_code(self)).json(json!({ "error": self.to_string() }))
    }
}

/// 导入原料 CSV
async fn import_ingredients(
    state: Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let settings = state.import_api.load_settings().await?;
    let validator = UploadValidator::new(settings.max_upload_kb);

    let received = receive_upload(payload, &validator)
        .await
        .map_err(log_rejection)?;
    let Some((upload, meta)) = received else {
        return Err(log_rejection(UploadValidator::missing_file()));
    };
    validator.validate(Some(&meta)).map_err(log_rejection)?;

    tracing::info!(
        file_name = meta.file_name.as_deref().unwrap_or(""),
        size_bytes = meta.size_bytes,
        "收到原料导入请求"
    );

    // 临时文件在导入结束后随 upload 一起删除
    let result = state
        .import_api
        .import_ingredients(upload.path().to_path_buf(), settings)
        .await;
    drop(upload);

    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            if e.http_status() >= 500 {
                tracing::error!(error = %e, "原料导入失败");
            } else {
                tracing::warn!(error = %e, "原料导入被拒绝");
            }
            Err(e)
        }
    }
}

fn log_rejection(err: ApiError) -> ApiError {
    tracing::warn!(error = %err, "上传文件接收失败");
    err
}

/// 接收 csv_file 字段并写入临时文件
///
/// # 返回
/// - Ok(None): 请求中没有 csv_file 字段
/// - Ok(Some((临时文件, 元信息)))
async fn receive_upload(
    mut payload: Multipart,
    validator: &UploadValidator,
) -> ApiResult<Option<(NamedTempFile, UploadedFile)>> {
    let mut received: Option<(NamedTempFile, UploadedFile)> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(invalid_multipart)?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        if field_name.as_deref() != Some(UPLOAD_FIELD) || received.is_some() {
            // 其他字段直接丢弃
            while let Some(chunk) = field.next().await {
                chunk.map_err(invalid_multipart)?;
            }
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()));

        // 先校验扩展名，再接收内容
        let mut meta = UploadedFile {
            file_name,
            size_bytes: 0,
        };
        validator.validate(Some(&meta))?;

        let mut file = NamedTempFile::new()
            .map_err(|e| ApiError::InternalError(format!("failed to create temp file: {}", e)))?;

        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(invalid_multipart)?;
            meta.size_bytes += chunk.len() as u64;
            validator.check_size(meta.size_bytes)?;
            file.write_all(&chunk)
                .map_err(|e| ApiError::InternalError(format!("failed to store upload: {}", e)))?;
        }
        file.flush()
            .map_err(|e| ApiError::InternalError(format!("failed to store upload: {}", e)))?;

        received = Some((file, meta));
    }

    Ok(received)
}

fn invalid_multipart(e: actix_multipart::MultipartError) -> ApiError {
    ApiError::ValidationError(format!("Invalid multipart payload: {}", e))
}
