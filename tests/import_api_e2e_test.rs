// ==========================================
// 导入 API 端到端测试
// ==========================================
// 模拟客户端上传: multipart → 路由 → 导入 → JSON 响应
// ==========================================


use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use formula_inventory::api::ImportApi;
use formula_inventory::app::{configure_routes, AppState};
use formula_inventory::config::config_keys;
use serde_json::Value;
use test_helpers::{
    build_csv, count_ingredients, create_test_db, install_failure_trigger, set_config, write_csv,
};

const BOUNDARY: &str = "----formula-inventory-test-boundary";

/// 构造单字段 multipart 请求体
fn multipart_body(field: &str, file_name: &str, content: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(content.as_bytes());
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// 发送上传请求，返回 (状态码, JSON 响应体)
async fn upload(db_path: &str, field: &str, file_name: &str, content: &str) -> (StatusCode, Value) {
    let state = AppState::new(db_path.to_string()).expect("AppState初始化失败");
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .service(configure_routes()),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/ingredients/import")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(multipart_body(field, file_name, content))
        .to_request();

    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_web::test]
async fn test_upload_returns_report() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let (status, body) = upload(
        &db_path,
        "csv_file",
        "ingredients.csv",
        "NAME,PRICE,SAMPLE AVAILABLE\nGlycerin,\"10,5\",da\n,5,\n",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["total"], 2);
    assert_eq!(body["result"]["success"], 1);
    assert_eq!(body["result"]["errors"], 1);
    assert_eq!(
        body["result"]["error_details"][0][0],
        "Row 3: Missing ingredient name"
    );
    assert_eq!(body["message"], "Imported 1 ingredients with 1 errors");
    assert_eq!(count_ingredients(&db_path), 1);
}

#[actix_web::test]
async fn test_empty_file_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let (status, body) = upload(&db_path, "csv_file", "empty.csv", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid CSV format or empty file");
}

#[actix_web::test]
async fn test_missing_name_column_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let (status, body) = upload(&db_path, "csv_file", "x.txt", "SUPPLIER,PRICE\nAcme,1\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "CSV file must contain an ingredient name column (INGREDIENTE, INGREDIENT or NAME)"
    );
    assert_eq!(count_ingredients(&db_path), 0);
}

#[actix_web::test]
async fn test_wrong_extension_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let (status, body) = upload(&db_path, "csv_file", "ingredients.xlsx", "NAME\nGlycerin\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The csv file must be a file of type: csv, txt.");
    assert_eq!(count_ingredients(&db_path), 0);
}

#[actix_web::test]
async fn test_missing_file_field_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();

    let (status, body) = upload(&db_path, "attachment", "x.csv", "NAME\nGlycerin\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The csv file field is required.");
}

#[actix_web::test]
async fn test_upload_over_size_limit_is_rejected() {
    let (_tmp, db_path) = create_test_db().unwrap();
    set_config(&db_path, config_keys::IMPORT_MAX_UPLOAD_KB, "1");

    let csv = build_csv(100, None);
    assert!(csv.len() > 1024);
    let (status, body) = upload(&db_path, "csv_file", "big.csv", &csv).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "The csv file must not be greater than 1 kilobytes.");
    assert_eq!(count_ingredients(&db_path), 0);
}

#[actix_web::test]
async fn test_bulk_failure_returns_server_error() {
    let (_tmp, db_path) = create_test_db().unwrap();
    install_failure_trigger(&db_path);

    let (status, body) = upload(&db_path, "csv_file", "x.csv", &build_csv(60, Some(55))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Import failed: bulk insert of rows 52-61 failed"));
    assert_eq!(count_ingredients(&db_path), 0);
}

#[tokio::test]
async fn test_import_api_from_path() {
    let (_tmp, db_path) = create_test_db().unwrap();
    let file = write_csv("INGREDIENTE,LEI\nGlicerina,12\nPantenol,45\n");

    let api = ImportApi::new(db_path.clone());
    let response = api
        .import_ingredients_from_path(file.path().to_path_buf())
        .await
        .expect("导入失败");

    assert_eq!(response.result.success, 2);
    assert_eq!(response.message, "Imported 2 ingredients with 0 errors");
    assert_eq!(count_ingredients(&db_path), 2);
}
