// ==========================================
// 配方原料库存系统 - HTTP 服务主入口
// ==========================================
// 技术栈: actix-web + Rust + SQLite
// 路由: POST /ingredients/import
// ==========================================

use actix_web::{web, App, HttpServer};
use formula_inventory::app::{configure_routes, get_bind_address, get_default_db_path, AppState};
use formula_inventory::logging;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", formula_inventory::APP_NAME);
    tracing::info!("系统版本: {}", formula_inventory::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path).map_err(|e| {
        tracing::error!("AppState初始化失败: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    let app_state = web::Data::new(app_state);

    let bind = get_bind_address();
    tracing::info!("HTTP 服务监听: http://{}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
