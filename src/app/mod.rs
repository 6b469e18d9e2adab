// ==========================================
// 配方原料库存系统 - 应用层
// ==========================================
// 职责: actix-web 集成（共享状态 + 路由）
// ==========================================

pub mod http;
pub mod state;

// 重导出
pub use http::configure_routes;
pub use state::{get_bind_address, get_default_db_path, AppState, DEFAULT_BIND_ADDRESS};
