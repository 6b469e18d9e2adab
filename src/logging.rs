// ==========================================
// 配方原料库存系统 - 日志初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 日志级别: RUST_LOG；输出格式: FORMULA_INVENTORY_LOG_FORMAT
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器（默认: info）
///   例如: RUST_LOG=debug 或 RUST_LOG=formula_inventory::importer=trace
/// - FORMULA_INVENTORY_LOG_FORMAT: `json` 输出结构化日志，其余值为文本
///
/// # 示例
/// ```no_run
/// use formula_inventory::logging;
/// logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("FORMULA_INVENTORY_LOG_FORMAT")
        .map(|v| v.trim().eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true);

    // 重复初始化时保留已安装的订阅者
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// 初始化测试环境的日志系统
///
/// 使用更详细的日志级别，便于调试
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
