// ==========================================
// 配方原料库存系统 - 核心库
// ==========================================
// 技术栈: actix-web + Rust + SQLite
// 核心: 原料 CSV 批量导入（容忍异构表头 / 供应商沿用 / 本地化数字）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - CSV 原料导入
pub mod importer;

// 配置层 - 导入参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 性能观测（SQL 计数 / 慢 SQL）
pub mod perf;

// API 层 - 业务接口
pub mod api;

// 应用层 - actix-web 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{CanonicalField, ImportReport, IngredientDraft, IngredientRow, NewIngredient};

// 导入器
pub use importer::{ImportError, IngredientImporter, IngredientImporterImpl};

// API
pub use api::{ApiError, ImportApi, ImportApiResponse};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "配方原料库存系统";
