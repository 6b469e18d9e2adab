// ==========================================
// 配方原料库存系统 - 导入层
// ==========================================
// 职责: CSV 原料批量导入
// 管道: 表头映射 → 行标准化 → 供应商解析 → 分批写入 → 报告汇总
// ==========================================

// 模块声明
pub mod batch_writer;
pub mod error;
pub mod file_parser;
pub mod header_mapper;
pub mod ingredient_importer_impl;
pub mod ingredient_importer_trait;
pub mod report;
pub mod row_normalizer;
pub mod supplier_resolver;

// 重导出核心类型
pub use batch_writer::{BatchWriter, WriteOutcome};
pub use error::{ImportError, ImportResult};
pub use file_parser::CsvRowReader;
pub use header_mapper::{lookup_header, ColumnMap};
pub use ingredient_importer_impl::IngredientImporterImpl;
pub use report::{ReportAggregator, RowIssue};
pub use row_normalizer::{parse_decimal, parse_sample_flag, NormalizedRow, RowNormalizer};
pub use supplier_resolver::SupplierResolver;

// 重导出 Trait 接口
pub use ingredient_importer_trait::IngredientImporter;
