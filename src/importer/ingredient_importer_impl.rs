// ==========================================
// 配方原料库存系统 - 原料导入器实现
// ==========================================
// 职责: 串联导入流程，从 CSV 到数据库
// 流程: 表头映射 → 开启事务 → 逐行(标准化 → 供应商 → 写入) → 剩余批次 → 提交
// 事务: 导入级错误回滚本次全部写入；行级问题只进报告
// ==========================================

use crate::config::ImportSettings;
use crate::domain::ingredient::ImportReport;
use crate::importer::batch_writer::{BatchWriter, WriteOutcome};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::CsvRowReader;
use crate::importer::header_mapper::ColumnMap;
use crate::importer::ingredient_importer_trait::IngredientImporter;
use crate::importer::report::ReportAggregator;
use crate::importer::row_normalizer::{NormalizedRow, RowNormalizer};
use crate::importer::supplier_resolver::SupplierResolver;
use crate::perf::PerfGuard;
use crate::repository::IngredientImportRepository;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// IngredientImporterImpl - 原料导入器实现
// ==========================================
pub struct IngredientImporterImpl<R>
where
    R: IngredientImportRepository,
{
    // 数据访问层
    repo: R,

    // 导入参数（导入前从配置读取）
    settings: ImportSettings,
}

impl<R> IngredientImporterImpl<R>
where
    R: IngredientImportRepository,
{
    /// 创建新的 IngredientImporter 实例
    ///
    /// # 参数
    /// - repo: 导入数据仓储（每次导入独占一个连接）
    /// - settings: 导入参数
    pub fn new(repo: R, settings: ImportSettings) -> Self {
        Self { repo, settings }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    #[instrument(skip_all, fields(import_id))]
    fn run<Rd: Read>(&self, mut rows: CsvRowReader<Rd>) -> ImportResult<ImportReport> {
        let import_id = Uuid::new_v4();
        tracing::Span::current().record("import_id", tracing::field::display(&import_id));

        let _perf = PerfGuard::new("import.ingredients");
        let start_time = Instant::now();

        // === 步骤 1: 表头映射 ===
        let headers = rows.read_headers()?;
        let columns = ColumnMap::from_headers(&headers).map_err(|e| {
            warn!(headers = ?headers, error = %e, "表头无法映射");
            e
        })?;
        debug!(mapped_columns = columns.len(), "表头映射完成");

        // === 步骤 2: 开启事务 ===
        self.repo.begin()?;

        // === 步骤 3~4: 逐行处理 + 提交 ===
        let outcome = self
            .process_rows(&mut rows, columns)
            .and_then(|report| {
                self.repo.commit()?;
                Ok(report)
            });

        match outcome {
            Ok(report) => {
                info!(
                    total = report.total,
                    success = report.success,
                    errors = report.errors,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "原料导入完成"
                );
                Ok(report)
            }
            Err(e) => {
                error!(row_number = rows.row_number(), error = %e, "原料导入失败，回滚");
                if let Err(rollback_err) = self.repo.rollback() {
                    error!(error = %rollback_err, "事务回滚失败");
                }
                Err(e)
            }
        }
    }

    fn process_rows<Rd: Read>(
        &self,
        rows: &mut CsvRowReader<Rd>,
        columns: ColumnMap,
    ) -> ImportResult<ImportReport> {
        let mut normalizer = RowNormalizer::new(columns);
        let mut suppliers = SupplierResolver::new();
        let mut writer = BatchWriter::new(
            self.settings.individual_write_threshold,
            self.settings.batch_size,
        );
        let mut report = ReportAggregator::new(self.settings.max_error_details);

        while let Some(cells) = rows.next_row()? {
            let row_number = rows.row_number();
            let rows_seen = report.record_seen();

            let (draft, mut issues) = match normalizer.normalize(&cells, row_number) {
                NormalizedRow::Blank => {
                    debug!(row_number, "空白行，跳过");
                    continue;
                }
                NormalizedRow::Rejected { issues } => {
                    for issue in &issues {
                        warn!(row_number, issue = %issue, "行被拒绝");
                    }
                    report.record_failure(issues);
                    continue;
                }
                NormalizedRow::Accepted { draft, issues } => (draft, issues),
            };

            for issue in &issues {
                warn!(row_number, issue = %issue, "字段已降级");
            }

            let supplier_id =
                match suppliers.resolve(&self.repo, draft.supplier_name.as_deref(), row_number) {
                    Ok(id) => id,
                    Err(issue) => {
                        if !self.repo.in_transaction()? {
                            return Err(ImportError::TransactionAborted {
                                row: row_number,
                                message: issue.to_string(),
                            });
                        }
                        issues.push(issue);
                        None
                    }
                };

            match writer.write(&self.repo, rows_seen, draft.into_new_ingredient(supplier_id))? {
                WriteOutcome::Written | WriteOutcome::Queued => report.record_success(issues),
                WriteOutcome::Rejected(issue) => {
                    issues.push(issue);
                    report.record_failure(issues);
                }
            }
        }

        let flushed = writer.finish(&self.repo)?;
        debug!(
            rows_read = report.total(),
            suppliers = suppliers.resolved_count(),
            batches = writer.batches_flushed(),
            last_batch = flushed,
            "数据行处理完成"
        );

        Ok(report.finish())
    }
}

impl<R> IngredientImporter for IngredientImporterImpl<R>
where
    R: IngredientImportRepository,
{
    fn import_from_path(&self, path: &Path) -> ImportResult<ImportReport> {
        info!(file_path = %path.display(), "开始导入原料数据");
        let rows = CsvRowReader::open(path)?;
        self.run(rows)
    }

    fn import_from_reader<Rd: Read>(&self, rdr: Rd) -> ImportResult<ImportReport> {
        self.run(CsvRowReader::from_reader(rdr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;
    use crate::repository::IngredientImportRepositoryImpl;
    use rusqlite::Connection;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    fn importer() -> IngredientImporterImpl<IngredientImportRepositoryImpl> {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let repo = IngredientImportRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)));
        IngredientImporterImpl::new(repo, ImportSettings::default())
    }

    #[test]
    fn test_small_import_end_to_end() {
        let importer = importer();
        let csv = "FURNIZOR,INGREDIENTE,INCI,MQO,LEI,FUNCTIE,MOSTRA DISPONIBILA\n\
                   Acme,Glycerin,Glycerin,\"1,5\",12,Humectant,da\n\
                   ,Squalane,Squalane,,abc,Emollient,nu\n\
                   ,,,,,,\n\
                   Zeta,,,,,,\n";

        let report = importer.import_from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.success, 2);
        assert_eq!(report.errors, 1);
        assert_eq!(
            report.error_details,
            vec![
                vec!["Row 3: Invalid price value 'abc'. Using null as default.".to_string()],
                vec!["Row 5: Missing ingredient name".to_string()],
            ]
        );

        let rows = importer.repo().list_ingredients().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].moq, Some(1.5));
        assert!(rows[0].is_sample && rows[0].in_stock);
        assert_eq!(rows[1].supplier_name.as_deref(), Some("Acme"));
        assert_eq!(rows[1].price, None);
        // 被拒绝行的供应商不创建
        assert_eq!(importer.repo().count_suppliers().unwrap(), 1);
    }

    #[test]
    fn test_structural_errors_write_nothing() {
        let importer = importer();

        let err = importer
            .import_from_reader(Cursor::new("SUPPLIER,PRICE\nAcme,10\n"))
            .unwrap_err();
        assert!(matches!(err, ImportError::MissingRequiredColumn));

        let err = importer.import_from_reader(Cursor::new("")).unwrap_err();
        assert!(matches!(err, ImportError::InvalidFormat));

        assert_eq!(importer.repo().count_suppliers().unwrap(), 0);
        assert_eq!(importer.repo().count_ingredients().unwrap(), 0);
    }
}
