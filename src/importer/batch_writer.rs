// ==========================================
// 配方原料库存系统 - 分批写入器
// ==========================================
// 职责: 小文件逐条写入，大文件攒批写入
// 策略: 已读行数 ≤ 阈值 → 逐条写入（失败仅影响该行，除非事务已被 SQLite 回滚）
//       已读行数 > 阈值 → 入队，满一批写一批，文件结束时写剩余
//       批量写入失败 → 导入级错误（调用方回滚整个事务）
// ==========================================

use crate::domain::ingredient::NewIngredient;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::report::RowIssue;
use crate::repository::IngredientImportRepository;

/// 单条记录的写入结果
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    /// 已逐条写入
    Written,
    /// 已进入批量队列
    Queued,
    /// 逐条写入失败（行级错误）
    Rejected(RowIssue),
}

#[derive(Debug)]
pub struct BatchWriter {
    individual_threshold: usize,
    batch_size: usize,
    pending: Vec<NewIngredient>,
    batches_flushed: usize,
}

impl BatchWriter {
    /// # 参数
    /// - individual_threshold: 已读行数不超过该值时逐条写入
    /// - batch_size: 批量写入的批大小（至少为 1）
    pub fn new(individual_threshold: usize, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            individual_threshold,
            batch_size,
            pending: Vec::with_capacity(batch_size),
            batches_flushed: 0,
        }
    }

    /// 写入一条记录
    ///
    /// # 参数
    /// - rows_seen: 导入开始以来已读取的数据行数（含当前行）
    pub fn write<R>(
        &mut self,
        repo: &R,
        rows_seen: usize,
        record: NewIngredient,
    ) -> ImportResult<WriteOutcome>
    where
        R: IngredientImportRepository + ?Sized,
    {
        if rows_seen <= self.individual_threshold {
            let err = match repo.create_ingredient(&record) {
                Ok(_) => return Ok(WriteOutcome::Written),
                Err(e) => e,
            };
            tracing::error!(
                row_number = record.row_number,
                name = %record.name,
                error = %err,
                "原料写入失败"
            );

            if !repo.in_transaction()? {
                return Err(ImportError::TransactionAborted {
                    row: record.row_number,
                    message: err.to_string(),
                });
            }
            return Ok(WriteOutcome::Rejected(RowIssue::WriteFailed {
                row: record.row_number,
                message: err.to_string(),
            }));
        }

        self.pending.push(record);
        if self.pending.len() >= self.batch_size {
            self.flush(repo)?;
        }
        Ok(WriteOutcome::Queued)
    }

    /// 写入队列中剩余的记录
    ///
    /// # 返回
    /// - Ok(usize): 本次写入条数
    pub fn finish<R>(&mut self, repo: &R) -> ImportResult<usize>
    where
        R: IngredientImportRepository + ?Sized,
    {
        self.flush(repo)
    }

    fn flush<R>(&mut self, repo: &R) -> ImportResult<usize>
    where
        R: IngredientImportRepository + ?Sized,
    {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let batch = std::mem::take(&mut self.pending);
        let first_row = batch.first().map(|r| r.row_number).unwrap_or_default();
        let last_row = batch.last().map(|r| r.row_number).unwrap_or_default();

        let written = repo.bulk_insert_ingredients(&batch).map_err(|source| {
            tracing::error!(first_row, last_row, error = %source, "批量写入失败");
            ImportError::BulkWriteFailed {
                first_row,
                last_row,
                source,
            }
        })?;

        self.batches_flushed += 1;
        tracing::debug!(first_row, last_row, written, "批量写入完成");
        Ok(written)
    }

    /// 队列中尚未写入的记录数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 已执行的批量写入次数
    pub fn batches_flushed(&self) -> usize {
        self.batches_flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingredient::IngredientRow;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Single(usize),
        Bulk(Vec<usize>),
    }

    // 记录写入调用的内存仓储
    #[derive(Default)]
    struct RecordingRepo {
        calls: Mutex<Vec<Call>>,
        fail_single_row: Option<usize>,
        fail_bulk: bool,
        // 模拟 SQLite 在语句失败时回滚整个事务
        drops_transaction: bool,
    }

    impl IngredientImportRepository for RecordingRepo {
        fn begin(&self) -> RepositoryResult<()> {
            Ok(())
        }
        fn commit(&self) -> RepositoryResult<()> {
            Ok(())
        }
        fn rollback(&self) -> RepositoryResult<()> {
            Ok(())
        }
        fn in_transaction(&self) -> RepositoryResult<bool> {
            Ok(!self.drops_transaction)
        }
        fn find_or_create_supplier(&self, _name: &str) -> RepositoryResult<i64> {
            Ok(1)
        }
        fn create_ingredient(&self, record: &NewIngredient) -> RepositoryResult<i64> {
            if self.fail_single_row == Some(record.row_number) {
                return Err(RepositoryError::ConstraintViolation("forced failure".to_string()));
            }
            self.calls.lock().unwrap().push(Call::Single(record.row_number));
            Ok(record.row_number as i64)
        }
        fn bulk_insert_ingredients(&self, records: &[NewIngredient]) -> RepositoryResult<usize> {
            if self.fail_bulk {
                return Err(RepositoryError::ConstraintViolation("forced failure".to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Bulk(records.iter().map(|r| r.row_number).collect()));
            Ok(records.len())
        }
        fn count_suppliers(&self) -> RepositoryResult<usize> {
            Ok(0)
        }
        fn count_ingredients(&self) -> RepositoryResult<usize> {
            Ok(0)
        }
        fn list_ingredients(&self) -> RepositoryResult<Vec<IngredientRow>> {
            Ok(vec![])
        }
    }

    fn record(row_number: usize) -> NewIngredient {
        NewIngredient {
            name: format!("Ingredient {row_number}"),
            inci: None,
            description: None,
            moq: None,
            price: None,
            is_sample: false,
            in_stock: false,
            supplier_id: None,
            row_number,
        }
    }

    #[test]
    fn test_switches_to_batches_after_threshold() {
        let repo = RecordingRepo::default();
        let mut writer = BatchWriter::new(2, 3);

        // 已读行数 1..=7，行号 = 已读行数 + 1
        let outcomes: Vec<_> = (1..=7)
            .map(|seen| writer.write(&repo, seen, record(seen + 1)).unwrap())
            .collect();

        assert_eq!(outcomes[0], WriteOutcome::Written);
        assert_eq!(outcomes[1], WriteOutcome::Written);
        assert!(outcomes[2..].iter().all(|o| *o == WriteOutcome::Queued));
        assert_eq!(writer.pending_len(), 2);

        assert_eq!(writer.finish(&repo).unwrap(), 2);
        assert_eq!(writer.finish(&repo).unwrap(), 0);
        assert_eq!(
            *repo.calls.lock().unwrap(),
            vec![
                Call::Single(2),
                Call::Single(3),
                Call::Bulk(vec![4, 5, 6]),
                Call::Bulk(vec![7, 8]),
            ]
        );
        assert_eq!(writer.batches_flushed(), 2);
    }

    #[test]
    fn test_individual_failure_is_row_level() {
        let repo = RecordingRepo {
            fail_single_row: Some(3),
            ..Default::default()
        };
        let mut writer = BatchWriter::new(50, 100);

        assert_eq!(writer.write(&repo, 1, record(2)).unwrap(), WriteOutcome::Written);
        match writer.write(&repo, 2, record(3)).unwrap() {
            WriteOutcome::Rejected(issue) => assert_eq!(
                issue.to_string(),
                "Row 3: Error importing ingredient: constraint violated: forced failure"
            ),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(writer.write(&repo, 3, record(4)).unwrap(), WriteOutcome::Written);
    }

    #[test]
    fn test_bulk_failure_is_import_level() {
        let repo = RecordingRepo {
            fail_bulk: true,
            ..Default::default()
        };
        let mut writer = BatchWriter::new(0, 2);

        assert_eq!(writer.write(&repo, 1, record(2)).unwrap(), WriteOutcome::Queued);
        let err = writer.write(&repo, 2, record(3)).unwrap_err();
        match err {
            ImportError::BulkWriteFailed {
                first_row,
                last_row,
                ..
            } => assert_eq!((first_row, last_row), (2, 3)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_individual_failure_after_transaction_loss_aborts() {
        let repo = RecordingRepo {
            fail_single_row: Some(3),
            drops_transaction: true,
            ..Default::default()
        };
        let mut writer = BatchWriter::new(50, 100);

        assert_eq!(writer.write(&repo, 1, record(2)).unwrap(), WriteOutcome::Written);
        match writer.write(&repo, 2, record(3)).unwrap_err() {
            ImportError::TransactionAborted { row, message } => {
                assert_eq!(row, 3);
                assert!(message.contains("forced failure"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
