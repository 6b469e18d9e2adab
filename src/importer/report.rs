// ==========================================
// 配方原料库存系统 - 导入报告汇总
// ==========================================
// 职责: 行级问题消息 + total/success/errors 计数 + 明细截断
// ==========================================

use crate::domain::ingredient::{CanonicalField, ImportReport};
use thiserror::Error;

// ==========================================
// RowIssue - 行级问题
// ==========================================
// 行级问题是普通的值：不会中止导入，由汇总器决定计入 success 还是 errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowIssue {
    #[error("Row {row}: Invalid sample value '{value}'. Using 'false' as default.")]
    InvalidSample { row: usize, value: String },

    #[error("Row {row}: Invalid {field} value '{value}'. Using null as default.")]
    InvalidNumber {
        row: usize,
        field: CanonicalField,
        value: String,
    },

    #[error("Row {row}: Missing ingredient name")]
    MissingName { row: usize },

    #[error("Row {row}: Error creating supplier '{supplier}': {message}")]
    SupplierFailed {
        row: usize,
        supplier: String,
        message: String,
    },

    #[error("Row {row}: Error importing ingredient: {message}")]
    WriteFailed { row: usize, message: String },
}

// ==========================================
// ReportAggregator - 报告汇总器
// ==========================================
#[derive(Debug)]
pub struct ReportAggregator {
    report: ImportReport,
    max_error_details: usize,
}

impl ReportAggregator {
    pub fn new(max_error_details: usize) -> Self {
        Self {
            report: ImportReport::default(),
            max_error_details,
        }
    }

    /// 读到一条数据记录（含全空白行）
    pub fn record_seen(&mut self) -> usize {
        self.report.total += 1;
        self.report.total
    }

    /// 行写入成功（或进入批量队列），附带的软错误仍记录
    pub fn record_success(&mut self, issues: Vec<RowIssue>) {
        self.report.success += 1;
        self.push_details(issues);
    }

    /// 行被拒绝（缺名称 / 单行写入失败）
    pub fn record_failure(&mut self, issues: Vec<RowIssue>) {
        self.report.errors += 1;
        self.push_details(issues);
    }

    fn push_details(&mut self, issues: Vec<RowIssue>) {
        if issues.is_empty() {
            return;
        }
        self.report
            .error_details
            .push(issues.iter().map(ToString::to_string).collect());
    }

    pub fn total(&self) -> usize {
        self.report.total
    }

    /// 结束汇总：明细超过上限时保留前 N 条并追加一条省略说明
    pub fn finish(mut self) -> ImportReport {
        let kept = self.max_error_details;
        let len = self.report.error_details.len();
        if len > kept {
            self.report.error_details.truncate(kept);
            self.report.error_details.push(vec![format!(
                "... and {} more errors (see logs for details)",
                len - kept
            )]);
        }
        self.report
    }
}
