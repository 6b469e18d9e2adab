// ==========================================
// 配方原料库存系统 - 性能观测
// ==========================================
// 职责: SQLite 语句计数 / 慢 SQL 日志 / 操作耗时
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static PERF_SQL_ENABLED: AtomicBool = AtomicBool::new(false);
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static PERF_DEPTH: Cell<u32> = const { Cell::new(0) };
    static SQL_COUNT: Cell<u64> = const { Cell::new(0) };
    static SLOW_SQL_COUNT: Cell<u64> = const { Cell::new(0) };
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

fn truncate_sql(sql: &str, max_chars: usize) -> String {
    let s = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

/// 安装 SQLite 语句 trace/profile（用于 SQL 计数 + 慢查询日志）
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭
/// - `FORMULA_INVENTORY_PERF_SQL=1` 强制开启
/// - `FORMULA_INVENTORY_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
pub fn install_sqlite_tracing(conn: &mut Connection) {
    let enabled = match std::env::var("FORMULA_INVENTORY_PERF_SQL") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    PERF_SQL_ENABLED.store(enabled, Ordering::Relaxed);

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    let slow_ms = std::env::var("FORMULA_INVENTORY_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
}

fn sql_trace_callback(_sql: &str) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    if PERF_DEPTH.with(|d| d.get()) == 0 {
        return;
    }
    SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    if !PERF_SQL_ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %truncate_sql(sql, 420),
            "slow sql"
        );
        if PERF_DEPTH.with(|d| d.get()) > 0 {
            SLOW_SQL_COUNT.with(|c| c.set(c.get().saturating_add(1)));
        }
    }
}

/// 某次操作的性能快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfStats {
    pub elapsed_ms: u64,
    pub sql_count: u64,
    pub slow_sql_count: u64,
}

/// 性能统计 Guard：记录 elapsed_ms + SQL 语句数 + 慢 SQL 数
///
/// SQL 计数是线程局部的，Guard 必须与被观测的 SQL 在同一线程。
///
/// ```ignore
/// let _perf = formula_inventory::perf::PerfGuard::new("import.ingredients");
/// // do work...
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    sql_start: u64,
    slow_sql_start: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        PERF_DEPTH.with(|d| d.set(d.get().saturating_add(1)));
        Self {
            op,
            start: Instant::now(),
            sql_start: SQL_COUNT.with(|c| c.get()),
            slow_sql_start: SLOW_SQL_COUNT.with(|c| c.get()),
        }
    }

    /// 当前累计值（不结束观测）
    pub fn snapshot(&self) -> PerfStats {
        PerfStats {
            elapsed_ms: self.start.elapsed().as_millis() as u64,
            sql_count: SQL_COUNT
                .with(|c| c.get())
                .saturating_sub(self.sql_start),
            slow_sql_count: SLOW_SQL_COUNT
                .with(|c| c.get())
                .saturating_sub(self.slow_sql_start),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let stats = self.snapshot();

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms = stats.elapsed_ms,
            sql_count = stats.sql_count,
            slow_sql_count = stats.slow_sql_count,
            "done"
        );

        PERF_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true_tokens() {
        assert!(is_true(" YES "));
        assert!(is_true("on"));
        assert!(!is_true("0"));
        assert!(!is_true("maybe"));
    }

    #[test]
    fn test_truncate_sql_collapses_whitespace() {
        let sql = "SELECT *\n    FROM ingredients";
        assert_eq!(truncate_sql(sql, 100), "SELECT * FROM ingredients");
        assert_eq!(truncate_sql(sql, 6), "SELECT…");
        // 多字节字符不会被截断在字节中间
        assert_eq!(truncate_sql("SELECT 'ăîș'", 9), "SELECT 'ă…");
    }

    #[test]
    fn test_perf_guard_nesting_restores_depth() {
        {
            let _outer = PerfGuard::new("outer");
            let inner = PerfGuard::new("inner");
            assert_eq!(PERF_DEPTH.with(|d| d.get()), 2);
            assert_eq!(inner.snapshot().sql_count, 0);
        }
        assert_eq!(PERF_DEPTH.with(|d| d.get()), 0);
    }
}
