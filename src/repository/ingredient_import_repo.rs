// ==========================================
// 配方原料库存系统 - 原料导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::ingredient::{IngredientRow, NewIngredient};
use crate::repository::error::RepositoryResult;

// ==========================================
// IngredientImportRepository Trait
// ==========================================
// 用途: 原料导入相关数据访问
// 实现者: IngredientImportRepositoryImpl（使用 rusqlite）
//
// 一次导入的所有写入都在同一个显式事务内：
// begin → (find_or_create_supplier | create_ingredient | bulk_insert_ingredients)* → commit / rollback
pub trait IngredientImportRepository: Send + Sync {
    // ===== 事务控制 =====

    /// 开启导入事务
    fn begin(&self) -> RepositoryResult<()>;

    /// 提交导入事务
    fn commit(&self) -> RepositoryResult<()>;

    /// 回滚导入事务（撤销本次导入的全部写入）
    fn rollback(&self) -> RepositoryResult<()>;

    /// 导入事务是否仍然有效
    ///
    /// 磁盘已满、I/O 错误或触发器 RAISE(ROLLBACK) 时，SQLite 会在语句失败的同时回滚整个事务
    fn in_transaction(&self) -> RepositoryResult<bool>;

    // ===== 写入 =====

    /// 按名称精确查找供应商，不存在则创建
    ///
    /// # 返回
    /// - Ok(i64): 供应商 ID（同名多次调用返回同一 ID）
    fn find_or_create_supplier(&self, name: &str) -> RepositoryResult<i64>;

    /// 写入单条原料
    ///
    /// 失败通常只影响该条语句；调用方需用 in_transaction 确认事务仍有效
    fn create_ingredient(&self, record: &NewIngredient) -> RepositoryResult<i64>;

    /// 批量写入原料
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    /// - Err: 批内任一条失败（调用方负责回滚整个事务）
    fn bulk_insert_ingredients(&self, records: &[NewIngredient]) -> RepositoryResult<usize>;

    // ===== 查询 =====

    /// 统计 suppliers 表记录数
    fn count_suppliers(&self) -> RepositoryResult<usize>;

    /// 统计 ingredients 表记录数
    fn count_ingredients(&self) -> RepositoryResult<usize>;

    /// 列出原料（附带供应商名称，按 id 升序）
    fn list_ingredients(&self) -> RepositoryResult<Vec<IngredientRow>>;
}
