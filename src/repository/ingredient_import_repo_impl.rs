// ==========================================
// 配方原料库存系统 - 原料导入 Repository 实现
// ==========================================
// 职责: 实现导入相关数据访问（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::ingredient::{IngredientRow, NewIngredient};
use crate::perf::install_sqlite_tracing;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::ingredient_import_repo::IngredientImportRepository;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex, MutexGuard};

const INSERT_INGREDIENT_SQL: &str = r#"
    INSERT INTO ingredients (
        name, inci, description, moq, price,
        is_sample, in_stock, supplier_id, created_at, updated_at
    ) VALUES (
        ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
    )
"#;

// ==========================================
// IngredientImportRepositoryImpl
// ==========================================
pub struct IngredientImportRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl IngredientImportRepositoryImpl {
    /// 创建新的 Repository 实例（独占一个连接）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let mut conn = open_sqlite_connection(db_path)?;
        install_sqlite_tracing(&mut conn);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn execute_ingredient(
        conn: &Connection,
        record: &NewIngredient,
        now: &str,
    ) -> RepositoryResult<i64> {
        let mut stmt = conn.prepare_cached(INSERT_INGREDIENT_SQL)?;
        stmt.execute(params![
            record.name,
            record.inci,
            record.description,
            record.moq,
            record.price,
            record.is_sample,
            record.in_stock,
            record.supplier_id,
            now,
            now,
        ])?;
        Ok(conn.last_insert_rowid())
    }
}

impl IngredientImportRepository for IngredientImportRepositoryImpl {
    fn begin(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        // IMMEDIATE: 事务开始即持有写锁，并发导入在此排队
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn commit(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn rollback(&self) -> RepositoryResult<()> {
        let conn = self.lock()?;
        if conn.is_autocommit() {
            // 无活动事务（SQLite 已自动回滚）
            return Ok(());
        }
        conn.execute_batch("ROLLBACK")
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))
    }

    fn in_transaction(&self) -> RepositoryResult<bool> {
        Ok(!self.lock()?.is_autocommit())
    }

    fn find_or_create_supplier(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        // UNIQUE(name) + DO NOTHING：并发创建同名供应商时不会产生重复
        conn.execute(
            r#"
            INSERT INTO suppliers (name, contact_person, phone_number, created_at, updated_at)
            VALUES (?1, '', '', ?2, ?2)
            ON CONFLICT(name) DO NOTHING
            "#,
            params![name, now],
        )?;

        let id = conn.query_row(
            "SELECT id FROM suppliers WHERE name = ?1",
            params![name],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(id)
    }

    fn create_ingredient(&self, record: &NewIngredient) -> RepositoryResult<i64> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();
        Self::execute_ingredient(&conn, record, &now)
    }

    fn bulk_insert_ingredients(&self, records: &[NewIngredient]) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let mut count = 0;
        for record in records {
            Self::execute_ingredient(&conn, record, &now)?;
            count += 1;
        }

        Ok(count)
    }

    fn count_suppliers(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM suppliers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count_ingredients(&self) -> RepositoryResult<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM ingredients", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn list_ingredients(&self) -> RepositoryResult<Vec<IngredientRow>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT i.id, i.name, i.inci, i.description, i.moq, i.price,
                   i.is_sample, i.in_stock, i.supplier_id, s.name
            FROM ingredients i
            LEFT JOIN suppliers s ON s.id = i.supplier_id
            ORDER BY i.id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(IngredientRow {
                id: row.get(0)?,
                name: row.get(1)?,
                inci: row.get(2)?,
                description: row.get(3)?,
                moq: row.get(4)?,
                price: row.get(5)?,
                is_sample: row.get(6)?,
                in_stock: row.get(7)?,
                supplier_id: row.get(8)?,
                supplier_name: row.get(9)?,
            })
        })?;

        let mut ingredients = Vec::new();
        for row in rows {
            ingredients.push(row?);
        }
        Ok(ingredients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn setup_repo() -> IngredientImportRepositoryImpl {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        IngredientImportRepositoryImpl::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn sample(name: &str) -> NewIngredient {
        NewIngredient {
            name: name.to_string(),
            inci: None,
            description: None,
            moq: Some(1.5),
            price: None,
            is_sample: true,
            in_stock: true,
            supplier_id: None,
            row_number: 2,
        }
    }

    #[test]
    fn test_find_or_create_supplier_is_idempotent() {
        let repo = setup_repo();
        let first = repo.find_or_create_supplier("Acme").unwrap();
        let second = repo.find_or_create_supplier("Acme").unwrap();
        let other = repo.find_or_create_supplier("acme").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other, "名称精确匹配（区分大小写）");
        assert_eq!(repo.count_suppliers().unwrap(), 2);
    }

    #[test]
    fn test_rollback_discards_writes() {
        let repo = setup_repo();
        repo.begin().unwrap();
        let supplier_id = repo.find_or_create_supplier("Acme").unwrap();
        let mut record = sample("Glycerin");
        record.supplier_id = Some(supplier_id);
        repo.create_ingredient(&record).unwrap();
        repo.bulk_insert_ingredients(&[sample("Squalane"), sample("Niacinamide")])
            .unwrap();
        repo.rollback().unwrap();

        assert_eq!(repo.count_ingredients().unwrap(), 0);
        assert_eq!(repo.count_suppliers().unwrap(), 0);
    }

    #[test]
    fn test_list_ingredients_joins_supplier_name() {
        let repo = setup_repo();
        repo.begin().unwrap();
        let supplier_id = repo.find_or_create_supplier("Acme").unwrap();
        let mut record = sample("Glycerin");
        record.supplier_id = Some(supplier_id);
        repo.create_ingredient(&record).unwrap();
        repo.commit().unwrap();

        let rows = repo.list_ingredients().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Glycerin");
        assert_eq!(rows[0].moq, Some(1.5));
        assert!(rows[0].in_stock);
        assert_eq!(rows[0].supplier_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn test_rollback_without_transaction_is_noop() {
        let repo = setup_repo();
        assert!(repo.rollback().is_ok());
    }

    #[test]
    fn test_in_transaction_tracks_sqlite_rollback() {
        let repo = setup_repo();
        repo.lock()
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER drop_tx BEFORE INSERT ON ingredients
                 WHEN NEW.name = 'BOOM'
                 BEGIN SELECT RAISE(ROLLBACK, 'transaction dropped'); END;",
            )
            .unwrap();
        assert!(!repo.in_transaction().unwrap());

        repo.begin().unwrap();
        assert!(repo.in_transaction().unwrap());

        repo.create_ingredient(&sample("Glycerin")).unwrap();
        assert!(repo.create_ingredient(&sample("BOOM")).is_err());

        assert!(!repo.in_transaction().unwrap());
        assert_eq!(repo.count_ingredients().unwrap(), 0);
    }
}
