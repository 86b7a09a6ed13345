// ==========================================
// 设备维护计划排程系统 - SQLite 排程存储
// ==========================================
// 表: maintenance_call (plan_num, seq_no) 主键
// 写入: 事务内先删后插, 保证计划的调用链整体替换
// ==========================================

use crate::db::{configure_sqlite_connection, init_schedule_schema, open_sqlite_connection};
use crate::domain::call::CallRow;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::schedule_store::ScheduleStore;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 调用号转为 SQLite 整数; 超出 i64 范围的调用号不能存储
fn to_sql_int(value: u64, field: &str) -> RepositoryResult<i64> {
    i64::try_from(value)
        .map_err(|_| anyhow::anyhow!("{} = {} 超出存储范围", field, value).into())
}

// ==========================================
// SqliteScheduleStore - SQLite 调用仓储
// ==========================================
pub struct SqliteScheduleStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteScheduleStore {
    /// 打开数据库文件并建表
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schedule_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            init_schedule_schema(&guard)?;
        }
        Ok(Self { conn })
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 列出已存储的计划号
    pub fn list_plan_nums(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT plan_num FROM maintenance_call ORDER BY plan_num")?;
        let nums = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(nums)
    }
}

impl ScheduleStore for SqliteScheduleStore {
    fn load_rows(&self, plan_num: &str) -> RepositoryResult<Vec<CallRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                call_num, planned_date, call_date, completion_date,
                start_date, last_planned_date, prev_call_num,
                scheduling_type, status, due_package
            FROM maintenance_call
            WHERE plan_num = ?1
            ORDER BY seq_no
            "#,
        )?;

        let rows = stmt
            .query_map(params![plan_num], |row| {
                Ok(CallRow {
                    call_num: row.get::<_, i64>(0)? as u64,
                    planned_date: row.get(1)?,
                    call_date: row.get(2)?,
                    completion_date: row.get(3)?,
                    start_date: row.get(4)?,
                    last_planned_date: row.get(5)?,
                    prev_call_num: row.get::<_, i64>(6)? as u64,
                    scheduling_type: row.get(7)?,
                    status: row.get(8)?,
                    due_package: row.get(9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    fn save_rows(&mut self, plan_num: &str, rows: &[CallRow]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tx.execute("DELETE FROM maintenance_call WHERE plan_num = ?1", params![plan_num])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO maintenance_call (
                    plan_num, seq_no, call_num, planned_date, call_date, completion_date,
                    start_date, last_planned_date, prev_call_num,
                    scheduling_type, status, due_package
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )?;

            for (seq_no, row) in rows.iter().enumerate() {
                stmt.execute(params![
                    plan_num,
                    seq_no as i64,
                    to_sql_int(row.call_num, "call_num")?,
                    row.planned_date,
                    row.call_date,
                    row.completion_date,
                    row.start_date,
                    row.last_planned_date,
                    to_sql_int(row.prev_call_num, "prev_call_num")?,
                    row.scheduling_type,
                    row.status,
                    row.due_package,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::debug!("SqliteScheduleStore: 写入计划 {} 的 {} 条调用", plan_num, rows.len());
        Ok(())
    }
}
