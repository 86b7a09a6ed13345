// ==========================================
// 设备维护计划排程系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout, 减少并发写入时的偶发 busy 错误
// - 建立调用存储表 (幂等)
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 调用存储表结构
///
/// 主键 (plan_num, seq_no): seq_no 为调用在调用链中的插入顺序
const SCHEDULE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS maintenance_call (
    plan_num          TEXT    NOT NULL,
    seq_no            INTEGER NOT NULL,
    call_num          INTEGER NOT NULL,
    planned_date      TEXT    NOT NULL,
    call_date         TEXT    NOT NULL,
    completion_date   TEXT    NOT NULL DEFAULT '',
    start_date        TEXT    NOT NULL,
    last_planned_date TEXT    NOT NULL DEFAULT '',
    prev_call_num     INTEGER NOT NULL,
    scheduling_type   TEXT    NOT NULL,
    status            TEXT    NOT NULL,
    due_package       TEXT    NOT NULL DEFAULT '',
    PRIMARY KEY (plan_num, seq_no)
);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建立调用存储表 (幂等)
pub fn init_schedule_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEDULE_SCHEMA)
}
