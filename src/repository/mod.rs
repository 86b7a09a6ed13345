// ==========================================
// 设备维护计划排程系统 - 数据仓储层
// ==========================================
// 职责: 调用链的持久化 (JSON 文件 / SQLite)
// 红线: 仓储不含业务逻辑
// ==========================================

pub mod error;
pub mod json_store;
pub mod schedule_store;
pub mod sqlite_store;

// 重导出
pub use error::{RepositoryError, RepositoryResult};
pub use json_store::JsonScheduleStore;
pub use schedule_store::{get_default_store_path, ScheduleStore, DEFAULT_STORE_FILE, STORE_PATH_ENV};
pub use sqlite_store::SqliteScheduleStore;
