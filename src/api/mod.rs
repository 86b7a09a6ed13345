// ==========================================
// 设备维护计划排程系统 - API 层
// ==========================================
// 职责: 会话上下文管理, 按配置打开/保存调度器
// ==========================================

pub mod error;
pub mod schedule_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use schedule_api::ScheduleApi;
