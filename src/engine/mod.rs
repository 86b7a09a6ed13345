// ==========================================
// 设备维护计划排程系统 - 引擎层
// ==========================================
// 职责: 调用推导、调用链编排与调用操作
// 红线: 引擎不直接读写文件/数据库, 存储通过 ScheduleStore 注入
// ==========================================

pub mod call_factory;
pub mod error;
pub mod events;
pub mod scheduler;

// 重导出核心引擎
pub use call_factory::{call_date_and_status, shifting_days, tolerance_exceeded, CallFactory};
pub use error::{CallAction, EngineError, EngineResult, Rejection};
pub use events::{
    CallObjectCreator, CallObjectRequest, NoOpCallObjectCreator, RecordingCallObjectCreator,
};
pub use scheduler::Scheduler;
