// ==========================================
// 设备维护计划排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、日期运算与维护包序列
// 红线: 不含存储访问逻辑, 不含调用链编排逻辑
// ==========================================

pub mod calendar;
pub mod call;
pub mod context;
pub mod error;
pub mod plan;
pub mod strategy;
pub mod types;

// 重导出核心类型
pub use calendar::{FactoryCalendar, MonthDelta};
pub use call::{Call, CallCycle, CallRow, MANUAL_CALL_NUM_START};
pub use context::SchedulingContext;
pub use error::{DomainError, DomainResult};
pub use plan::{MaintenancePlan, SchedulingPlan, StrategyPlan};
pub use strategy::{
    MaintenancePackage, MaintenanceStrategy, PackageKey, SequenceEntry, StrategyHeader,
};
pub use types::{CallStatus, PeriodUnit, SchedulingIndicator, SchedulingType};
