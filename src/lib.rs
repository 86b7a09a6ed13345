// ==========================================
// 设备维护计划排程系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite / JSON 存储
// 系统定位: 维护计划调用链的排程、下达与完工跟踪
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体、日期运算与维护包序列
pub mod domain;

// 数据仓储层 - 调用链存储
pub mod repository;

// 引擎层 - 调用推导与调用链编排
pub mod engine;

// 配置层 - 调度器配置与计划参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 会话与调度器入口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{CallStatus, PeriodUnit, SchedulingIndicator, SchedulingType};

// 领域实体
pub use domain::{
    Call, CallRow, FactoryCalendar, MaintenancePackage, MaintenancePlan, MaintenanceStrategy,
    MonthDelta, SchedulingContext, SchedulingPlan, StrategyPlan,
};

// 引擎
pub use engine::{CallObjectCreator, EngineError, Rejection, Scheduler};

// 存储
pub use repository::{JsonScheduleStore, ScheduleStore, SqliteScheduleStore};

// 配置
pub use config::{PlanParams, SchedulerConfig, StrategyConfig};

// API
pub use api::{ApiError, ApiResult, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备维护计划排程系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
