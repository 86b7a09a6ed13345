// ==========================================
// 设备维护计划排程系统 - 配置层
// ==========================================
// 职责: 调度器配置、计划参数与策略行的加载和领域转换
// 格式: JSON
// ==========================================

pub mod error;
pub mod plan_config;
pub mod scheduler_config;

// 重导出
pub use error::{ConfigError, ConfigResult};
pub use plan_config::{PackageRow, PlanParams, StrategyConfig, StrategyHead};
pub use scheduler_config::{load_json, SchedulerConfig, DEFAULT_FACTORY_CALENDAR};
