// ==========================================
// 设备维护计划排程系统 - 领域层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 领域层错误均为配置/参数类致命错误, 由上层中止当前操作
// ==========================================

use crate::domain::types::SchedulingIndicator;
use chrono::NaiveDate;
use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    // ===== 日期错误 =====
    #[error("日期超出可表示范围: base={base}, {detail}")]
    DateOutOfRange { base: NaiveDate, detail: String },

    #[error("日期格式错误 (期望 YYYYMMDD): {0}")]
    InvalidDate(String),

    // ===== 排程配置错误 =====
    #[error("排程标识 {0} 不支持日期推进")]
    UnsupportedSchedulingIndicator(SchedulingIndicator),

    #[error("维护计划 {plan_num} 使用工厂日历排程, 但未配置工厂日历")]
    MissingFactoryCalendar { plan_num: String },

    // ===== 策略错误 =====
    #[error("维护策略无效: {0}")]
    InvalidStrategy(String),

    #[error("维护包周期无效: package={package}, cycle_in_days={cycle_in_days} (必须为正整数天)")]
    InvalidPackageCycle { package: u32, cycle_in_days: f64 },

    #[error("维护包序列在扫描范围内找不到下一个到期日: start_offset={start_offset}, previous_offset={previous_offset}")]
    SequenceExhausted {
        start_offset: u32,
        previous_offset: u32,
    },

    // ===== 字段错误 =====
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },
}

/// Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
