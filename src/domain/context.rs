// ==========================================
// 设备维护计划排程系统 - 排程上下文
// ==========================================
// 职责: 固定一次排程会话内的"今天"与截止参考日期
// 红线: 会话内不可变, 所有调用期限判断使用同一参考日期
// ==========================================

use crate::domain::calendar::add_days;
use crate::domain::error::DomainResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 排程上下文
///
/// - `today`: 会话的"今天", 用于下达日期与排程截止日
/// - `reference_date`: 期限监控参考日 = today + 调用对象间隔天数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingContext {
    today: NaiveDate,
    call_object_interval_days: i64,
    reference_date: NaiveDate,
}

impl SchedulingContext {
    /// 以指定日期建立上下文
    pub fn new(today: NaiveDate, call_object_interval_days: i64) -> DomainResult<Self> {
        let reference_date = add_days(today, call_object_interval_days)?;
        Ok(Self {
            today,
            call_object_interval_days,
            reference_date,
        })
    }

    /// 以本地当前日期建立上下文
    pub fn for_today(call_object_interval_days: i64) -> DomainResult<Self> {
        Self::new(chrono::Local::now().date_naive(), call_object_interval_days)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn call_object_interval_days(&self) -> i64 {
        self.call_object_interval_days
    }

    /// 期限监控参考日期
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }
}
