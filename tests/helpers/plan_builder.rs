// ==========================================
// 测试数据构建器 - 计划 / 策略 / 上下文
// ==========================================

use chrono::NaiveDate;
use maint_call_scheduler::domain::strategy::{
    MaintenancePackage, MaintenanceStrategy, StrategyHeader,
};
use maint_call_scheduler::domain::{
    FactoryCalendar, MaintenancePlan, PeriodUnit, SchedulingContext, SchedulingIndicator,
};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 以指定"今天"建立排程上下文 (调用对象间隔 0 天)
pub fn ctx(today: NaiveDate) -> SchedulingContext {
    SchedulingContext::new(today, 0).unwrap()
}

// ==========================================
// MaintenancePlan 构建器
// ==========================================

pub struct PlanBuilder {
    plan: MaintenancePlan,
}

impl PlanBuilder {
    /// 默认: 1 MON 周期, 关键日期排程, 容差 10%, 调用期限 50%, 排程 90 天
    pub fn monthly(plan_num: &str) -> Self {
        Self {
            plan: MaintenancePlan {
                plan_num: plan_num.to_string(),
                cycle: 1.0,
                cycle_unit: PeriodUnit::Month,
                offset: 0.0,
                sf_late: 100,
                late_tolerance: 10,
                sf_early: 100,
                early_tolerance: 10,
                cycle_change_factor: 1.0,
                call_horizon: 50,
                schedule_period: 90.0,
                sp_unit: PeriodUnit::Day,
                completion_requirement: false,
                start_date: ymd(2023, 6, 1),
                scheduling_indicator: SchedulingIndicator::KeyDate,
                factory_calendar: None,
            },
        }
    }

    pub fn cycle(mut self, cycle: f64, unit: PeriodUnit) -> Self {
        self.plan.cycle = cycle;
        self.plan.cycle_unit = unit;
        self
    }

    pub fn indicator(mut self, indicator: SchedulingIndicator) -> Self {
        self.plan.scheduling_indicator = indicator;
        self
    }

    pub fn schedule_period(mut self, period: f64, unit: PeriodUnit) -> Self {
        self.plan.schedule_period = period;
        self.plan.sp_unit = unit;
        self
    }

    pub fn call_horizon(mut self, horizon: u32) -> Self {
        self.plan.call_horizon = horizon;
        self
    }

    pub fn completion_requirement(mut self, required: bool) -> Self {
        self.plan.completion_requirement = required;
        self
    }

    pub fn offset(mut self, offset: f64) -> Self {
        self.plan.offset = offset;
        self
    }

    pub fn holidays(mut self, holidays: &[&str]) -> Self {
        self.plan.factory_calendar = Some(FactoryCalendar::from_yyyymmdd(holidays).unwrap());
        self
    }

    pub fn build(self) -> MaintenancePlan {
        self.plan
    }
}

// ==========================================
// 维护策略
// ==========================================

pub fn package(number: u32, months: f64, short_text: &str) -> MaintenancePackage {
    MaintenancePackage {
        number,
        cycle: months,
        unit: PeriodUnit::Month,
        cycle_text: format!("{}-monthly", months),
        cycle_short_text: short_text.to_string(),
        hierarchy: number,
        hierarchy_text: format!("H{}", number),
        offset: 0.0,
        offset_text: String::new(),
        lead_float_days: 2,
        followup_float_days: 2,
        operation_bound: true,
    }
}

pub fn strategy_header() -> StrategyHeader {
    StrategyHeader {
        name: "A".to_string(),
        description: "Scheduling by time".to_string(),
        scheduling_indicator: SchedulingIndicator::Time,
        unit: PeriodUnit::Month,
        call_horizon: 0,
        sf_late: 0,
        late_tolerance: 0,
        sf_early: 0,
        early_tolerance: 0,
        factory_calendar: None,
    }
}

/// 2M / 3M 两个维护包
pub fn two_package_strategy() -> MaintenanceStrategy {
    MaintenanceStrategy::new(
        strategy_header(),
        vec![package(1, 2.0, "2M"), package(2, 3.0, "3M")],
    )
    .unwrap()
}

/// 2M / 3M / 5M 三个维护包
pub fn three_package_strategy() -> MaintenanceStrategy {
    MaintenanceStrategy::new(
        strategy_header(),
        vec![
            package(1, 2.0, "2M"),
            package(2, 3.0, "3M"),
            package(3, 5.0, "5M"),
        ],
    )
    .unwrap()
}
