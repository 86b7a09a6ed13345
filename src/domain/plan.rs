// ==========================================
// 设备维护计划排程系统 - 维护计划领域模型
// ==========================================
// 职责: 计划参数与日期运算 (周期、容差、调用期限、排程截止日)
// 说明: 单周期计划与策略计划共用 MaintenancePlan 参数,
//       策略计划额外持有维护策略与周期内起始偏移
// ==========================================

use crate::domain::calendar::{add_days, days_between, whole_days, FactoryCalendar, MonthDelta};
use crate::domain::context::SchedulingContext;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::strategy::MaintenanceStrategy;
use crate::domain::types::{PeriodUnit, SchedulingIndicator};
use chrono::NaiveDate;
use std::fmt;

// ==========================================
// MaintenancePlan - 维护计划
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenancePlan {
    pub plan_num: String,                  // 计划号
    pub cycle: f64,                        // 周期长度
    pub cycle_unit: PeriodUnit,            // 周期单位
    pub offset: f64,                       // 偏移 (周期单位)
    pub sf_late: i64,                      // 延迟完工平移系数 (%)
    pub late_tolerance: i64,               // 延迟完工容差 (%)
    pub sf_early: i64,                     // 提前完工平移系数 (%)
    pub early_tolerance: i64,              // 提前完工容差 (%)
    pub cycle_change_factor: f64,          // 周期变更系数
    pub call_horizon: u32,                 // 调用期限 (周期的 %)
    pub schedule_period: f64,              // 排程期间
    pub sp_unit: PeriodUnit,               // 排程期间单位
    pub completion_requirement: bool,      // 完工要求: 上一调用完工后才可下达
    pub start_date: NaiveDate,             // 开始日期
    pub scheduling_indicator: SchedulingIndicator,
    pub factory_calendar: Option<FactoryCalendar>,
}

impl MaintenancePlan {
    /// 参数校验
    ///
    /// # 规则
    /// - 周期天数 (含周期变更系数) 必须大于 0
    /// - 调用期限在 0..=100 之间
    /// - 工厂日历排程必须配置工厂日历
    pub fn validate(&self) -> DomainResult<()> {
        let cycle_days = self.cycle_in_days();
        if cycle_days.is_nan() || cycle_days <= 0.0 {
            return Err(DomainError::FieldValueError {
                field: "cycle".to_string(),
                message: format!("计划 {} 的周期天数必须大于 0, 实际 {}", self.plan_num, cycle_days),
            });
        }

        if self.call_horizon > 100 {
            return Err(DomainError::FieldValueError {
                field: "call_horizon".to_string(),
                message: format!("调用期限必须在 0..=100 之间, 实际 {}", self.call_horizon),
            });
        }

        if self.schedule_period < 0.0 {
            return Err(DomainError::FieldValueError {
                field: "schedule_period".to_string(),
                message: format!("排程期间不能为负, 实际 {}", self.schedule_period),
            });
        }

        if self.scheduling_indicator == SchedulingIndicator::FactoryCalendar
            && self.factory_calendar.is_none()
        {
            return Err(DomainError::MissingFactoryCalendar {
                plan_num: self.plan_num.clone(),
            });
        }

        Ok(())
    }

    /// 周期天数 = 周期变更系数 × 周期换算天数
    pub fn cycle_in_days(&self) -> f64 {
        self.cycle_change_factor * self.cycle_unit.to_days(self.cycle)
    }

    /// 偏移天数 = 周期变更系数 × 偏移换算天数
    pub fn offset_in_days(&self) -> f64 {
        self.cycle_change_factor * self.cycle_unit.to_days(self.offset)
    }

    /// 按排程标识推进日期
    ///
    /// - Time: 加自然日
    /// - KeyDate: 加 `delta / 30` 个整月 (按月末截断)
    /// - FactoryCalendar: 按工厂日历推进工作日
    /// - 计数器类: 不支持, 返回错误
    pub fn date_add_by_indicator(&self, base: NaiveDate, delta_in_days: f64) -> DomainResult<NaiveDate> {
        let delta = whole_days(delta_in_days);
        match self.scheduling_indicator {
            SchedulingIndicator::Time => add_days(base, delta),
            SchedulingIndicator::KeyDate => {
                let months = i32::try_from(delta.div_euclid(30)).map_err(|_| DomainError::DateOutOfRange {
                    base,
                    detail: format!("{} days", delta),
                })?;
                MonthDelta::new(months).add_to(base)
            }
            SchedulingIndicator::FactoryCalendar => match &self.factory_calendar {
                Some(calendar) => calendar.add_workdays(base, delta),
                None => Err(DomainError::MissingFactoryCalendar {
                    plan_num: self.plan_num.clone(),
                }),
            },
            other => Err(DomainError::UnsupportedSchedulingIndicator(other)),
        }
    }

    /// 下一计划日期 (推进一个周期)
    pub fn next_plan_date(&self, base: NaiveDate) -> DomainResult<NaiveDate> {
        self.date_add_by_indicator(base, self.cycle_in_days())
    }

    /// 首个调用的计划日期 (无上一调用时)
    ///
    /// 偏移非 0 时按自然日加偏移, 否则从开始日期推进一个周期
    pub fn initial_plan_date(&self) -> DomainResult<NaiveDate> {
        if self.offset != 0.0 {
            add_days(self.start_date, whole_days(self.offset_in_days()))
        } else {
            self.next_plan_date(self.start_date)
        }
    }

    /// 延迟完工容差天数
    pub fn late_tolerance_days(&self) -> i64 {
        whole_days(self.cycle_in_days() * self.late_tolerance as f64 / 100.0)
    }

    /// 提前完工容差天数
    pub fn early_tolerance_days(&self) -> i64 {
        whole_days(self.cycle_in_days() * self.early_tolerance as f64 / 100.0)
    }

    /// 排程截止日 = 今天 + 排程期间 (相对当前日期, 而非计划开始日期)
    pub fn scheduling_end_date(&self, ctx: &SchedulingContext) -> DomainResult<NaiveDate> {
        let period_days = whole_days(self.sp_unit.to_days(self.schedule_period));
        add_days(ctx.today(), period_days)
    }

    /// 调用期限是否已到
    ///
    /// (计划日期 - 参考日期) / 周期天数 ≤ (100 - 调用期限) / 100
    pub fn call_horizon_expired(&self, planned_date: NaiveDate, ctx: &SchedulingContext) -> bool {
        let remaining = days_between(planned_date, ctx.reference_date()) as f64;
        remaining / self.cycle_in_days() <= (100.0 - self.call_horizon as f64) / 100.0
    }

    /// 按调用期限推算的调用日期 = 计划日期 - 周期 + 周期 × 调用期限%
    pub fn call_date_by_horizon(&self, planned_date: NaiveDate) -> DomainResult<NaiveDate> {
        let cycle = self.cycle_in_days();
        let back = add_days(planned_date, -whole_days(cycle))?;
        add_days(back, whole_days(cycle * self.call_horizon as f64 / 100.0))
    }
}

impl fmt::Display for MaintenancePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Plan: {} Cycle: {} {} Offset: {}",
            self.plan_num, self.cycle, self.cycle_unit, self.offset
        )
    }
}

// ==========================================
// StrategyPlan - 策略计划
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyPlan {
    pub plan: MaintenancePlan,
    strategy: MaintenanceStrategy,
    /// 周期内起始偏移 (天)
    pub start_offset: u32,
}

impl StrategyPlan {
    /// 构造策略计划; 维护策略继承计划的周期变更系数
    pub fn new(plan: MaintenancePlan, mut strategy: MaintenanceStrategy) -> Self {
        strategy.cycle_change_factor = plan.cycle_change_factor;
        Self {
            plan,
            strategy,
            start_offset: 0,
        }
    }

    pub fn strategy(&self) -> &MaintenanceStrategy {
        &self.strategy
    }

    /// 下一计划日期
    ///
    /// 向策略取 previous_offset 之后的下一到期偏移, 偏移差 × 周期变更系数
    /// 换算为天数后按排程标识推进。
    pub fn next_plan_date(
        &self,
        base: NaiveDate,
        start_offset: u32,
        previous_offset: u32,
    ) -> DomainResult<NaiveDate> {
        let next_offset = self.strategy.next_offset(start_offset, previous_offset)?;
        let delta = self.strategy.offset_delta_in_days(previous_offset, next_offset);
        self.plan.date_add_by_indicator(base, delta)
    }
}

impl fmt::Display for StrategyPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} |{}", self.plan, self.strategy)
    }
}

// ==========================================
// SchedulingPlan - 排程计划 (单周期 / 策略)
// ==========================================
// 变体在调度器构造时确定, 同时决定调用的构造方式
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulingPlan {
    SingleCycle(MaintenancePlan),
    Strategy(StrategyPlan),
}

impl SchedulingPlan {
    /// 公共计划参数
    pub fn base(&self) -> &MaintenancePlan {
        match self {
            SchedulingPlan::SingleCycle(plan) => plan,
            SchedulingPlan::Strategy(plan) => &plan.plan,
        }
    }

    pub fn base_mut(&mut self) -> &mut MaintenancePlan {
        match self {
            SchedulingPlan::SingleCycle(plan) => plan,
            SchedulingPlan::Strategy(plan) => &mut plan.plan,
        }
    }

    pub fn as_strategy(&self) -> Option<&StrategyPlan> {
        match self {
            SchedulingPlan::Strategy(plan) => Some(plan),
            SchedulingPlan::SingleCycle(_) => None,
        }
    }

    pub fn as_strategy_mut(&mut self) -> Option<&mut StrategyPlan> {
        match self {
            SchedulingPlan::Strategy(plan) => Some(plan),
            SchedulingPlan::SingleCycle(_) => None,
        }
    }

    pub fn plan_num(&self) -> &str {
        &self.base().plan_num
    }
}
