// ==========================================
// 设备维护计划排程系统 - 调用工厂与调用规则
// ==========================================
// 职责:
// - 构造首个调用 / 由上一调用推导后继调用
// - 从存储行恢复调用
// - 调用重算 (完工容差、平移天数、调用期限规则)
// 说明: 调用变体由计划变体 (单周期 / 策略) 决定
// ==========================================

use crate::domain::calendar::{add_days, days_between, whole_days};
use crate::domain::call::{Call, CallCycle, CallRow};
use crate::domain::context::SchedulingContext;
use crate::domain::plan::{MaintenancePlan, SchedulingPlan};
use crate::domain::types::{CallStatus, SchedulingType};
use crate::engine::error::EngineResult;
use chrono::NaiveDate;

// ==========================================
// 完工容差与平移
// ==========================================

/// 上一调用完工日期与计划日期之差 (天); 未完工为 None
fn completion_delta(prev: &Call) -> Option<i64> {
    prev.completion_date
        .map(|completion| days_between(completion, prev.planned_date))
}

/// 上一调用的完工是否超出容差
///
/// - 延迟完工 (delta > 0): 延迟容差天数 < delta
/// - 提前或当天完工: 提前容差天数 < -delta
/// - 无上一调用或上一调用未完工: false
pub fn tolerance_exceeded(plan: &MaintenancePlan, prev: Option<&Call>) -> bool {
    match prev.and_then(completion_delta) {
        Some(delta) if delta > 0 => plan.late_tolerance_days() < delta,
        Some(delta) => plan.early_tolerance_days() < -delta,
        None => false,
    }
}

/// 平移天数 = ⌊delta × 平移系数 / 100⌋ (向下取整), 未超容差为 0
pub fn shifting_days(plan: &MaintenancePlan, prev: Option<&Call>) -> i64 {
    if !tolerance_exceeded(plan, prev) {
        return 0;
    }
    match prev.and_then(completion_delta) {
        Some(delta) if delta > 0 => (delta * plan.sf_late).div_euclid(100),
        Some(delta) => (delta * plan.sf_early).div_euclid(100),
        None => 0,
    }
}

/// 调用期限规则是否允许下达
///
/// 期限已到, 且 (无完工要求 或 上一调用已完工); 无上一调用视为已完工
fn horizon_releasable(
    plan: &MaintenancePlan,
    ctx: &SchedulingContext,
    planned_date: NaiveDate,
    prev: Option<&Call>,
) -> bool {
    if !plan.call_horizon_expired(planned_date, ctx) {
        return false;
    }
    !plan.completion_requirement || prev.map_or(true, Call::is_completed)
}

/// 按调用期限规则确定调用日期与状态
pub fn call_date_and_status(
    plan: &MaintenancePlan,
    ctx: &SchedulingContext,
    planned_date: NaiveDate,
    prev: Option<&Call>,
) -> EngineResult<(NaiveDate, CallStatus)> {
    if horizon_releasable(plan, ctx, planned_date, prev) {
        Ok((ctx.today(), CallStatus::SaveToCall))
    } else {
        Ok((plan.call_date_by_horizon(planned_date)?, CallStatus::Hold))
    }
}

// ==========================================
// CallFactory - 调用工厂
// ==========================================
pub struct CallFactory;

impl CallFactory {
    pub fn new() -> Self {
        Self
    }

    /// 首个调用
    ///
    /// - 单周期: 调用号由调用方给定, 排程类型 N
    /// - 策略: 上一偏移 = 起始偏移, 起始偏移为 0 时类型 N, 否则 Z
    pub fn first_call(
        &self,
        plan: &SchedulingPlan,
        ctx: &SchedulingContext,
        call_num: u64,
    ) -> EngineResult<Call> {
        let base = plan.base();
        let start_date = base.start_date;

        let (planned_date, scheduling_type, cycle, due_package) = match plan {
            SchedulingPlan::SingleCycle(p) => (
                p.initial_plan_date()?,
                SchedulingType::NewStart,
                CallCycle::SingleCycle,
                String::new(),
            ),
            SchedulingPlan::Strategy(sp) => {
                let previous_offset = sp.start_offset;
                let current_offset = sp.strategy().next_offset(sp.start_offset, previous_offset)?;
                let planned = sp.next_plan_date(start_date, sp.start_offset, previous_offset)?;
                let scheduling_type = if sp.start_offset == 0 {
                    SchedulingType::NewStart
                } else {
                    SchedulingType::CycleStart
                };
                let due = sp
                    .strategy()
                    .due_packages_text(planned, start_date, previous_offset);
                (
                    planned,
                    scheduling_type,
                    CallCycle::Strategy {
                        current_offset,
                        previous_offset,
                    },
                    due,
                )
            }
        };

        let (call_date, status) = call_date_and_status(base, ctx, planned_date, None)?;

        let call = Call {
            call_num,
            planned_date,
            call_date,
            completion_date: None,
            start_date,
            last_planned_date: None,
            prev_call_num: 0,
            scheduling_type,
            status,
            due_package,
            cycle,
        };
        tracing::debug!("CallFactory: 首个调用 {}", call);
        Ok(call)
    }

    /// 由上一调用推导后继调用 (调用号 +1, 排程类型 T)
    pub fn next_call(
        &self,
        plan: &SchedulingPlan,
        ctx: &SchedulingContext,
        prev: &Call,
    ) -> EngineResult<Call> {
        let base = plan.base();
        let start_date = base.start_date;

        let cycle = match plan {
            SchedulingPlan::SingleCycle(_) => CallCycle::SingleCycle,
            SchedulingPlan::Strategy(sp) => {
                let previous_offset = prev.current_offset();
                CallCycle::Strategy {
                    current_offset: sp.strategy().next_offset(sp.start_offset, previous_offset)?,
                    previous_offset,
                }
            }
        };

        let planned_date = self.planned_date_after(plan, cycle, prev)?;
        let due_package = match plan {
            SchedulingPlan::Strategy(sp) => sp.strategy().due_packages_text(
                planned_date,
                start_date,
                prev.current_offset(),
            ),
            SchedulingPlan::SingleCycle(_) => String::new(),
        };

        let (call_date, status) = call_date_and_status(base, ctx, planned_date, Some(prev))?;

        let call = Call {
            call_num: prev.call_num + 1,
            planned_date,
            call_date,
            completion_date: None,
            start_date,
            last_planned_date: Some(prev.planned_date),
            prev_call_num: prev.call_num,
            scheduling_type: SchedulingType::Scheduled,
            status,
            due_package,
            cycle,
        };
        tracing::debug!("CallFactory: 推导调用 {}", call);
        Ok(call)
    }

    /// 从存储行恢复调用
    ///
    /// 策略调用的周期偏移以 0 初始化, 由调度器按调用链重建
    pub fn restore(&self, plan: &SchedulingPlan, row: &CallRow) -> EngineResult<Call> {
        let cycle = match plan {
            SchedulingPlan::SingleCycle(_) => CallCycle::SingleCycle,
            SchedulingPlan::Strategy(_) => CallCycle::Strategy {
                current_offset: 0,
                previous_offset: 0,
            },
        };
        Ok(Call::from_row(row, cycle)?)
    }

    /// 重算调用
    ///
    /// 只处理非手工、状态为等待或待保存调用的调用; 返回是否重算。
    /// - 无上一调用: 按开始日期 (+ 偏移) 重算计划日期
    /// - 有上一调用: 按上一调用推进一个周期并叠加平移天数
    pub fn update(
        &self,
        plan: &SchedulingPlan,
        ctx: &SchedulingContext,
        call: &mut Call,
        prev: Option<&Call>,
    ) -> EngineResult<bool> {
        if call.is_manual() || !matches!(call.status, CallStatus::Hold | CallStatus::SaveToCall) {
            return Ok(false);
        }

        let base = plan.base();
        match prev {
            None => {
                call.planned_date = self.initial_planned_date(plan, call)?;
                call.last_planned_date = None;
            }
            Some(prev) => {
                call.planned_date = self.planned_date_after(plan, call.cycle, prev)?;
                call.last_planned_date = Some(prev.planned_date);
            }
        }

        let (call_date, status) = call_date_and_status(base, ctx, call.planned_date, prev)?;
        call.call_date = call_date;
        call.status = status;

        tracing::debug!("CallFactory: 重算调用 {}", call);
        Ok(true)
    }

    /// 无上一调用时的计划日期 (以调用自身的开始日期为基准)
    fn initial_planned_date(&self, plan: &SchedulingPlan, call: &Call) -> EngineResult<NaiveDate> {
        let date = match plan {
            SchedulingPlan::SingleCycle(p) if p.offset != 0.0 => {
                add_days(call.start_date, whole_days(p.offset_in_days()))?
            }
            SchedulingPlan::SingleCycle(p) => p.next_plan_date(call.start_date)?,
            SchedulingPlan::Strategy(sp) => {
                sp.next_plan_date(call.start_date, sp.start_offset, call.previous_offset())?
            }
        };
        Ok(date)
    }

    /// 上一调用之后的计划日期
    ///
    /// 基准日期: 有完工要求且完工超出容差时取上一调用完工日期, 否则取其计划日期
    fn planned_date_after(
        &self,
        plan: &SchedulingPlan,
        cycle: CallCycle,
        prev: &Call,
    ) -> EngineResult<NaiveDate> {
        let base = plan.base();
        let base_date = match prev.completion_date {
            Some(completion) if base.completion_requirement && tolerance_exceeded(base, Some(prev)) => {
                completion
            }
            _ => prev.planned_date,
        };

        let next = match (plan, cycle) {
            (SchedulingPlan::Strategy(sp), CallCycle::Strategy { previous_offset, .. }) => {
                sp.next_plan_date(base_date, sp.start_offset, previous_offset)?
            }
            (SchedulingPlan::Strategy(sp), CallCycle::SingleCycle) => {
                sp.next_plan_date(base_date, sp.start_offset, prev.current_offset())?
            }
            (SchedulingPlan::SingleCycle(p), _) => p.next_plan_date(base_date)?,
        };

        Ok(add_days(next, shifting_days(base, Some(prev)))?)
    }
}

impl Default for CallFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::tests::{monthly_plan, ymd};
    use crate::domain::plan::StrategyPlan;
    use crate::domain::strategy::tests::three_package_strategy;
    use crate::domain::types::SchedulingIndicator;

    fn ctx(today: NaiveDate) -> SchedulingContext {
        SchedulingContext::new(today, 0).unwrap()
    }

    fn completed_call(planned: NaiveDate, completion: NaiveDate) -> Call {
        Call {
            call_num: 1,
            planned_date: planned,
            call_date: planned,
            completion_date: Some(completion),
            start_date: ymd(2023, 6, 1),
            last_planned_date: None,
            prev_call_num: 0,
            scheduling_type: SchedulingType::NewStart,
            status: CallStatus::Completed,
            due_package: String::new(),
            cycle: CallCycle::SingleCycle,
        }
    }

    #[test]
    fn test_tolerance_boundary() {
        // 周期 30 天, 延迟容差 10% → 3 天
        let plan = monthly_plan();
        let planned = ymd(2023, 7, 1);

        let on_boundary = completed_call(planned, ymd(2023, 7, 4));
        assert!(!tolerance_exceeded(&plan, Some(&on_boundary)));
        assert_eq!(shifting_days(&plan, Some(&on_boundary)), 0);

        let beyond = completed_call(planned, ymd(2023, 7, 5));
        assert!(tolerance_exceeded(&plan, Some(&beyond)));
        assert_eq!(shifting_days(&plan, Some(&beyond)), 4);
    }

    #[test]
    fn test_early_completion_shift_rounds_down() {
        let mut plan = monthly_plan();
        plan.sf_early = 50;
        // 提前 5 天: 5 × 50 / 100 = -2.5 → -3
        let early = completed_call(ymd(2023, 7, 10), ymd(2023, 7, 5));
        assert!(tolerance_exceeded(&plan, Some(&early)));
        assert_eq!(shifting_days(&plan, Some(&early)), -3);
    }

    #[test]
    fn test_no_predecessor_never_exceeds() {
        let plan = monthly_plan();
        assert!(!tolerance_exceeded(&plan, None));
        assert_eq!(shifting_days(&plan, None), 0);
    }

    #[test]
    fn test_first_call_single_cycle() {
        let plan = SchedulingPlan::SingleCycle(monthly_plan());
        let call = CallFactory::new()
            .first_call(&plan, &ctx(ymd(2023, 6, 1)), 1)
            .unwrap();

        assert_eq!(call.call_num, 1);
        assert_eq!(call.prev_call_num, 0);
        assert_eq!(call.scheduling_type, SchedulingType::NewStart);
        assert_eq!(call.planned_date, ymd(2023, 7, 1));
        // 剩余 30 天, 期限未到 → Hold, 调用日期 = 07-01 - 30 + 15
        assert_eq!(call.status, CallStatus::Hold);
        assert_eq!(call.call_date, ymd(2023, 6, 16));
    }

    #[test]
    fn test_horizon_expired_releases_call() {
        let plan = SchedulingPlan::SingleCycle(monthly_plan());
        let today = ymd(2023, 6, 20);
        let call = CallFactory::new().first_call(&plan, &ctx(today), 1).unwrap();
        assert_eq!(call.status, CallStatus::SaveToCall);
        assert_eq!(call.call_date, today);
    }

    #[test]
    fn test_completion_requirement_holds_call() {
        let mut base = monthly_plan();
        base.completion_requirement = true;
        let plan = SchedulingPlan::SingleCycle(base);
        let factory = CallFactory::new();
        let today = ymd(2023, 7, 20);

        let mut prev = factory.first_call(&plan, &ctx(today), 1).unwrap();
        prev.status = CallStatus::Called;
        let next = factory.next_call(&plan, &ctx(today), &prev).unwrap();
        assert_eq!(next.planned_date, ymd(2023, 7, 31));
        assert_eq!(next.status, CallStatus::Hold);

        prev.complete(ymd(2023, 7, 2));
        let next = factory.next_call(&plan, &ctx(today), &prev).unwrap();
        assert_eq!(next.status, CallStatus::SaveToCall);
    }

    #[test]
    fn test_next_call_links_predecessor() {
        let plan = SchedulingPlan::SingleCycle(monthly_plan());
        let factory = CallFactory::new();
        let c = ctx(ymd(2023, 6, 1));
        let first = factory.first_call(&plan, &c, 1).unwrap();
        let second = factory.next_call(&plan, &c, &first).unwrap();

        assert_eq!(second.call_num, 2);
        assert_eq!(second.prev_call_num, 1);
        assert_eq!(second.scheduling_type, SchedulingType::Scheduled);
        assert_eq!(second.last_planned_date, Some(ymd(2023, 7, 1)));
        assert_eq!(second.planned_date, ymd(2023, 7, 31));
    }

    #[test]
    fn test_update_uses_completion_date_when_required() {
        let mut base = monthly_plan();
        base.completion_requirement = true;
        let plan = SchedulingPlan::SingleCycle(base);
        let factory = CallFactory::new();
        let c = ctx(ymd(2023, 6, 1));

        let mut prev = factory.first_call(&plan, &c, 1).unwrap();
        let mut next = factory.next_call(&plan, &c, &prev).unwrap();

        // 延迟 10 天完工, 超出 3 天容差: 基准 = 07-11, 平移 10 天
        prev.complete(ymd(2023, 7, 11));
        assert!(factory.update(&plan, &c, &mut next, Some(&prev)).unwrap());
        assert_eq!(next.planned_date, ymd(2023, 8, 20));
        assert_eq!(next.last_planned_date, Some(ymd(2023, 7, 1)));
    }

    #[test]
    fn test_update_skips_manual_and_final_calls() {
        let plan = SchedulingPlan::SingleCycle(monthly_plan());
        let factory = CallFactory::new();
        let c = ctx(ymd(2023, 6, 1));

        let mut call = factory.first_call(&plan, &c, 1).unwrap();
        call.status = CallStatus::Called;
        let before = call.clone();
        assert!(!factory.update(&plan, &c, &mut call, None).unwrap());
        assert_eq!(call, before);

        call.status = CallStatus::SaveToCall;
        call.scheduling_type = SchedulingType::Manual;
        assert!(!factory.update(&plan, &c, &mut call, None).unwrap());
    }

    #[test]
    fn test_strategy_calls_track_offsets() {
        let mut base = monthly_plan();
        base.scheduling_indicator = SchedulingIndicator::KeyDate;
        let plan = SchedulingPlan::Strategy(StrategyPlan::new(base, three_package_strategy()));
        let factory = CallFactory::new();
        let c = ctx(ymd(2023, 6, 1));

        let first = factory.first_call(&plan, &c, 1).unwrap();
        assert_eq!(first.scheduling_type, SchedulingType::NewStart);
        assert_eq!(first.previous_offset(), 0);
        assert_eq!(first.current_offset(), 60);
        assert_eq!(first.planned_date, ymd(2023, 8, 1));
        assert_eq!(first.due_package, "2M");

        let second = factory.next_call(&plan, &c, &first).unwrap();
        assert_eq!(second.previous_offset(), 60);
        assert_eq!(second.current_offset(), 90);
        assert_eq!(second.planned_date, ymd(2023, 9, 1));
        assert_eq!(second.due_package, "3M");
    }

    #[test]
    fn test_strategy_cycle_start_type() {
        let mut base = monthly_plan();
        base.scheduling_indicator = SchedulingIndicator::KeyDate;
        let mut sp = StrategyPlan::new(base, three_package_strategy());
        sp.start_offset = 60;
        let plan = SchedulingPlan::Strategy(sp);

        let first = CallFactory::new()
            .first_call(&plan, &ctx(ymd(2023, 6, 1)), 1)
            .unwrap();
        assert_eq!(first.scheduling_type, SchedulingType::CycleStart);
        assert_eq!(first.previous_offset(), 60);
        assert_eq!(first.current_offset(), 90);
        assert_eq!(first.planned_date, ymd(2023, 7, 1));
    }
}
