// ==========================================
// 排程期间为 0 与工厂日历排程测试
// ==========================================
// 排程期间为 0 时, 任意次数的更新排程后调用链尾部
// 至多保留一个等待调用; 等待调用超出截止日即被删除
// ==========================================

mod helpers;

use helpers::plan_builder::*;
use maint_call_scheduler::config::plan_config::PlanParams;
use maint_call_scheduler::config::scheduler_config::SchedulerConfig;
use maint_call_scheduler::domain::{CallStatus, PeriodUnit, SchedulingIndicator};
use maint_call_scheduler::engine::{EngineError, NoOpCallObjectCreator, Scheduler};
use maint_call_scheduler::repository::JsonScheduleStore;
use tempfile::TempDir;

fn hold_count(scheduler: &Scheduler) -> usize {
    scheduler
        .calls()
        .iter()
        .filter(|c| c.status == CallStatus::Hold)
        .count()
}

fn call_nums(scheduler: &Scheduler) -> Vec<u64> {
    scheduler.calls().iter().map(|c| c.call_num).collect()
}

fn zero_period_plan(plan_num: &str) -> maint_call_scheduler::MaintenancePlan {
    PlanBuilder::monthly(plan_num)
        .schedule_period(0.0, PeriodUnit::Day)
        .build()
}

#[test]
fn test_排程期间为0_跨会话至多一个尾部等待调用() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonScheduleStore::new(dir.path().join("MHIS.json"));

    // 会话 1: 06-20 开始排程, 首个调用期限已到直接待保存
    let mut session1 = Scheduler::single_cycle(zero_period_plan("3000001"), ctx(ymd(2023, 6, 20))).unwrap();
    session1.start_scheduling(ymd(2023, 6, 1)).unwrap();
    assert_eq!(session1.calls()[0].status, CallStatus::SaveToCall);

    for _ in 0..3 {
        session1.update_scheduling().unwrap();
        assert_eq!(call_nums(&session1), vec![1, 2]);
        assert_eq!(hold_count(&session1), 1);
    }

    session1.save(&mut store, &NoOpCallObjectCreator).unwrap();
    assert_eq!(session1.call(1).unwrap().status, CallStatus::Called);

    // 会话 2: 按期完工, 调用 2 期限已到转为待保存, 其后追加一个等待调用
    let plan = session1.plan().clone();
    let mut session2 = Scheduler::load(plan, ctx(ymd(2023, 7, 20)), &store).unwrap();
    session2.complete_call(1, ymd(2023, 7, 1)).unwrap();

    let next = session2.call(2).unwrap();
    assert_eq!(next.planned_date, ymd(2023, 8, 1));
    assert_eq!(next.status, CallStatus::SaveToCall);
    assert_eq!(next.call_date, ymd(2023, 7, 20));
    assert_eq!(session2.call(3).unwrap().planned_date, ymd(2023, 9, 1));

    for _ in 0..3 {
        session2.update_scheduling().unwrap();
        assert_eq!(call_nums(&session2), vec![1, 2, 3]);
        assert_eq!(hold_count(&session2), 1);
    }
}

#[test]
fn test_排程期间为0_已调用链头反复更新() {
    let mut scheduler = Scheduler::single_cycle(zero_period_plan("3000002"), ctx(ymd(2023, 6, 3))).unwrap();
    scheduler.start_scheduling(ymd(2023, 6, 1)).unwrap();

    let dir = TempDir::new().unwrap();
    let mut store = JsonScheduleStore::new(dir.path().join("MHIS.json"));
    scheduler.release_call(1).unwrap();
    scheduler.save(&mut store, &NoOpCallObjectCreator).unwrap();

    for _ in 0..5 {
        scheduler.update_scheduling().unwrap();
        assert_eq!(hold_count(&scheduler), 1);
    }
    assert_eq!(call_nums(&scheduler), vec![1, 2]);
}

#[test]
fn test_排程期间为0_等待链头超出截止日后无排程调用() {
    let mut scheduler = Scheduler::single_cycle(zero_period_plan("3000005"), ctx(ymd(2023, 6, 3))).unwrap();
    scheduler.start_scheduling(ymd(2023, 6, 1)).unwrap();
    let manual = scheduler.manual_call(1, ymd(2023, 6, 10)).unwrap();

    let err = scheduler.update_scheduling().unwrap_err();
    assert!(matches!(err, EngineError::MissingLastScheduledCall { .. }));
    assert_eq!(call_nums(&scheduler), vec![manual]);
}

// ==========================================
// 工厂日历排程
// ==========================================

#[test]
fn test_工厂日历_节假日顺延() {
    let plan = PlanBuilder::monthly("3000003")
        .indicator(SchedulingIndicator::FactoryCalendar)
        .holidays(&["20230615", "20230620"])
        .build();
    let mut scheduler = Scheduler::single_cycle(plan, ctx(ymd(2023, 6, 3))).unwrap();
    scheduler.start_scheduling(ymd(2023, 6, 1)).unwrap();

    let planned: Vec<_> = scheduler.calls().iter().map(|c| c.planned_date).collect();
    assert_eq!(planned, vec![ymd(2023, 7, 4), ymd(2023, 8, 4)]);
}

#[test]
fn test_工厂日历_由配置绑定节假日() {
    let config = SchedulerConfig::from_json_str(r#"{"holidays": ["20230615", "20230620"]}"#).unwrap();
    let params: PlanParams = serde_json::from_str(
        r#"{
            "plan_num": "3000004",
            "cycle": 1, "cycle_unit": "MON",
            "call_horizon": 50,
            "schedule_period": 90, "sp_unit": "D",
            "start_date": "20230601",
            "scheduling_indicator": 2,
            "factory_calendar": "00"
        }"#,
    )
    .unwrap();

    let plan = params.to_plan(&config).unwrap();
    let mut scheduler = Scheduler::single_cycle(plan, ctx(ymd(2023, 6, 3))).unwrap();
    scheduler.start_scheduling(ymd(2023, 6, 1)).unwrap();
    assert_eq!(scheduler.calls()[0].planned_date, ymd(2023, 7, 4));

    // 未知日历代码
    let mut unknown = params.clone();
    unknown.factory_calendar = "01".to_string();
    assert!(unknown.to_plan(&config).is_err());
}
