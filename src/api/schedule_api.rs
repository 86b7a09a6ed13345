// ==========================================
// 设备维护计划排程系统 - 排程 API
// ==========================================
// 职责: 会话上下文、按计划参数打开调度器、保存调用链
// 说明: 排程上下文每个会话只初始化一次, 同一会话的调度器共享参考日期
// ==========================================

use std::sync::{Arc, OnceLock};

use chrono::NaiveDate;

use crate::api::error::{ApiError, ApiResult};
use crate::config::plan_config::{PlanParams, StrategyConfig};
use crate::config::scheduler_config::SchedulerConfig;
use crate::domain::context::SchedulingContext;
use crate::domain::plan::SchedulingPlan;
use crate::engine::events::{CallObjectCreator, NoOpCallObjectCreator};
use crate::engine::scheduler::Scheduler;
use crate::repository::json_store::JsonScheduleStore;
use crate::repository::schedule_store::ScheduleStore;
use crate::repository::sqlite_store::SqliteScheduleStore;

// ==========================================
// ScheduleApi - 排程 API
// ==========================================
pub struct ScheduleApi {
    config: SchedulerConfig,
    store: Box<dyn ScheduleStore + Send>,
    creator: Arc<dyn CallObjectCreator>,
    context: OnceLock<SchedulingContext>,
}

impl ScheduleApi {
    pub fn new(
        config: SchedulerConfig,
        store: Box<dyn ScheduleStore + Send>,
        creator: Arc<dyn CallObjectCreator>,
    ) -> Self {
        Self {
            config,
            store,
            creator,
            context: OnceLock::new(),
        }
    }

    /// 使用 JSON 文件存储 (路径取自配置或默认路径), 不生成外部调用对象
    pub fn with_json_store(config: SchedulerConfig) -> Self {
        let store = JsonScheduleStore::new(config.resolve_store_path());
        Self::new(config, Box::new(store), Arc::new(NoOpCallObjectCreator))
    }

    /// 使用 SQLite 存储
    pub fn with_sqlite_store(
        config: SchedulerConfig,
        db_path: &str,
        creator: Arc<dyn CallObjectCreator>,
    ) -> ApiResult<Self> {
        let store = SqliteScheduleStore::new(db_path)?;
        Ok(Self::new(config, Box::new(store), creator))
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ==========================================
    // 会话上下文
    // ==========================================

    /// 初始化排程上下文
    ///
    /// # 错误
    /// - ContextAlreadyInitialized: 重复初始化
    pub fn init_context(&self, today: NaiveDate) -> ApiResult<SchedulingContext> {
        let ctx = SchedulingContext::new(today, self.config.call_object_interval_days)?;
        self.context
            .set(ctx)
            .map_err(|_| ApiError::ContextAlreadyInitialized)?;

        tracing::info!(
            "ScheduleApi: 排程上下文初始化 today={}, reference_date={}",
            ctx.today(),
            ctx.reference_date()
        );
        Ok(ctx)
    }

    /// 以本地当前日期初始化排程上下文
    pub fn init_context_for_today(&self) -> ApiResult<SchedulingContext> {
        self.init_context(chrono::Local::now().date_naive())
    }

    pub fn context(&self) -> ApiResult<SchedulingContext> {
        self.context
            .get()
            .copied()
            .ok_or(ApiError::ContextNotInitialized)
    }

    // ==========================================
    // 调度器
    // ==========================================

    /// 打开单周期计划调度器 (加载已存储的调用链)
    pub fn open_single_cycle(&self, params: &PlanParams) -> ApiResult<Scheduler> {
        let plan = params.to_plan(&self.config)?;
        self.open(SchedulingPlan::SingleCycle(plan))
    }

    /// 打开策略计划调度器 (加载已存储的调用链)
    pub fn open_strategy(
        &self,
        params: &PlanParams,
        strategy: &StrategyConfig,
    ) -> ApiResult<Scheduler> {
        let plan = strategy.to_strategy_plan(params, &self.config)?;
        self.open(SchedulingPlan::Strategy(plan))
    }

    fn open(&self, plan: SchedulingPlan) -> ApiResult<Scheduler> {
        let ctx = self.context()?;
        let scheduler = Scheduler::load(plan, ctx, &*self.store)?;
        tracing::info!(
            "ScheduleApi: 打开计划 {}, 已有 {} 条调用",
            scheduler.plan().plan_num(),
            scheduler.calls().len()
        );
        Ok(scheduler)
    }

    /// 保存调度器的调用链
    ///
    /// # 返回
    /// - 生成的调用对象数量
    pub fn save(&mut self, scheduler: &mut Scheduler) -> ApiResult<usize> {
        let created = scheduler.save(&mut *self.store, self.creator.as_ref())?;
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::plan_config::tests::{MONTHLY_PLAN_JSON, STRATEGY_JSON};
    use crate::engine::events::RecordingCallObjectCreator;
    use tempfile::TempDir;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn json_api(dir: &TempDir) -> ScheduleApi {
        let config = SchedulerConfig {
            store_path: Some(dir.path().join("MHIS.json")),
            ..Default::default()
        };
        ScheduleApi::with_json_store(config)
    }

    #[test]
    fn test_context_initialized_once() {
        let dir = TempDir::new().unwrap();
        let api = json_api(&dir);
        assert!(matches!(api.context(), Err(ApiError::ContextNotInitialized)));

        api.init_context(ymd(2023, 6, 3)).unwrap();
        assert!(matches!(
            api.init_context(ymd(2023, 6, 4)),
            Err(ApiError::ContextAlreadyInitialized)
        ));
        assert_eq!(api.context().unwrap().today(), ymd(2023, 6, 3));
    }

    #[test]
    fn test_open_requires_context() {
        let dir = TempDir::new().unwrap();
        let api = json_api(&dir);
        let params: PlanParams = serde_json::from_str(MONTHLY_PLAN_JSON).unwrap();
        assert!(matches!(
            api.open_single_cycle(&params),
            Err(ApiError::ContextNotInitialized)
        ));
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = TempDir::new().unwrap();
        let mut api = json_api(&dir);
        api.init_context(ymd(2023, 6, 3)).unwrap();
        let params: PlanParams = serde_json::from_str(MONTHLY_PLAN_JSON).unwrap();

        let mut scheduler = api.open_single_cycle(&params).unwrap();
        assert!(scheduler.calls().is_empty());
        scheduler.start_scheduling(ymd(2023, 6, 1)).unwrap();
        scheduler.release_call(1).unwrap();
        assert_eq!(api.save(&mut scheduler).unwrap(), 1);

        let reopened = api.open_single_cycle(&params).unwrap();
        assert_eq!(reopened.call_rows(), scheduler.call_rows());
    }

    #[test]
    fn test_strategy_scheduler_with_sqlite_store() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("schedule.db");
        let creator = Arc::new(RecordingCallObjectCreator::new());
        let mut api = ScheduleApi::with_sqlite_store(
            SchedulerConfig::default(),
            db_path.to_str().unwrap(),
            creator.clone(),
        )
        .unwrap();
        api.init_context(ymd(2023, 6, 3)).unwrap();

        let params: PlanParams = serde_json::from_str(MONTHLY_PLAN_JSON).unwrap();
        let strategy: StrategyConfig = serde_json::from_str(STRATEGY_JSON).unwrap();
        let mut scheduler = api.open_strategy(&params, &strategy).unwrap();
        scheduler.start_scheduling(ymd(2023, 6, 1)).unwrap();

        let first = scheduler.calls()[0].clone();
        assert_eq!(first.due_package, "2M");
        scheduler.release_call(first.call_num).unwrap();
        api.save(&mut scheduler).unwrap();
        assert_eq!(creator.requests().len(), 1);

        let reopened = api.open_strategy(&params, &strategy).unwrap();
        assert_eq!(reopened.calls(), scheduler.calls());
    }

    #[test]
    fn test_strategy_start_offset_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let mut api = json_api(&dir);
        api.init_context(ymd(2023, 6, 3)).unwrap();

        let mut params: PlanParams = serde_json::from_str(MONTHLY_PLAN_JSON).unwrap();
        params.start_offset = 120;
        let strategy: StrategyConfig = serde_json::from_str(STRATEGY_JSON).unwrap();

        let mut scheduler = api.open_strategy(&params, &strategy).unwrap();
        scheduler.start_in_cycle(ymd(2023, 6, 1), 120).unwrap();
        api.save(&mut scheduler).unwrap();
        let offsets: Vec<u32> = scheduler.calls().iter().map(|c| c.current_offset()).collect();
        assert_eq!(offsets, vec![150, 180]);

        let reopened = api.open_strategy(&params, &strategy).unwrap();
        assert_eq!(reopened.calls(), scheduler.calls());

        // 计划参数缺少起始偏移时按 0 重建
        params.start_offset = 0;
        let drifted = api.open_strategy(&params, &strategy).unwrap();
        assert_eq!(drifted.calls()[0].current_offset(), 60);
    }
}
