// ==========================================
// 设备维护计划排程系统 - 调度器
// ==========================================
// 职责: 维护单个计划的调用链
// - 开始/重新开始/取消排程
// - 刷新与更新排程 (延伸到排程截止日)
// - 手工调用与调用操作 (下达/完工/跳过/固定)
// - 调用链的加载与保存
// 说明: 上一调用按"上一调用号"查找, 同号时取第一个
// ==========================================

use crate::domain::call::{Call, CallCycle, CallRow, MANUAL_CALL_NUM_START};
use crate::domain::context::SchedulingContext;
use crate::domain::plan::{MaintenancePlan, SchedulingPlan, StrategyPlan};
use crate::domain::types::{CallStatus, SchedulingType};
use crate::engine::call_factory::CallFactory;
use crate::engine::error::{CallAction, EngineError, EngineResult, Rejection};
use crate::engine::events::{CallObjectCreator, CallObjectRequest};
use crate::repository::schedule_store::ScheduleStore;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// 无后继调用时固定日期的上界
fn fix_upper_bound() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX)
}

// ==========================================
// Scheduler - 调度器
// ==========================================
pub struct Scheduler {
    plan: SchedulingPlan,
    ctx: SchedulingContext,
    factory: CallFactory,
    calls: Vec<Call>,
}

impl Scheduler {
    /// 创建调度器 (空调用链)
    ///
    /// # 错误
    /// - 计划参数校验失败
    pub fn new(plan: SchedulingPlan, ctx: SchedulingContext) -> EngineResult<Self> {
        plan.base().validate()?;
        Ok(Self {
            plan,
            ctx,
            factory: CallFactory::new(),
            calls: Vec::new(),
        })
    }

    /// 单周期计划调度器
    pub fn single_cycle(plan: MaintenancePlan, ctx: SchedulingContext) -> EngineResult<Self> {
        Self::new(SchedulingPlan::SingleCycle(plan), ctx)
    }

    /// 策略计划调度器
    pub fn strategy(plan: StrategyPlan, ctx: SchedulingContext) -> EngineResult<Self> {
        Self::new(SchedulingPlan::Strategy(plan), ctx)
    }

    /// 从存储加载调度器
    pub fn load(
        plan: SchedulingPlan,
        ctx: SchedulingContext,
        store: &dyn ScheduleStore,
    ) -> EngineResult<Self> {
        let mut scheduler = Self::new(plan, ctx)?;
        let rows = store.load_rows(scheduler.plan.plan_num())?;
        scheduler.load_rows(&rows)?;
        Ok(scheduler)
    }

    // ==========================================
    // 访问器
    // ==========================================

    pub fn plan(&self) -> &SchedulingPlan {
        &self.plan
    }

    /// 可变计划参数 (修改后需 refresh_calls / update_scheduling 生效)
    pub fn plan_mut(&mut self) -> &mut SchedulingPlan {
        &mut self.plan
    }

    pub fn context(&self) -> &SchedulingContext {
        &self.ctx
    }

    /// 调用链 (插入顺序)
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// 按调用号查找 (同号取第一个)
    pub fn call(&self, call_num: u64) -> Option<&Call> {
        self.calls.iter().find(|c| c.call_num == call_num)
    }

    /// 调用的上一调用
    pub fn predecessor(&self, call_num: u64) -> Option<&Call> {
        let index = self.position(call_num)?;
        self.predecessor_position(index).map(|j| &self.calls[j])
    }

    /// 调用的后继调用 (以该调用为上一调用的第一个非手工调用)
    pub fn next_call_after(&self, call_num: u64) -> Option<&Call> {
        self.calls
            .iter()
            .find(|c| !c.is_manual() && c.prev_call_num == call_num)
    }

    /// 最后一个排程调用 (非手工调用中调用号最大者)
    pub fn last_scheduled_call(&self) -> Option<&Call> {
        self.calls
            .iter()
            .filter(|c| !c.is_manual())
            .max_by_key(|c| c.call_num)
    }

    /// 下一个手工调用号
    pub fn next_manual_call_num(&self) -> u64 {
        self.calls
            .iter()
            .filter(|c| c.is_manual())
            .map(|c| c.call_num)
            .max()
            .map_or(MANUAL_CALL_NUM_START, |max| max + 1)
    }

    /// 调用链存储行
    pub fn call_rows(&self) -> Vec<CallRow> {
        self.calls.iter().map(Call::to_row).collect()
    }

    // ==========================================
    // 加载 / 保存
    // ==========================================

    /// 以存储行替换调用链
    ///
    /// 策略计划按上一调用链接从起始偏移重建周期偏移
    pub fn load_rows(&mut self, rows: &[CallRow]) -> EngineResult<()> {
        let calls = rows
            .iter()
            .map(|row| self.factory.restore(&self.plan, row))
            .collect::<EngineResult<Vec<_>>>()?;
        self.calls = calls;
        self.rebuild_cycle_offsets()?;

        debug!(
            "Scheduler: 计划 {} 加载 {} 条调用",
            self.plan.plan_num(),
            self.calls.len()
        );
        Ok(())
    }

    /// 保存调用链
    ///
    /// 每个"待保存调用"生成一个调用对象并置为"已调用", 然后整体写入存储。
    ///
    /// # 返回
    /// - 生成的调用对象数量
    pub fn save(
        &mut self,
        store: &mut dyn ScheduleStore,
        creator: &dyn CallObjectCreator,
    ) -> EngineResult<usize> {
        let plan_num = self.plan.plan_num().to_string();
        let mut created = 0;

        for call in self
            .calls
            .iter_mut()
            .filter(|c| c.status == CallStatus::SaveToCall)
        {
            let object_id = creator
                .create_call_object(CallObjectRequest::from_call(&plan_num, call))
                .map_err(|e| EngineError::CallObjectCreation {
                    plan_num: plan_num.clone(),
                    call_num: call.call_num,
                    message: e.to_string(),
                })?;
            call.status = CallStatus::Called;
            created += 1;
            debug!(
                "Scheduler: 调用 {} 已生成调用对象 {:?}",
                call.call_num, object_id
            );
        }

        store.save_rows(&plan_num, &self.call_rows())?;
        info!(
            "Scheduler: 计划 {} 保存 {} 条调用, 生成 {} 个调用对象",
            plan_num,
            self.calls.len(),
            created
        );
        Ok(created)
    }

    // ==========================================
    // 排程
    // ==========================================

    /// 开始排程
    ///
    /// 计划开始日期置为 start_date, 清空调用链, 生成首个调用,
    /// 然后推导后继调用直到排程截止日。
    pub fn start_scheduling(&mut self, start_date: NaiveDate) -> EngineResult<()> {
        self.plan.base_mut().start_date = start_date;
        self.calls.clear();
        let added = self.start_chain(1)?;

        info!(
            "Scheduler: 计划 {} 从 {} 开始排程, 生成 {} 条调用",
            self.plan.plan_num(),
            start_date,
            added
        );
        Ok(())
    }

    /// 周期内开始 (仅策略计划)
    ///
    /// 起始偏移不写入调用存储行; 重新加载时周期偏移按计划的 start_offset 重建,
    /// 因此计划参数中须保存同一起始偏移 (见 PlanParams::start_offset)。
    pub fn start_in_cycle(&mut self, start_date: NaiveDate, start_offset: u32) -> EngineResult<()> {
        let plan_num = self.plan.plan_num().to_string();
        let strategy_plan = self
            .plan
            .as_strategy_mut()
            .ok_or(EngineError::NotAStrategyPlan { plan_num })?;
        strategy_plan.start_offset = start_offset;
        self.start_scheduling(start_date)
    }

    /// 重新开始排程
    ///
    /// 保留已有调用 (delete_waiting 时删除等待中的调用), 从 start_date
    /// 开始新的调用链, 调用号接在最后一个排程调用之后。
    pub fn restart_scheduling(
        &mut self,
        start_date: NaiveDate,
        delete_waiting: bool,
    ) -> EngineResult<()> {
        let call_num = self.last_scheduled_call().map_or(1, |c| c.call_num + 1);
        if delete_waiting {
            self.calls.retain(|c| c.status != CallStatus::Hold);
        }

        self.plan.base_mut().start_date = start_date;
        let added = self.start_chain(call_num)?;

        info!(
            "Scheduler: 计划 {} 从 {} 重新开始排程 (首个调用号 {}), 生成 {} 条调用",
            self.plan.plan_num(),
            start_date,
            call_num,
            added
        );
        Ok(())
    }

    /// 取消排程: 删除所有等待中的调用
    ///
    /// # 返回
    /// - 删除的调用数量
    pub fn cancel_scheduling(&mut self) -> usize {
        let before = self.calls.len();
        self.calls.retain(|c| c.status != CallStatus::Hold);
        let removed = before - self.calls.len();

        info!(
            "Scheduler: 计划 {} 取消排程, 删除 {} 条等待调用",
            self.plan.plan_num(),
            removed
        );
        removed
    }

    /// 刷新调用链
    ///
    /// 重算所有调用, 删除超出排程截止日的等待调用; 不新增调用。
    pub fn refresh_calls(&mut self) -> EngineResult<()> {
        let end_date = self.plan.base().scheduling_end_date(&self.ctx)?;
        let index = self.call_index();

        for i in 0..self.calls.len() {
            let prev = self
                .predecessor_position_in(&index, i)
                .map(|j| self.calls[j].clone());
            self.factory
                .update(&self.plan, &self.ctx, &mut self.calls[i], prev.as_ref())?;
        }

        let (kept, dropped): (Vec<Call>, Vec<Call>) = std::mem::take(&mut self.calls)
            .into_iter()
            .partition(|c| c.planned_date <= end_date || c.status != CallStatus::Hold);
        self.calls = kept;

        debug!(
            "Scheduler: 计划 {} 刷新完成, 截止日 {}, 删除 {} 条调用",
            self.plan.plan_num(),
            end_date,
            dropped.len()
        );
        Ok(())
    }

    /// 更新排程
    ///
    /// 刷新调用链后:
    /// - 排程期间 > 0 且最后排程调用未到截止日: 延伸到截止日
    /// - 否则最后排程调用不是等待/固定状态时, 追加一个后继调用
    ///
    /// # 错误
    /// - MissingLastScheduledCall: 调用链中没有非手工调用
    pub fn update_scheduling(&mut self) -> EngineResult<()> {
        self.refresh_calls()?;

        let end_date = self.plan.base().scheduling_end_date(&self.ctx)?;
        let last = self
            .last_scheduled_call()
            .cloned()
            .ok_or_else(|| EngineError::MissingLastScheduledCall {
                plan_num: self.plan.plan_num().to_string(),
            })?;

        if self.plan.base().schedule_period > 0.0 && last.planned_date < end_date {
            let added = self.create_following_calls(last, end_date)?;
            info!(
                "Scheduler: 计划 {} 延伸 {} 条调用至 {}",
                self.plan.plan_num(),
                added,
                end_date
            );
        } else if !last.on_hold_or_fixed() {
            let next = self.factory.next_call(&self.plan, &self.ctx, &last)?;
            info!(
                "Scheduler: 计划 {} 追加调用 {} ({})",
                self.plan.plan_num(),
                next.call_num,
                next.planned_date
            );
            self.calls.push(next);
        }

        Ok(())
    }

    /// 从 from 开始推导后继调用, 直到超出截止日
    ///
    /// 第一个超出截止日的调用被丢弃; 计划日期不再前进时停止
    fn create_following_calls(&mut self, from: Call, end_date: NaiveDate) -> EngineResult<usize> {
        let mut prev = from;
        let mut added = 0;

        while prev.planned_date < end_date {
            let next = self.factory.next_call(&self.plan, &self.ctx, &prev)?;
            if next.planned_date > end_date {
                break;
            }
            if next.planned_date <= prev.planned_date {
                warn!(
                    "Scheduler: 计划 {} 的计划日期未前进 ({} → {}), 停止推导",
                    self.plan.plan_num(),
                    prev.planned_date,
                    next.planned_date
                );
                break;
            }
            self.calls.push(next.clone());
            prev = next;
            added += 1;
        }

        Ok(added)
    }

    /// 生成首个调用并延伸到截止日, 返回新增调用数
    fn start_chain(&mut self, call_num: u64) -> EngineResult<usize> {
        let first = self.factory.first_call(&self.plan, &self.ctx, call_num)?;
        self.calls.push(first.clone());

        let end_date = self.plan.base().scheduling_end_date(&self.ctx)?;
        let added = self.create_following_calls(first, end_date)?;
        Ok(added + 1)
    }

    // ==========================================
    // 手工调用与调用操作
    // ==========================================

    /// 手工调用
    ///
    /// 以指定调用为模板生成手工调用: 计划日期 = 调用日期 = date,
    /// 状态为待保存调用, 继承上一调用号、开始日期与到期维护包文本。
    ///
    /// # 返回
    /// - 新手工调用号
    pub fn manual_call(&mut self, call_num: u64, date: NaiveDate) -> EngineResult<u64> {
        let index = self.require_position(call_num)?;
        let source = &self.calls[index];

        let manual = Call {
            call_num: self.next_manual_call_num(),
            planned_date: date,
            call_date: date,
            completion_date: None,
            start_date: source.start_date,
            last_planned_date: None,
            prev_call_num: source.prev_call_num,
            scheduling_type: SchedulingType::Manual,
            status: CallStatus::SaveToCall,
            due_package: source.due_package.clone(),
            cycle: source.cycle,
        };
        let manual_num = manual.call_num;

        info!(
            "Scheduler: 计划 {} 由调用 {} 生成手工调用 {} ({})",
            self.plan.plan_num(),
            call_num,
            manual_num,
            date
        );
        self.calls.push(manual);
        Ok(manual_num)
    }

    /// 下达调用
    pub fn release_call(&mut self, call_num: u64) -> EngineResult<()> {
        let index = self.require_position(call_num)?;
        self.check_predecessor(index, CallAction::Release)?;

        let today = self.ctx.today();
        self.calls[index].release(today);
        info!("Scheduler: 调用 {} 已下达", call_num);
        Ok(())
    }

    /// 完工调用, 然后更新排程
    pub fn complete_call(&mut self, call_num: u64, completion_date: NaiveDate) -> EngineResult<()> {
        let index = self.require_position(call_num)?;
        let status = self.calls[index].status;
        if status != CallStatus::Called {
            return Err(self.reject(Rejection::NotCalled { call_num, status }));
        }
        self.check_predecessor(index, CallAction::Complete)?;

        self.calls[index].complete(completion_date);
        info!("Scheduler: 调用 {} 于 {} 完工", call_num, completion_date);
        self.update_scheduling()
    }

    /// 跳过调用
    pub fn skip_call(&mut self, call_num: u64) -> EngineResult<()> {
        let index = self.require_position(call_num)?;
        self.check_predecessor(index, CallAction::Skip)?;

        self.calls[index].skip();
        info!("Scheduler: 调用 {} 已跳过", call_num);
        Ok(())
    }

    /// 固定调用的计划日期
    ///
    /// 日期必须严格位于 (上一调用计划日期, 后继调用计划日期) 之间;
    /// 无上一调用时只校验上界, 无后继调用时上界为 2099-12-31。
    pub fn fix_call(&mut self, call_num: u64, fix_date: NaiveDate) -> EngineResult<()> {
        let index = self.require_position(call_num)?;
        self.check_predecessor(index, CallAction::Fix)?;

        let lower = self
            .predecessor_position(index)
            .map(|j| self.calls[j].planned_date);
        let upper = self
            .next_call_after(call_num)
            .map_or_else(fix_upper_bound, |c| c.planned_date);

        let above_lower = lower.map_or(true, |lower| fix_date > lower);
        if !(above_lower && fix_date < upper) {
            return Err(self.reject(Rejection::FixDateOutOfRange {
                call_num,
                date: fix_date,
                lower,
                upper,
            }));
        }

        self.calls[index].fix(fix_date);
        info!("Scheduler: 调用 {} 固定于 {}", call_num, fix_date);
        Ok(())
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 调用号 → 位置 (同号取第一个)
    fn call_index(&self) -> HashMap<u64, usize> {
        let mut index = HashMap::with_capacity(self.calls.len());
        for (i, call) in self.calls.iter().enumerate() {
            index.entry(call.call_num).or_insert(i);
        }
        index
    }

    fn position(&self, call_num: u64) -> Option<usize> {
        self.calls.iter().position(|c| c.call_num == call_num)
    }

    fn require_position(&self, call_num: u64) -> EngineResult<usize> {
        self.position(call_num)
            .ok_or_else(|| self.reject(Rejection::CallNotFound { call_num }))
    }

    fn predecessor_position(&self, index: usize) -> Option<usize> {
        let prev_num = self.calls[index].prev_call_num;
        if prev_num == 0 {
            return None;
        }
        self.position(prev_num).filter(|&j| j != index)
    }

    fn predecessor_position_in(&self, index: &HashMap<u64, usize>, i: usize) -> Option<usize> {
        let prev_num = self.calls[i].prev_call_num;
        if prev_num == 0 {
            return None;
        }
        index.get(&prev_num).copied().filter(|&j| j != i)
    }

    /// 上一调用处于等待或固定状态时拒绝操作
    fn check_predecessor(&self, index: usize, action: CallAction) -> EngineResult<()> {
        if let Some(j) = self.predecessor_position(index) {
            let predecessor = &self.calls[j];
            if predecessor.on_hold_or_fixed() {
                return Err(self.reject(Rejection::PredecessorBlocked {
                    action,
                    call_num: self.calls[index].call_num,
                    predecessor: predecessor.call_num,
                    status: predecessor.status,
                }));
            }
        }
        Ok(())
    }

    fn reject(&self, reason: Rejection) -> EngineError {
        warn!("Scheduler: 计划 {} 操作被拒绝: {}", self.plan.plan_num(), reason);
        EngineError::Rejected(reason)
    }

    /// 沿上一调用链接重建策略调用的周期偏移
    fn rebuild_cycle_offsets(&mut self) -> EngineResult<()> {
        let Some(strategy_plan) = self.plan.as_strategy() else {
            return Ok(());
        };

        let index = self.call_index();
        let mut resolved: Vec<Option<(u32, u32)>> = vec![None; self.calls.len()];
        for i in 0..self.calls.len() {
            resolve_offsets(strategy_plan, &self.calls, &index, i, &mut resolved, 0)?;
        }

        for (call, offsets) in self.calls.iter_mut().zip(resolved) {
            if let Some((current_offset, previous_offset)) = offsets {
                call.cycle = CallCycle::Strategy {
                    current_offset,
                    previous_offset,
                };
            }
        }
        Ok(())
    }
}

/// 解析第 i 个调用的 (当前偏移, 上一偏移)
///
/// 无上一调用时上一偏移取计划的起始偏移; 链接成环时在深度达到调用数后截断
fn resolve_offsets(
    plan: &StrategyPlan,
    calls: &[Call],
    index: &HashMap<u64, usize>,
    i: usize,
    resolved: &mut [Option<(u32, u32)>],
    depth: usize,
) -> EngineResult<(u32, u32)> {
    if let Some(offsets) = resolved[i] {
        return Ok(offsets);
    }

    let prev_num = calls[i].prev_call_num;
    let predecessor = if prev_num == 0 {
        None
    } else {
        index.get(&prev_num).copied().filter(|&j| j != i)
    };

    let previous_offset = match predecessor {
        Some(j) if depth < calls.len() => {
            resolve_offsets(plan, calls, index, j, resolved, depth + 1)?.0
        }
        _ => plan.start_offset,
    };
    let current_offset = plan.strategy().next_offset(plan.start_offset, previous_offset)?;

    resolved[i] = Some((current_offset, previous_offset));
    Ok((current_offset, previous_offset))
}
