// ==========================================
// 设备维护计划排程系统 - 计划与策略参数
// ==========================================
// 职责: 计划参数记录、策略抬头行、维护包行的反序列化与领域转换
// 说明:
// - 计划参数为 JSON 对象 (键名与外部参数表一致, 如 SF_late)
// - 策略抬头与维护包为定长 JSON 数组
// ==========================================

use crate::config::error::ConfigResult;
use crate::config::scheduler_config::SchedulerConfig;
use crate::domain::calendar::parse_yyyymmdd;
use crate::domain::plan::{MaintenancePlan, StrategyPlan};
use crate::domain::strategy::{MaintenancePackage, MaintenanceStrategy, StrategyHeader};
use crate::domain::types::{PeriodUnit, SchedulingIndicator};
use serde::{Deserialize, Serialize};

fn default_cycle_change_factor() -> f64 {
    1.0
}

// ==========================================
// PlanParams - 计划参数记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanParams {
    pub plan_num: String,
    pub cycle: f64,
    pub cycle_unit: PeriodUnit,
    #[serde(default)]
    pub offset: f64,
    #[serde(rename = "SF_late", default)]
    pub sf_late: i64,
    #[serde(rename = "SF_late_tolerance", default)]
    pub sf_late_tolerance: i64,
    #[serde(rename = "SF_early", default)]
    pub sf_early: i64,
    #[serde(rename = "SF_early_tolerance", default)]
    pub sf_early_tolerance: i64,
    #[serde(default = "default_cycle_change_factor")]
    pub cycle_change_factor: f64,
    #[serde(default)]
    pub call_horizon: u32,
    #[serde(default)]
    pub schedule_period: f64,
    pub sp_unit: PeriodUnit,
    #[serde(default)]
    pub completion_requirement: bool,
    /// YYYYMMDD
    pub start_date: String,
    pub scheduling_indicator: SchedulingIndicator,
    /// 工厂日历代码, "00" 绑定配置的节假日
    #[serde(default)]
    pub factory_calendar: String,
    /// 策略计划的周期内起始偏移 (天); 单周期计划忽略
    #[serde(default)]
    pub start_offset: u32,
}

impl PlanParams {
    /// 转换为维护计划并校验
    pub fn to_plan(&self, config: &SchedulerConfig) -> ConfigResult<MaintenancePlan> {
        let plan = MaintenancePlan {
            plan_num: self.plan_num.clone(),
            cycle: self.cycle,
            cycle_unit: self.cycle_unit,
            offset: self.offset,
            sf_late: self.sf_late,
            late_tolerance: self.sf_late_tolerance,
            sf_early: self.sf_early,
            early_tolerance: self.sf_early_tolerance,
            cycle_change_factor: self.cycle_change_factor,
            call_horizon: self.call_horizon,
            schedule_period: self.schedule_period,
            sp_unit: self.sp_unit,
            completion_requirement: self.completion_requirement,
            start_date: parse_yyyymmdd(&self.start_date)?,
            scheduling_indicator: self.scheduling_indicator,
            factory_calendar: config.factory_calendar(&self.factory_calendar)?,
        };
        plan.validate()?;
        Ok(plan)
    }
}

// ==========================================
// StrategyHead - 策略抬头行
// ==========================================
// [名称, 描述, 排程标识, 单位, 调用期限, 延迟平移系数, 延迟容差,
//  提前平移系数, 提前容差, 工厂日历代码]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StrategyHeadFields", into = "StrategyHeadFields")]
pub struct StrategyHead {
    pub name: String,
    pub description: String,
    pub scheduling_indicator: SchedulingIndicator,
    pub unit: PeriodUnit,
    pub call_horizon: u32,
    pub sf_late: i64,
    pub late_tolerance: i64,
    pub sf_early: i64,
    pub early_tolerance: i64,
    pub factory_calendar: String,
}

type StrategyHeadFields = (
    String,
    String,
    SchedulingIndicator,
    PeriodUnit,
    u32,
    i64,
    i64,
    i64,
    i64,
    String,
);

impl From<StrategyHeadFields> for StrategyHead {
    fn from(fields: StrategyHeadFields) -> Self {
        let (
            name,
            description,
            scheduling_indicator,
            unit,
            call_horizon,
            sf_late,
            late_tolerance,
            sf_early,
            early_tolerance,
            factory_calendar,
        ) = fields;
        Self {
            name,
            description,
            scheduling_indicator,
            unit,
            call_horizon,
            sf_late,
            late_tolerance,
            sf_early,
            early_tolerance,
            factory_calendar,
        }
    }
}

impl From<StrategyHead> for StrategyHeadFields {
    fn from(head: StrategyHead) -> Self {
        (
            head.name,
            head.description,
            head.scheduling_indicator,
            head.unit,
            head.call_horizon,
            head.sf_late,
            head.late_tolerance,
            head.sf_early,
            head.early_tolerance,
            head.factory_calendar,
        )
    }
}

// ==========================================
// PackageRow - 维护包行
// ==========================================
// [编号, 周期, 单位, 周期文本, 周期短文本, 层级, 层级文本,
//  偏移, 偏移文本, 提前浮动天数, 延后浮动天数, 是否绑定作业]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PackageRowFields", into = "PackageRowFields")]
pub struct PackageRow(pub MaintenancePackage);

type PackageRowFields = (
    u32,
    f64,
    PeriodUnit,
    String,
    String,
    u32,
    String,
    f64,
    String,
    u32,
    u32,
    bool,
);

impl From<PackageRowFields> for PackageRow {
    fn from(fields: PackageRowFields) -> Self {
        let (
            number,
            cycle,
            unit,
            cycle_text,
            cycle_short_text,
            hierarchy,
            hierarchy_text,
            offset,
            offset_text,
            lead_float_days,
            followup_float_days,
            operation_bound,
        ) = fields;
        PackageRow(MaintenancePackage {
            number,
            cycle,
            unit,
            cycle_text,
            cycle_short_text,
            hierarchy,
            hierarchy_text,
            offset,
            offset_text,
            lead_float_days,
            followup_float_days,
            operation_bound,
        })
    }
}

impl From<PackageRow> for PackageRowFields {
    fn from(row: PackageRow) -> Self {
        let p = row.0;
        (
            p.number,
            p.cycle,
            p.unit,
            p.cycle_text,
            p.cycle_short_text,
            p.hierarchy,
            p.hierarchy_text,
            p.offset,
            p.offset_text,
            p.lead_float_days,
            p.followup_float_days,
            p.operation_bound,
        )
    }
}

// ==========================================
// StrategyConfig - 策略配置 (抬头 + 维护包)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub head: StrategyHead,
    pub packages: Vec<PackageRow>,
}

impl StrategyConfig {
    /// 转换为维护策略并校验维护包
    pub fn to_strategy(&self, config: &SchedulerConfig) -> ConfigResult<MaintenanceStrategy> {
        let head = &self.head;
        let header = StrategyHeader {
            name: head.name.clone(),
            description: head.description.clone(),
            scheduling_indicator: head.scheduling_indicator,
            unit: head.unit,
            call_horizon: head.call_horizon,
            sf_late: head.sf_late,
            late_tolerance: head.late_tolerance,
            sf_early: head.sf_early,
            early_tolerance: head.early_tolerance,
            factory_calendar: config.factory_calendar(&head.factory_calendar)?,
        };
        let packages = self.packages.iter().map(|row| row.0.clone());
        Ok(MaintenanceStrategy::new(header, packages)?)
    }

    /// 以计划参数构造策略计划
    pub fn to_strategy_plan(
        &self,
        params: &PlanParams,
        config: &SchedulerConfig,
    ) -> ConfigResult<StrategyPlan> {
        let plan = params.to_plan(config)?;
        let strategy = self.to_strategy(config)?;
        let mut strategy_plan = StrategyPlan::new(plan, strategy);
        strategy_plan.start_offset = params.start_offset;
        Ok(strategy_plan)
    }
}
