// ==========================================
// 设备维护计划排程系统 - 维护策略与维护包
// ==========================================
// 职责: 维护包周期换算、维护包到期序列、下一周期偏移
// 说明: 多个维护包各自按周期独立到期, 序列即各周期的叠加采样
// 红线: 维护包周期天数必须为正整数 (0 会导致取模失败)
// ==========================================

use crate::domain::calendar::{days_between, FactoryCalendar};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::types::{PeriodUnit, SchedulingIndicator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 维护包序列默认扫描天数
pub const DEFAULT_SEQUENCE_PERIOD: u32 = 360;

// ==========================================
// MaintenancePackage - 维护包
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePackage {
    pub number: u32,                 // 维护包编号
    pub cycle: f64,                  // 周期长度
    pub unit: PeriodUnit,            // 周期单位
    pub cycle_text: String,          // 周期文本 (如 "2-monthly")
    pub cycle_short_text: String,    // 周期短文本 (如 "2M")
    pub hierarchy: u32,              // 层级
    pub hierarchy_text: String,      // 层级文本
    pub offset: f64,                 // 偏移
    pub offset_text: String,         // 偏移文本
    pub lead_float_days: u32,        // 提前浮动天数
    pub followup_float_days: u32,    // 延后浮动天数
    pub operation_bound: bool,       // 是否绑定作业
}

impl MaintenancePackage {
    /// 周期换算为天数
    pub fn cycle_in_days(&self) -> f64 {
        self.unit.to_days(self.cycle)
    }

    /// 周期天数 (整数); 校验通过后保证为正
    fn cycle_days(&self) -> u32 {
        self.cycle_in_days() as u32
    }

    /// 周期天数必须为正整数
    pub fn validate(&self) -> DomainResult<()> {
        let days = self.cycle_in_days();
        if days.is_nan() || days < 1.0 || days.fract() != 0.0 || days > u32::MAX as f64 {
            return Err(DomainError::InvalidPackageCycle {
                package: self.number,
                cycle_in_days: days,
            });
        }
        Ok(())
    }
}

impl fmt::Display for MaintenancePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}, {}", self.number, self.cycle, self.unit, self.hierarchy_text)
    }
}

/// 维护包序列中的一项: 第 day 天到期的维护包编号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    pub day: u32,
    pub packages: Vec<u32>,
}

/// 维护包查询键: 编号或周期短文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKey<'a> {
    Number(u32),
    ShortText(&'a str),
}

// ==========================================
// MaintenanceStrategy - 维护策略
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceStrategy {
    pub name: String,
    pub description: String,
    pub scheduling_indicator: SchedulingIndicator,
    pub unit: PeriodUnit,
    pub call_horizon: u32,
    pub sf_late: i64,
    pub late_tolerance: i64,
    pub sf_early: i64,
    pub early_tolerance: i64,
    pub factory_calendar: Option<FactoryCalendar>,
    /// 周期变更系数, 由所属策略计划设置
    pub cycle_change_factor: f64,
    packages: BTreeMap<u32, MaintenancePackage>,
}

/// 策略抬头参数
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyHeader {
    pub name: String,
    pub description: String,
    pub scheduling_indicator: SchedulingIndicator,
    pub unit: PeriodUnit,
    pub call_horizon: u32,
    pub sf_late: i64,
    pub late_tolerance: i64,
    pub sf_early: i64,
    pub early_tolerance: i64,
    pub factory_calendar: Option<FactoryCalendar>,
}

impl MaintenanceStrategy {
    /// 构造维护策略
    ///
    /// # 错误
    /// - InvalidStrategy: 没有维护包
    /// - InvalidPackageCycle: 任一维护包周期不是正整数天
    pub fn new(
        header: StrategyHeader,
        packages: impl IntoIterator<Item = MaintenancePackage>,
    ) -> DomainResult<Self> {
        let mut by_number = BTreeMap::new();
        for package in packages {
            package.validate()?;
            by_number.insert(package.number, package);
        }

        if by_number.is_empty() {
            return Err(DomainError::InvalidStrategy(format!(
                "策略 {} 至少需要一个维护包",
                header.name
            )));
        }

        Ok(Self {
            name: header.name,
            description: header.description,
            scheduling_indicator: header.scheduling_indicator,
            unit: header.unit,
            call_horizon: header.call_horizon,
            sf_late: header.sf_late,
            late_tolerance: header.late_tolerance,
            sf_early: header.sf_early,
            early_tolerance: header.early_tolerance,
            factory_calendar: header.factory_calendar,
            cycle_change_factor: 1.0,
            packages: by_number,
        })
    }

    pub fn packages(&self) -> impl Iterator<Item = &MaintenancePackage> {
        self.packages.values()
    }

    /// 最短维护包周期 (天)
    pub fn min_cycle_in_days(&self) -> u32 {
        self.packages.values().map(|p| p.cycle_days()).min().unwrap_or(0)
    }

    /// 最长维护包周期 (天)
    pub fn max_cycle_in_days(&self) -> u32 {
        self.packages.values().map(|p| p.cycle_days()).max().unwrap_or(0)
    }

    /// 按编号或周期短文本查找维护包
    pub fn get_package(&self, key: PackageKey<'_>) -> Option<&MaintenancePackage> {
        match key {
            PackageKey::Number(number) => self.packages.get(&number),
            PackageKey::ShortText(text) => {
                self.packages.values().find(|p| p.cycle_short_text == text)
            }
        }
    }

    // ==========================================
    // 维护包序列
    // ==========================================

    /// 维护包到期序列
    ///
    /// 对 (start_offset, start_offset + period] 内每个整数天 i,
    /// 满足 i mod 周期天数 == 0 的维护包在当天到期; 只输出有到期包的天。
    pub fn package_sequence(&self, start_offset: u32, period: u32) -> Vec<SequenceEntry> {
        let first = start_offset as u64 + 1;
        let last = start_offset as u64 + period as u64;

        (first..=last)
            .filter_map(|day| {
                let due: Vec<u32> = self
                    .packages
                    .values()
                    .filter(|p| day % p.cycle_days() as u64 == 0)
                    .map(|p| p.number)
                    .collect();
                if due.is_empty() {
                    None
                } else {
                    Some(SequenceEntry {
                        day: day as u32,
                        packages: due,
                    })
                }
            })
            .collect()
    }

    /// 指定日期到期的维护包
    ///
    /// 从 previous_offset 开始扫描默认序列, 返回第一个满足
    /// `previous_offset + (date - start_date) >= day` 的条目中的维护包。
    /// 只取第一项, 不累计所有已过期条目。
    pub fn due_packages(
        &self,
        date: NaiveDate,
        start_date: NaiveDate,
        previous_offset: u32,
    ) -> Vec<&MaintenancePackage> {
        let elapsed = days_between(date, start_date);
        let reached = previous_offset as i64 + elapsed;

        self.package_sequence(previous_offset, DEFAULT_SEQUENCE_PERIOD)
            .into_iter()
            .find(|entry| reached >= entry.day as i64)
            .map(|entry| {
                entry
                    .packages
                    .iter()
                    .filter_map(|number| self.packages.get(number))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 到期维护包的短文本拼接 (如 "2M3M")
    pub fn due_packages_text(
        &self,
        date: NaiveDate,
        start_date: NaiveDate,
        previous_offset: u32,
    ) -> String {
        self.due_packages(date, start_date, previous_offset)
            .iter()
            .map(|p| p.cycle_short_text.as_str())
            .collect()
    }

    /// 下一周期偏移
    ///
    /// 从 start_offset 扫描 `previous_offset + 最长周期` 天:
    /// - previous_offset 是序列中的某一天 → 返回其后一项
    /// - 否则 (初始偏移) → 返回序列第一项
    ///
    /// 周期变更系数不参与偏移计算, 只在换算天数时生效。
    ///
    /// # 错误
    /// - SequenceExhausted: 扫描范围内不存在下一个到期日
    pub fn next_offset(&self, start_offset: u32, previous_offset: u32) -> DomainResult<u32> {
        let exhausted = || DomainError::SequenceExhausted {
            start_offset,
            previous_offset,
        };
        let span = previous_offset.saturating_add(self.max_cycle_in_days());
        let sequence = self.package_sequence(start_offset, span);

        match sequence.iter().position(|entry| entry.day == previous_offset) {
            Some(index) => sequence
                .get(index + 1)
                .map(|entry| entry.day)
                .ok_or_else(exhausted),
            None => sequence.first().map(|entry| entry.day).ok_or_else(exhausted),
        }
    }

    /// 偏移差换算为天数 (乘以周期变更系数)
    pub fn offset_delta_in_days(&self, previous_offset: u32, next_offset: u32) -> f64 {
        (next_offset as f64 - previous_offset as f64) * self.cycle_change_factor
    }
}

impl fmt::Display for MaintenanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} unit: {}", self.name, self.description, self.unit)
    }
}
