// ==========================================
// 设备维护计划排程系统 - 日历与日期运算
// ==========================================
// 职责: 月份偏移 (MonthDelta)、工厂日历、YYYYMMDD 编解码
// 红线: 工厂日历只排除节假日, 周末不做特殊处理
// ==========================================

use crate::domain::error::{DomainError, DomainResult};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// 存储格式
pub const YYYYMMDD: &str = "%Y%m%d";

// ==========================================
// 日期辅助函数
// ==========================================

/// 解析 YYYYMMDD 字符串
pub fn parse_yyyymmdd(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), YYYYMMDD)
        .map_err(|_| DomainError::InvalidDate(s.to_string()))
}

/// 解析可为空的 YYYYMMDD 字符串 (空串表示无日期)
pub fn parse_optional_yyyymmdd(s: &str) -> DomainResult<Option<NaiveDate>> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_yyyymmdd(s).map(Some)
    }
}

/// 格式化为 YYYYMMDD
pub fn format_yyyymmdd(d: NaiveDate) -> String {
    d.format(YYYYMMDD).to_string()
}

/// 格式化可为空的日期 (无日期输出空串)
pub fn format_optional_yyyymmdd(d: Option<NaiveDate>) -> String {
    d.map(format_yyyymmdd).unwrap_or_default()
}

/// d1 - d2 的天数差
pub fn days_between(d1: NaiveDate, d2: NaiveDate) -> i64 {
    (d1 - d2).num_days()
}

/// 按自然日偏移 (可为负)
pub fn add_days(base: NaiveDate, days: i64) -> DomainResult<NaiveDate> {
    let shifted = if days >= 0 {
        base.checked_add_days(Days::new(days as u64))
    } else {
        base.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(|| DomainError::DateOutOfRange {
        base,
        detail: format!("{:+} days", days),
    })
}

/// 天数向下取整 (与整除语义一致)
pub fn whole_days(days: f64) -> i64 {
    days.floor() as i64
}

// ==========================================
// MonthDelta - 月份偏移
// ==========================================
// 加到日期上保持"日"不变; 目标月份天数不足时取当月最后一天
// 例: 2008-01-30 + 1 个月 = 2008-02-29
// 注意: 涉及 29/30/31 日时不可逆
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MonthDelta {
    months: i32,
}

impl MonthDelta {
    pub const fn new(months: i32) -> Self {
        Self { months }
    }

    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn abs(&self) -> Self {
        Self::new(self.months.abs())
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0
    }

    /// 加到日期上
    ///
    /// # 返回
    /// - Ok(NaiveDate): 偏移后日期 (日按目标月份截断)
    /// - Err(DateOutOfRange): 结果超出可表示范围
    pub fn add_to(&self, date: NaiveDate) -> DomainResult<NaiveDate> {
        let out_of_range = || DomainError::DateOutOfRange {
            base: date,
            detail: format!("{}", self),
        };

        // 月份从 0 计, 便于整除
        let month0 = date.month0() as i64 + self.months as i64;
        let year = date.year() as i64 + month0.div_euclid(12);
        let month = (month0.rem_euclid(12) + 1) as u32;
        let year = i32::try_from(year).map_err(|_| out_of_range())?;

        let day = date.day().min(last_day_of_month(year, month));
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(out_of_range)
    }

    /// 从日期上减去
    pub fn sub_from(&self, date: NaiveDate) -> DomainResult<NaiveDate> {
        (-*self).add_to(date)
    }
}

/// 指定年月的最后一天
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

impl fmt::Display for MonthDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months.abs() == 1 {
            write!(f, "{} month", self.months)
        } else {
            write!(f, "{} months", self.months)
        }
    }
}

impl Add for MonthDelta {
    type Output = MonthDelta;

    fn add(self, rhs: MonthDelta) -> MonthDelta {
        MonthDelta::new(self.months + rhs.months)
    }
}

impl Sub for MonthDelta {
    type Output = MonthDelta;

    fn sub(self, rhs: MonthDelta) -> MonthDelta {
        MonthDelta::new(self.months - rhs.months)
    }
}

impl Neg for MonthDelta {
    type Output = MonthDelta;

    fn neg(self) -> MonthDelta {
        MonthDelta::new(-self.months)
    }
}

impl Mul<i32> for MonthDelta {
    type Output = MonthDelta;

    fn mul(self, rhs: i32) -> MonthDelta {
        MonthDelta::new(self.months * rhs)
    }
}

impl Mul<MonthDelta> for i32 {
    type Output = MonthDelta;

    fn mul(self, rhs: MonthDelta) -> MonthDelta {
        rhs * self
    }
}

/// 整除 (向下取整)
impl Div<i32> for MonthDelta {
    type Output = MonthDelta;

    fn div(self, rhs: i32) -> MonthDelta {
        MonthDelta::new(self.months.div_euclid(rhs))
    }
}

/// MonthDelta / MonthDelta → 整数倍数 (向下取整)
impl Div for MonthDelta {
    type Output = i32;

    fn div(self, rhs: MonthDelta) -> i32 {
        self.months.div_euclid(rhs.months)
    }
}

// ==========================================
// FactoryCalendar - 工厂日历
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactoryCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl FactoryCalendar {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// 从 YYYYMMDD 字符串列表构造 (重复日期自动合并)
    pub fn from_yyyymmdd<S: AsRef<str>>(holidays: &[S]) -> DomainResult<Self> {
        let dates = holidays
            .iter()
            .map(|s| parse_yyyymmdd(s.as_ref()))
            .collect::<DomainResult<BTreeSet<_>>>()?;
        Ok(Self { holidays: dates })
    }

    pub fn holidays(&self) -> impl Iterator<Item = &NaiveDate> {
        self.holidays.iter()
    }

    /// [start, end] 内 (含两端) 的节假日数
    pub fn holiday_count(&self, start: NaiveDate, end: NaiveDate) -> usize {
        if start > end {
            return 0;
        }
        self.holidays.range(start..=end).count()
    }

    /// 是否为工作日 (非节假日即工作日)
    pub fn is_workday(&self, d: NaiveDate) -> bool {
        !self.holidays.contains(&d)
    }

    /// 按工作日推进
    ///
    /// 逐日前进, 遇到工作日计数 +1, 直到计数 **严格大于** `workdays` 为止,
    /// 返回触发停止的那一天。
    ///
    /// FIXME: 计数条件比直观定义多走一个工作日 (无节假日时返回 d + workdays + 1),
    /// 与现有排程数据保持一致, 暂不修正。
    pub fn add_workdays(&self, d: NaiveDate, workdays: i64) -> DomainResult<NaiveDate> {
        let mut step: i64 = 0;
        let mut counted: i64 = 0;
        let mut reached = d;

        while counted <= workdays {
            step += 1;
            reached = add_days(d, step)?;
            if self.is_workday(reached) {
                counted += 1;
            }
        }

        Ok(reached)
    }
}
