// ==========================================
// 设备维护计划排程系统 - 领域类型定义
// ==========================================
// 职责: 排程标识、调用状态、排程类型、周期单位
// 序列化格式: 与排程存储表一致 (状态标签 / 单字符代码)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 排程标识 (Scheduling Indicator)
// ==========================================
// 决定日期推进所用的日历模型
// 计数器类标识 (CounterBased / MultiCounter) 仅登记, 日期推进时显式拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SchedulingIndicator {
    Time,            // 0: 按自然日
    KeyDate,         // 1: 按关键日期 (整月)
    FactoryCalendar, // 2: 按工厂日历工作日
    CounterBased,    // 3: 按计数器 (未实现)
    MultiCounter,    // 4: 多计数器 (未实现)
}

impl SchedulingIndicator {
    /// 数值代码
    pub fn code(&self) -> u8 {
        match self {
            SchedulingIndicator::Time => 0,
            SchedulingIndicator::KeyDate => 1,
            SchedulingIndicator::FactoryCalendar => 2,
            SchedulingIndicator::CounterBased => 3,
            SchedulingIndicator::MultiCounter => 4,
        }
    }

    /// 是否为计数器类标识
    pub fn is_counter_based(&self) -> bool {
        matches!(
            self,
            SchedulingIndicator::CounterBased | SchedulingIndicator::MultiCounter
        )
    }
}

impl TryFrom<u8> for SchedulingIndicator {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SchedulingIndicator::Time),
            1 => Ok(SchedulingIndicator::KeyDate),
            2 => Ok(SchedulingIndicator::FactoryCalendar),
            3 => Ok(SchedulingIndicator::CounterBased),
            4 => Ok(SchedulingIndicator::MultiCounter),
            other => Err(format!("未知排程标识: {}", other)),
        }
    }
}

impl From<SchedulingIndicator> for u8 {
    fn from(indicator: SchedulingIndicator) -> Self {
        indicator.code()
    }
}

impl fmt::Display for SchedulingIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulingIndicator::Time => write!(f, "TIME"),
            SchedulingIndicator::KeyDate => write!(f, "KEY_DATE"),
            SchedulingIndicator::FactoryCalendar => write!(f, "FACTORY_CALENDAR"),
            SchedulingIndicator::CounterBased => write!(f, "COUNTER_BASED"),
            SchedulingIndicator::MultiCounter => write!(f, "MULTI_COUNTER"),
        }
    }
}

// ==========================================
// 调用状态 (Call Status)
// ==========================================
// 状态流转: Hold → {Fixed, Skipped, SaveToCall} → Called → Completed
// Locked 为保留状态, 现有流转不会到达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CallStatus {
    Hold,       // 等待
    Fixed,      // 人工固定日期
    Skipped,    // 跳过
    SaveToCall, // 待保存调用
    Called,     // 已调用
    Completed,  // 已完成
    Locked,     // 锁定 (保留)
}

impl CallStatus {
    /// 存储用的状态标签
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Hold => "Hold",
            CallStatus::Fixed => "Fixed",
            CallStatus::Skipped => "Skipped",
            CallStatus::SaveToCall => "Save to call",
            CallStatus::Called => "Called",
            CallStatus::Completed => "Completed",
            CallStatus::Locked => "Locked",
        }
    }

    /// 从状态标签解析
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Hold" => Some(CallStatus::Hold),
            "Fixed" => Some(CallStatus::Fixed),
            "Skipped" => Some(CallStatus::Skipped),
            "Save to call" => Some(CallStatus::SaveToCall),
            "Called" => Some(CallStatus::Called),
            "Completed" => Some(CallStatus::Completed),
            "Locked" => Some(CallStatus::Locked),
            _ => None,
        }
    }

    /// 等待或固定 (阻塞后继调用的操作)
    pub fn is_hold_or_fixed(&self) -> bool {
        matches!(self, CallStatus::Hold | CallStatus::Fixed)
    }
}

impl TryFrom<String> for CallStatus {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        CallStatus::from_label(&label).ok_or_else(|| format!("未知调用状态: {}", label))
    }
}

impl From<CallStatus> for String {
    fn from(status: CallStatus) -> Self {
        status.label().to_string()
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 排程类型 (Scheduling Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchedulingType {
    NewStart,   // N: 新开始
    Scheduled,  // T: 按周期排程
    Manual,     // M: 手工调用
    CycleStart, // Z: 周期内开始
}

impl SchedulingType {
    /// 单字符代码
    pub fn code(&self) -> char {
        match self {
            SchedulingType::NewStart => 'N',
            SchedulingType::Scheduled => 'T',
            SchedulingType::Manual => 'M',
            SchedulingType::CycleStart => 'Z',
        }
    }

    /// 从单字符代码解析
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "N" => Some(SchedulingType::NewStart),
            "T" => Some(SchedulingType::Scheduled),
            "M" => Some(SchedulingType::Manual),
            "Z" => Some(SchedulingType::CycleStart),
            _ => None,
        }
    }
}

impl TryFrom<String> for SchedulingType {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        SchedulingType::from_code(&code).ok_or_else(|| format!("未知排程类型: {}", code))
    }
}

impl From<SchedulingType> for String {
    fn from(kind: SchedulingType) -> Self {
        kind.code().to_string()
    }
}

impl fmt::Display for SchedulingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ==========================================
// 周期单位 (Period Unit)
// ==========================================
// 换算: MON = 30 天, D = 1 天, H = 1/24 天
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodUnit {
    #[serde(rename = "MON")]
    Month,
    #[serde(rename = "D")]
    Day,
    #[serde(rename = "H")]
    Hour,
}

impl PeriodUnit {
    /// 将周期长度换算为天数
    pub fn to_days(&self, period: f64) -> f64 {
        match self {
            PeriodUnit::Month => period * 30.0,
            PeriodUnit::Day => period,
            PeriodUnit::Hour => period / 24.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodUnit::Month => "MON",
            PeriodUnit::Day => "D",
            PeriodUnit::Hour => "H",
        }
    }
}

impl std::str::FromStr for PeriodUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MON" => Ok(PeriodUnit::Month),
            "D" => Ok(PeriodUnit::Day),
            "H" => Ok(PeriodUnit::Hour),
            other => Err(format!("未知周期单位: {}", other)),
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
