// ==========================================
// 设备维护计划排程系统 - 维护调用领域模型
// ==========================================
// 职责: 调用实体、存储行 (10 字段) 编解码、基础状态变更
// 说明: 上一调用通过"上一调用号"在调度器的调用集合中查找,
//       调用本身不持有上一调用
// ==========================================

use crate::domain::calendar::{
    format_optional_yyyymmdd, format_yyyymmdd, parse_optional_yyyymmdd, parse_yyyymmdd,
};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::types::{CallStatus, SchedulingType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 手工调用号起始值
pub const MANUAL_CALL_NUM_START: u64 = 90_000_000;

// ==========================================
// CallCycle - 调用变体
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallCycle {
    /// 单周期调用
    SingleCycle,
    /// 策略调用: 当前/上一周期偏移 (天)
    Strategy {
        current_offset: u32,
        previous_offset: u32,
    },
}

// ==========================================
// Call - 维护调用
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub call_num: u64,                        // 调用号
    pub planned_date: NaiveDate,              // 计划日期
    pub call_date: NaiveDate,                 // 调用 (下达) 日期
    pub completion_date: Option<NaiveDate>,   // 完工日期
    pub start_date: NaiveDate,                // 开始日期 (来自计划)
    pub last_planned_date: Option<NaiveDate>, // 上一调用的计划日期 (审计)
    pub prev_call_num: u64,                   // 上一调用号 (0 表示无)
    pub scheduling_type: SchedulingType,      // 排程类型
    pub status: CallStatus,                   // 状态
    pub due_package: String,                  // 到期维护包文本
    pub cycle: CallCycle,                     // 调用变体
}

impl Call {
    /// 是否为手工调用
    pub fn is_manual(&self) -> bool {
        self.scheduling_type == SchedulingType::Manual
    }

    /// 等待或固定
    pub fn on_hold_or_fixed(&self) -> bool {
        self.status.is_hold_or_fixed()
    }

    /// 是否已完工
    pub fn is_completed(&self) -> bool {
        self.completion_date.is_some()
    }

    /// 当前周期偏移 (单周期调用为 0)
    pub fn current_offset(&self) -> u32 {
        match self.cycle {
            CallCycle::Strategy { current_offset, .. } => current_offset,
            CallCycle::SingleCycle => 0,
        }
    }

    /// 上一周期偏移 (单周期调用为 0)
    pub fn previous_offset(&self) -> u32 {
        match self.cycle {
            CallCycle::Strategy { previous_offset, .. } => previous_offset,
            CallCycle::SingleCycle => 0,
        }
    }

    // ==========================================
    // 状态变更
    // ==========================================
    // 前置条件 (上一调用状态、日期区间) 由调度器校验

    /// 下达: 状态置为待保存调用, 调用日期为今天
    pub fn release(&mut self, today: NaiveDate) {
        self.call_date = today;
        self.status = CallStatus::SaveToCall;
    }

    /// 完工
    pub fn complete(&mut self, completion_date: NaiveDate) {
        self.completion_date = Some(completion_date);
        self.status = CallStatus::Completed;
    }

    /// 跳过
    pub fn skip(&mut self) {
        self.status = CallStatus::Skipped;
    }

    /// 人工固定计划日期
    pub fn fix(&mut self, fix_date: NaiveDate) {
        self.planned_date = fix_date;
        self.status = CallStatus::Fixed;
    }

    // ==========================================
    // 存储行编解码
    // ==========================================

    /// 转换为存储行
    pub fn to_row(&self) -> CallRow {
        CallRow {
            call_num: self.call_num,
            planned_date: format_yyyymmdd(self.planned_date),
            call_date: format_yyyymmdd(self.call_date),
            completion_date: format_optional_yyyymmdd(self.completion_date),
            start_date: format_yyyymmdd(self.start_date),
            last_planned_date: format_optional_yyyymmdd(self.last_planned_date),
            prev_call_num: self.prev_call_num,
            scheduling_type: self.scheduling_type.code().to_string(),
            status: self.status.label().to_string(),
            due_package: self.due_package.clone(),
        }
    }

    /// 从存储行构造
    ///
    /// 策略调用的周期偏移不在存储行中, 以 0 初始化, 由调度器加载后按调用链重建
    pub fn from_row(row: &CallRow, cycle: CallCycle) -> DomainResult<Self> {
        let scheduling_type =
            SchedulingType::from_code(&row.scheduling_type).ok_or_else(|| DomainError::FieldValueError {
                field: "scheduling_type".to_string(),
                message: format!("call {}: 未知排程类型 {:?}", row.call_num, row.scheduling_type),
            })?;
        let status = CallStatus::from_label(&row.status).ok_or_else(|| DomainError::FieldValueError {
            field: "status".to_string(),
            message: format!("call {}: 未知状态 {:?}", row.call_num, row.status),
        })?;

        Ok(Self {
            call_num: row.call_num,
            planned_date: parse_yyyymmdd(&row.planned_date)?,
            call_date: parse_yyyymmdd(&row.call_date)?,
            completion_date: parse_optional_yyyymmdd(&row.completion_date)?,
            start_date: parse_yyyymmdd(&row.start_date)?,
            last_planned_date: parse_optional_yyyymmdd(&row.last_planned_date)?,
            prev_call_num: row.prev_call_num,
            scheduling_type,
            status,
            due_package: row.due_package.clone(),
            cycle,
        })
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = self.to_row();
        write!(
            f,
            "{}, {}, {}, {}, {}, {}, {}, {}, {}, {}",
            row.call_num,
            row.planned_date,
            row.call_date,
            row.completion_date,
            row.start_date,
            row.last_planned_date,
            row.prev_call_num,
            row.scheduling_type,
            row.status,
            row.due_package
        )
    }
}

// ==========================================
// CallRow - 调用存储行
// ==========================================
// 固定 10 字段, 序列化为 JSON 数组:
// [调用号, 计划日期, 调用日期, 完工日期|"", 开始日期, 上次计划日期|"",
//  上一调用号, 排程类型, 状态标签, 到期维护包文本]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CallRowFields", into = "CallRowFields")]
pub struct CallRow {
    pub call_num: u64,
    pub planned_date: String,
    pub call_date: String,
    pub completion_date: String,
    pub start_date: String,
    pub last_planned_date: String,
    pub prev_call_num: u64,
    pub scheduling_type: String,
    pub status: String,
    pub due_package: String,
}

type CallRowFields = (u64, String, String, String, String, String, u64, String, String, String);

impl From<CallRowFields> for CallRow {
    fn from(fields: CallRowFields) -> Self {
        let (
            call_num,
            planned_date,
            call_date,
            completion_date,
            start_date,
            last_planned_date,
            prev_call_num,
            scheduling_type,
            status,
            due_package,
        ) = fields;
        Self {
            call_num,
            planned_date,
            call_date,
            completion_date,
            start_date,
            last_planned_date,
            prev_call_num,
            scheduling_type,
            status,
            due_package,
        }
    }
}

impl From<CallRow> for CallRowFields {
    fn from(row: CallRow) -> Self {
        (
            row.call_num,
            row.planned_date,
            row.call_date,
            row.completion_date,
            row.start_date,
            row.last_planned_date,
            row.prev_call_num,
            row.scheduling_type,
            row.status,
            row.due_package,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_call() -> Call {
        Call {
            call_num: 2,
            planned_date: ymd(2023, 8, 1),
            call_date: ymd(2023, 7, 16),
            completion_date: None,
            start_date: ymd(2023, 6, 1),
            last_planned_date: Some(ymd(2023, 7, 1)),
            prev_call_num: 1,
            scheduling_type: SchedulingType::Scheduled,
            status: CallStatus::Hold,
            due_package: "2M".to_string(),
            cycle: CallCycle::SingleCycle,
        }
    }

    #[test]
    fn test_row_serializes_as_ten_field_array() {
        let row = sample_call().to_row();
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            r#"[2,"20230801","20230716","","20230601","20230701",1,"T","Hold","2M"]"#
        );

        let back: CallRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_from_row_restores_fields() {
        let call = sample_call();
        let restored = Call::from_row(&call.to_row(), CallCycle::SingleCycle).unwrap();
        assert_eq!(restored, call);
    }

    #[test]
    fn test_from_row_rejects_unknown_codes() {
        let mut row = sample_call().to_row();
        row.status = "Unknown".to_string();
        assert!(matches!(
            Call::from_row(&row, CallCycle::SingleCycle),
            Err(DomainError::FieldValueError { .. })
        ));

        let mut row = sample_call().to_row();
        row.planned_date = "2023-08-01".to_string();
        assert!(matches!(
            Call::from_row(&row, CallCycle::SingleCycle),
            Err(DomainError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_state_changes() {
        let mut call = sample_call();
        call.release(ymd(2023, 7, 20));
        assert_eq!(call.status, CallStatus::SaveToCall);
        assert_eq!(call.call_date, ymd(2023, 7, 20));

        call.complete(ymd(2023, 8, 3));
        assert_eq!(call.status, CallStatus::Completed);
        assert!(call.is_completed());

        let mut call = sample_call();
        call.fix(ymd(2023, 8, 10));
        assert_eq!(call.planned_date, ymd(2023, 8, 10));
        assert!(call.on_hold_or_fixed());

        call.skip();
        assert_eq!(call.status, CallStatus::Skipped);
        assert!(!call.on_hold_or_fixed());
    }

    #[test]
    fn test_offsets_default_for_single_cycle() {
        let mut call = sample_call();
        assert_eq!(call.current_offset(), 0);
        call.cycle = CallCycle::Strategy {
            current_offset: 90,
            previous_offset: 60,
        };
        assert_eq!(call.current_offset(), 90);
        assert_eq!(call.previous_offset(), 60);
    }
}
