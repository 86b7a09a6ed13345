// ==========================================
// 设备维护计划排程系统 - 引擎层错误类型
// ==========================================
// 分类:
// - 致命错误: 配置/不变量问题, 中止当前操作
// - 拒绝 (Rejection): 操作前置条件不满足, 不修改任何状态
// ==========================================

use crate::domain::error::DomainError;
use crate::domain::types::CallStatus;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use std::fmt;
use thiserror::Error;

/// 调用操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallAction {
    Release,
    Complete,
    Skip,
    Fix,
}

impl fmt::Display for CallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallAction::Release => write!(f, "下达"),
            CallAction::Complete => write!(f, "完工"),
            CallAction::Skip => write!(f, "跳过"),
            CallAction::Fix => write!(f, "固定"),
        }
    }
}

/// 操作拒绝原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("调用 {call_num} 不存在")]
    CallNotFound { call_num: u64 },

    #[error("无法{action}调用 {call_num}: 上一调用 {predecessor} 状态为 {status}")]
    PredecessorBlocked {
        action: CallAction,
        call_num: u64,
        predecessor: u64,
        status: CallStatus,
    },

    #[error("无法完工调用 {call_num}: 当前状态为 {status}, 未调用")]
    NotCalled { call_num: u64, status: CallStatus },

    #[error("无法固定调用 {call_num}: 日期 {date} 不在 ({lower:?}, {upper}) 区间内")]
    FixDateOutOfRange {
        call_num: u64,
        date: NaiveDate,
        lower: Option<NaiveDate>,
        upper: NaiveDate,
    },
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 领域/配置错误 =====
    #[error(transparent)]
    Domain(#[from] DomainError),

    // ===== 存储错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 不变量违反 =====
    #[error("调用链不变量违反: 计划 {plan_num} 的调用链中没有非手工调用")]
    MissingLastScheduledCall { plan_num: String },

    #[error("计划 {plan_num} 不是策略计划, 不支持周期内开始")]
    NotAStrategyPlan { plan_num: String },

    // ===== 外部副作用 =====
    #[error("创建调用对象失败: plan={plan_num}, call={call_num}: {message}")]
    CallObjectCreation {
        plan_num: String,
        call_num: u64,
        message: String,
    },

    // ===== 操作拒绝 =====
    #[error("操作被拒绝: {0}")]
    Rejected(#[from] Rejection),
}

impl EngineError {
    /// 是否为可恢复的操作拒绝
    pub fn is_rejection(&self) -> bool {
        matches!(self, EngineError::Rejected(_))
    }

    /// 取出拒绝原因
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            EngineError::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
