// ==========================================
// 设备维护计划排程系统 - API层错误类型
// ==========================================
// 职责: 汇总配置/引擎/存储错误, 转换为调用方可读的错误消息
// ==========================================

use crate::config::error::ConfigError;
use crate::domain::error::DomainError;
use crate::engine::error::{EngineError, Rejection};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 会话错误
    // ==========================================
    #[error("排程上下文已初始化, 不能重复初始化")]
    ContextAlreadyInitialized,

    #[error("排程上下文未初始化")]
    ContextNotInitialized,

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("操作被拒绝: {0}")]
    OperationRejected(Rejection),

    #[error("排程错误: {0}")]
    Scheduling(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("存储错误: {0}")]
    StoreError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DatabaseTransactionError(msg) => ApiError::DatabaseTransactionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::StoreError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::StoreError(other.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Rejected(reason) => ApiError::OperationRejected(reason),
            EngineError::Repository(err) => err.into(),
            other => ApiError::Scheduling(other.to_string()),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Scheduling(err.to_string())
    }
}

impl ApiError {
    /// 是否为可恢复的操作拒绝
    pub fn is_rejection(&self) -> bool {
        matches!(self, ApiError::OperationRejected(_))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
