// ==========================================
// 设备维护计划排程系统 - 配置层错误类型
// ==========================================

use crate::domain::error::DomainError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("未知工厂日历: {0:?}")]
    UnknownFactoryCalendar(String),

    #[error("配置校验失败: {0}")]
    Domain(#[from] DomainError),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
