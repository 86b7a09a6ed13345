// ==========================================
// 设备维护计划排程系统 - 调度器配置
// ==========================================
// 职责: 调用对象间隔天数、存储路径、工厂日历节假日
// 格式: JSON
// {
//   "call_object_interval_days": 0,
//   "store_path": "/var/lib/maint/MHIS.json",
//   "holidays": ["20230101", "20230501"]
// }
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::calendar::FactoryCalendar;
use crate::repository::schedule_store::get_default_store_path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 绑定配置节假日的工厂日历代码
pub const DEFAULT_FACTORY_CALENDAR: &str = "00";

/// 读取 JSON 配置文件
pub fn load_json<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// 期限监控参考日 = 今天 + 调用对象间隔天数
    #[serde(default)]
    pub call_object_interval_days: i64,

    /// 排程存储路径; 缺省时取默认路径
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    /// 工厂日历 "00" 的节假日 (YYYYMMDD)
    #[serde(default)]
    pub holidays: Vec<String>,
}

impl SchedulerConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let config: Self = load_json(path)?;
        tracing::info!(
            "SchedulerConfig: 加载 {}, 节假日 {} 天",
            path.display(),
            config.holidays.len()
        );
        Ok(config)
    }

    /// 排程存储路径
    pub fn resolve_store_path(&self) -> PathBuf {
        self.store_path.clone().unwrap_or_else(get_default_store_path)
    }

    /// 按工厂日历代码取工厂日历
    ///
    /// - "" → 无工厂日历
    /// - "00" → 配置的节假日
    pub fn factory_calendar(&self, code: &str) -> ConfigResult<Option<FactoryCalendar>> {
        match code.trim() {
            "" => Ok(None),
            DEFAULT_FACTORY_CALENDAR => Ok(Some(FactoryCalendar::from_yyyymmdd(&self.holidays)?)),
            other => Err(ConfigError::UnknownFactoryCalendar(other.to_string())),
        }
    }
}
