// ==========================================
// 设备维护计划排程系统 - JSON 文件排程存储
// ==========================================
// 文件格式: { "<计划号>": [[10 字段调用行], ...], ... }
// 说明: 文件不存在视为空存储; 写入时保留其它计划的数据
// ==========================================

use crate::domain::call::CallRow;
use crate::repository::error::RepositoryResult;
use crate::repository::schedule_store::ScheduleStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

type ScheduleTable = BTreeMap<String, Vec<CallRow>>;

/// JSON 文件排程存储
#[derive(Debug, Clone)]
pub struct JsonScheduleStore {
    path: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> RepositoryResult<ScheduleTable> {
        if !self.path.exists() {
            return Ok(ScheduleTable::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(ScheduleTable::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_table(&self, table: &ScheduleTable) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string(table)?)?;
        Ok(())
    }
}

impl ScheduleStore for JsonScheduleStore {
    fn load_rows(&self, plan_num: &str) -> RepositoryResult<Vec<CallRow>> {
        let mut table = self.read_table()?;
        Ok(table.remove(plan_num).unwrap_or_default())
    }

    fn save_rows(&mut self, plan_num: &str, rows: &[CallRow]) -> RepositoryResult<()> {
        let mut table = self.read_table()?;
        table.insert(plan_num.to_string(), rows.to_vec());
        self.write_table(&table)?;

        tracing::debug!(
            "JsonScheduleStore: 写入计划 {} 的 {} 条调用 → {}",
            plan_num,
            rows.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::error::RepositoryError;
    use tempfile::TempDir;

    fn row(call_num: u64, prev: u64) -> CallRow {
        CallRow {
            call_num,
            planned_date: "20230701".to_string(),
            call_date: "20230616".to_string(),
            completion_date: String::new(),
            start_date: "20230601".to_string(),
            last_planned_date: String::new(),
            prev_call_num: prev,
            scheduling_type: "N".to_string(),
            status: "Hold".to_string(),
            due_package: String::new(),
        }
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonScheduleStore::new(dir.path().join("MHIS.json"));
        assert!(store.load_rows("1000007").unwrap().is_empty());
    }

    #[test]
    fn test_save_keeps_other_plans() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonScheduleStore::new(dir.path().join("nested").join("MHIS.json"));

        store.save_rows("A", &[row(1, 0), row(2, 1)]).unwrap();
        store.save_rows("B", &[row(1, 0)]).unwrap();

        assert_eq!(store.load_rows("A").unwrap(), vec![row(1, 0), row(2, 1)]);
        assert_eq!(store.load_rows("B").unwrap().len(), 1);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(r#""A":[[1,"20230701","20230616","","20230601","",0,"N","Hold",""]"#));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("MHIS.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonScheduleStore::new(path);
        assert!(matches!(store.load_rows("A"), Err(RepositoryError::Serialization(_))));
    }
}
