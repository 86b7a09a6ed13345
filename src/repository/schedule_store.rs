// ==========================================
// 设备维护计划排程系统 - 排程存储接口
// ==========================================
// 存储结构: 计划号 → 有序调用行列表
// 红线: 仓储不含业务逻辑, 只负责调用行读写
// ==========================================

use crate::domain::call::CallRow;
use crate::repository::error::RepositoryResult;
use std::path::PathBuf;

/// 默认存储文件名
pub const DEFAULT_STORE_FILE: &str = "MHIS.json";

/// 存储路径环境变量
pub const STORE_PATH_ENV: &str = "MAINT_SCHEDULE_STORE_PATH";

/// 排程存储
///
/// 行顺序即调用的插入顺序, 读写时必须原样保持
pub trait ScheduleStore {
    /// 读取计划的全部调用行; 计划不存在时返回空列表
    fn load_rows(&self, plan_num: &str) -> RepositoryResult<Vec<CallRow>>;

    /// 覆盖写入计划的全部调用行
    fn save_rows(&mut self, plan_num: &str, rows: &[CallRow]) -> RepositoryResult<()>;
}

/// 获取默认存储路径
///
/// # 返回
/// - 环境变量 MAINT_SCHEDULE_STORE_PATH 非空时使用该路径
/// - 否则: 用户数据目录/maint-call-scheduler/MHIS.json
/// - 取不到用户数据目录时回退到 ./MHIS.json
pub fn get_default_store_path() -> PathBuf {
    if let Ok(path) = std::env::var(STORE_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("maint-call-scheduler").join(DEFAULT_STORE_FILE),
        None => PathBuf::from(".").join(DEFAULT_STORE_FILE),
    }
}
