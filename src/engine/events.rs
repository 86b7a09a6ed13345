// ==========================================
// 设备维护计划排程系统 - 调用对象创建接口
// ==========================================
// 职责: 保存调用链时, 每个"待保存调用"生成一个外部调用对象 (工单/通知)
// 说明: 引擎层只定义 trait, 具体对接由外部系统实现
// ==========================================

use crate::domain::call::Call;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Mutex;

/// 调用对象创建请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallObjectRequest {
    pub plan_num: String,
    pub call_num: u64,
    pub planned_date: NaiveDate,
    pub call_date: NaiveDate,
    pub due_package: String,
}

impl CallObjectRequest {
    pub fn from_call(plan_num: &str, call: &Call) -> Self {
        Self {
            plan_num: plan_num.to_string(),
            call_num: call.call_num,
            planned_date: call.planned_date,
            call_date: call.call_date,
            due_package: call.due_package.clone(),
        }
    }
}

/// 调用对象创建者
///
/// # 实现说明
/// - 返回外部对象编号 (如工单号), 不支持时返回空字符串
/// - 返回错误时保存中止
pub trait CallObjectCreator: Send + Sync {
    fn create_call_object(
        &self,
        request: CallObjectRequest,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作创建者
///
/// 用于不需要生成外部对象的场景（如单元测试）
#[derive(Debug, Clone, Default)]
pub struct NoOpCallObjectCreator;

impl CallObjectCreator for NoOpCallObjectCreator {
    fn create_call_object(
        &self,
        request: CallObjectRequest,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpCallObjectCreator: 跳过调用对象创建 - plan={}, call={}",
            request.plan_num,
            request.call_num
        );
        Ok(String::new())
    }
}

/// 记录型创建者
///
/// 只记录请求, 不对接外部系统; 用于试算与测试
#[derive(Debug, Default)]
pub struct RecordingCallObjectCreator {
    requests: Mutex<Vec<CallObjectRequest>>,
}

impl RecordingCallObjectCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的请求
    pub fn requests(&self) -> Vec<CallObjectRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl CallObjectCreator for RecordingCallObjectCreator {
    fn create_call_object(
        &self,
        request: CallObjectRequest,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut guard = self
            .requests
            .lock()
            .map_err(|e| format!("锁获取失败: {}", e))?;
        let object_id = format!("{}-{}", request.plan_num, request.call_num);
        guard.push(request);
        Ok(object_id)
    }
}
