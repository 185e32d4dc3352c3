use serde::{Deserialize, Serialize};

use super::processor::ProcessorSpec;
use crate::value_objects::RunMethod;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResourceApp {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_uri: Option<String>,
    #[serde(default)]
    pub processors: Vec<ProcessorSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResourceSpec {
    #[serde(default)]
    pub apps: Vec<ComputeResourceApp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_job_run_method: Option<RunMethod>,
}

/// 计算资源（外部执行后端）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeResource {
    pub compute_resource_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<ComputeResourceSpec>,
}

impl ComputeResource {
    /// 按应用顺序查找第一个同名处理器
    pub fn find_processor(&self, name: &str) -> Option<&ProcessorSpec> {
        self.spec
            .as_ref()?
            .apps
            .iter()
            .flat_map(|app| app.processors.iter())
            .find(|p| p.name == name)
    }

    pub fn default_run_method(&self) -> Option<RunMethod> {
        self.spec.as_ref().and_then(|s| s.default_job_run_method)
    }
}
