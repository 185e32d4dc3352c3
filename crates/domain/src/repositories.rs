//! 外部协作者抽象
//!
//! 远程项目/文件/作业数据库以及本地持久化都通过这里的接口访问，
//! 核心逻辑不关心具体传输方式。

use async_trait::async_trait;
use dendro_errors::DendroResult;
use serde::{Deserialize, Serialize};

use crate::entities::{DendroFile, Job, JobDefinition, Project};
use crate::models::{ComputeResource, ProcessorSpec};
use crate::value_objects::{RequiredResources, RunMethod};

/// 创建作业请求
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    pub project_id: String,
    pub job_definition: JobDefinition,
    pub processor_spec: ProcessorSpec,
    pub files: Vec<DendroFile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub required_resources: RequiredResources,
    pub run_method: RunMethod,
}

/// 远程 Dendro 服务
#[async_trait]
pub trait DendroApi: Send + Sync {
    async fn fetch_project(&self, project_id: &str) -> DendroResult<Project>;
    async fn fetch_project_files(&self, project_id: &str) -> DendroResult<Vec<DendroFile>>;
    /// 返回顺序即远程服务的返回顺序，作业复用判定依赖这一顺序
    async fn fetch_jobs_for_project(&self, project_id: &str) -> DendroResult<Vec<Job>>;
    async fn fetch_job(&self, job_id: &str) -> DendroResult<Job>;
    async fn create_job(&self, request: &CreateJobRequest) -> DendroResult<Job>;
    async fn fetch_compute_resource(&self, compute_resource_id: &str)
        -> DendroResult<ComputeResource>;
    /// 获取任意文本；非成功响应返回 `None`，不向调用方抛错
    async fn fetch_text(&self, url: &str) -> Option<String>;
    async fn set_project_description(&self, project_id: &str, description: &str)
        -> DendroResult<()>;
    async fn set_project_analysis_source_url(
        &self,
        project_id: &str,
        analysis_source_url: &str,
    ) -> DendroResult<()>;
}

/// 本地键值持久化，整值替换语义
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> DendroResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> DendroResult<()>;
    fn remove(&self, key: &str) -> DendroResult<()>;
}
