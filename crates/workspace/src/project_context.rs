use std::sync::Arc;

use dendro_domain::{
    ComputeResource, DendroApi, DendroError, DendroFile, DendroResult, Job, Project,
};
use tracing::{debug, info};

/// 当前项目的上下文
///
/// 由打开项目的一方持有并负责刷新，其他组件只读。
pub struct ProjectContext {
    api: Arc<dyn DendroApi>,
    default_compute_resource_id: Option<String>,
    project: Project,
    files: Vec<DendroFile>,
    jobs: Vec<Job>,
}

impl ProjectContext {
    pub async fn load(
        api: Arc<dyn DendroApi>,
        project_id: &str,
        default_compute_resource_id: Option<String>,
    ) -> DendroResult<Self> {
        let project = api.fetch_project(project_id).await?;
        let files = api.fetch_project_files(project_id).await?;
        let jobs = api.fetch_jobs_for_project(project_id).await?;
        debug!(
            "加载项目 {}: {} 个文件, {} 个作业",
            project_id,
            files.len(),
            jobs.len()
        );

        Ok(Self {
            api,
            default_compute_resource_id,
            project,
            files,
            jobs,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_id(&self) -> &str {
        &self.project.project_id
    }

    pub fn files(&self) -> &[DendroFile] {
        &self.files
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn file(&self, file_name: &str) -> DendroResult<&DendroFile> {
        self.files
            .iter()
            .find(|f| f.file_name == file_name)
            .ok_or_else(|| DendroError::file_not_found(file_name))
    }

    pub fn job(&self, job_id: &str) -> DendroResult<&Job> {
        self.jobs
            .iter()
            .find(|j| j.job_id == job_id)
            .ok_or_else(|| DendroError::job_not_found(job_id))
    }

    /// 项目未指定计算资源时回退到默认计算资源
    pub fn compute_resource_id(&self) -> Option<&str> {
        self.project
            .compute_resource_id
            .as_deref()
            .or(self.default_compute_resource_id.as_deref())
    }

    pub async fn fetch_compute_resource(&self) -> DendroResult<ComputeResource> {
        let id = self.compute_resource_id().ok_or_else(|| {
            DendroError::config_error(format!(
                "项目 {} 未指定计算资源，且没有默认计算资源",
                self.project.project_id
            ))
        })?;
        self.api.fetch_compute_resource(id).await
    }

    pub async fn refresh_project(&mut self) -> DendroResult<()> {
        self.project = self.api.fetch_project(&self.project.project_id).await?;
        Ok(())
    }

    pub async fn refresh_files(&mut self) -> DendroResult<()> {
        self.files = self.api.fetch_project_files(&self.project.project_id).await?;
        Ok(())
    }

    pub async fn refresh_jobs(&mut self) -> DendroResult<()> {
        self.jobs = self
            .api
            .fetch_jobs_for_project(&self.project.project_id)
            .await?;
        Ok(())
    }

    pub async fn set_description(&mut self, description: &str) -> DendroResult<()> {
        self.api
            .set_project_description(&self.project.project_id, description)
            .await?;
        info!("已更新项目 {} 的描述", self.project.project_id);
        self.refresh_project().await
    }

    pub async fn set_analysis_source_url(&mut self, url: &str) -> DendroResult<()> {
        self.api
            .set_project_analysis_source_url(&self.project.project_id, url)
            .await?;
        info!("已更新项目 {} 的分析源地址", self.project.project_id);
        self.refresh_project().await
    }

    pub fn dataset_ids(&self) -> Vec<String> {
        self.project.dataset_ids()
    }
}
