use std::sync::Arc;

use metrics::counter;
use tracing::{debug, error, info, warn};

use dendro_domain::{
    ComputeResource, CreateJobRequest, DendroApi, DendroError, DendroFile, DendroResult, Job,
};

use crate::builder::JobDefinitionBuilder;
use crate::intents::JobIntent;
use crate::resolver::JobIdentityResolver;

/// 一次提交判定所需的项目快照
#[derive(Debug, Clone, Copy)]
pub struct SubmissionContext<'a> {
    pub project_id: &'a str,
    pub compute_resource: &'a ComputeResource,
    pub files: &'a [DendroFile],
    /// 按远程服务返回的顺序
    pub jobs: &'a [Job],
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Reused(Job),
    Created(Job),
}

impl SubmissionOutcome {
    pub fn job(&self) -> &Job {
        match self {
            SubmissionOutcome::Reused(job) | SubmissionOutcome::Created(job) => job,
        }
    }

    pub fn into_job(self) -> Job {
        match self {
            SubmissionOutcome::Reused(job) | SubmissionOutcome::Created(job) => job,
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, SubmissionOutcome::Reused(_))
    }
}

/// 作业提交编排器
///
/// 先构造定义，再在已有作业中查找等价者；找到则复用，否则创建一次。
/// 创建失败不重试，由调用方决定是否再次发起。
pub struct JobSubmissionOrchestrator {
    api: Arc<dyn DendroApi>,
}

impl JobSubmissionOrchestrator {
    pub fn new(api: Arc<dyn DendroApi>) -> Self {
        Self { api }
    }

    pub async fn submit_or_reuse(
        &self,
        ctx: &SubmissionContext<'_>,
        intent: &dyn JobIntent,
    ) -> DendroResult<SubmissionOutcome> {
        let processor_name = intent.processor_name();
        let processor = ctx
            .compute_resource
            .find_processor(processor_name)
            .ok_or_else(|| {
                warn!(
                    "计算资源 {} 未提供处理器 {}",
                    ctx.compute_resource.compute_resource_id, processor_name
                );
                DendroError::processor_not_found(processor_name)
            })?;

        let built = JobDefinitionBuilder::new(processor)
            .with_bindings(intent.bindings())
            .required_resources(intent.required_resources())
            .run_method(ctx.compute_resource.default_run_method())
            .build()?;

        let criteria = intent.match_criteria();
        if let Some(existing) = JobIdentityResolver::resolve(&criteria, &built.definition, ctx.jobs)
        {
            info!(
                "复用已有作业 {} (processor={}, status={})",
                existing.job_id, processor_name, existing.status
            );
            counter!("dendro_job_submissions_total", "outcome" => "reused").increment(1);
            return Ok(SubmissionOutcome::Reused(existing.clone()));
        }

        let run_method = built.run_method.ok_or_else(|| {
            DendroError::config_error(format!(
                "计算资源 {} 未设置默认运行方式",
                ctx.compute_resource.compute_resource_id
            ))
        })?;

        let request = CreateJobRequest {
            project_id: ctx.project_id.to_string(),
            job_definition: built.definition,
            processor_spec: processor.clone(),
            files: ctx.files.to_vec(),
            batch_id: None,
            required_resources: built.required_resources,
            run_method,
        };

        debug!(
            "创建作业: project={}, processor={}, run_method={}",
            ctx.project_id, processor_name, run_method
        );
        match self.api.create_job(&request).await {
            Ok(job) => {
                info!("已创建作业 {} (processor={})", job.job_id, processor_name);
                counter!("dendro_job_submissions_total", "outcome" => "created").increment(1);
                Ok(SubmissionOutcome::Created(job))
            }
            Err(e) => {
                error!("创建作业失败 (processor={}): {}", processor_name, e);
                counter!("dendro_job_submissions_total", "outcome" => "failed").increment(1);
                Err(e)
            }
        }
    }

    /// 先拉取最新的计算资源、文件和作业列表，再做提交判定
    pub async fn refresh_and_submit(
        &self,
        project_id: &str,
        compute_resource_id: &str,
        intent: &dyn JobIntent,
    ) -> DendroResult<SubmissionOutcome> {
        let compute_resource = self.api.fetch_compute_resource(compute_resource_id).await?;
        let files = self.api.fetch_project_files(project_id).await?;
        let jobs = self.api.fetch_jobs_for_project(project_id).await?;

        let ctx = SubmissionContext {
            project_id,
            compute_resource: &compute_resource,
            files: &files,
            jobs: &jobs,
        };
        self.submit_or_reuse(&ctx, intent).await
    }
}
