use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use dendro_config::AppConfig;
use dendro_domain::{DendroApi, Job, KeyValueStore, TabName};
use dendro_infrastructure::{HttpDendroApi, InMemoryStore, JsonFileStore};
use dendro_jobs::{
    write_job_export, AnalysisViewStatus, JobIdentityResolver, JobIntent,
    JobSubmissionOrchestrator, SpikeSortingAnalysisIntent, SubmissionContext, SubmissionOutcome,
};
use dendro_workspace::{
    ConsoleState, JobLoadState, JobPollingController, JobViewSnapshot, ProjectContext,
    RecentProjects, Route, WorkspaceTabs,
};
use tracing::{debug, info, warn};

/// 命令行使用的服务集合
pub struct Application {
    config: AppConfig,
    api: Arc<dyn DendroApi>,
    store: Arc<dyn KeyValueStore>,
}

impl Application {
    pub fn new(config: AppConfig, ephemeral: bool) -> Result<Self> {
        let api = HttpDendroApi::from_config(&config.api).context("创建 Dendro API 客户端失败")?;
        let store: Arc<dyn KeyValueStore> = if ephemeral {
            Arc::new(InMemoryStore::new())
        } else {
            Arc::new(JsonFileStore::in_dir(&config.storage.data_dir))
        };
        Ok(Self::with_parts(config, Arc::new(api), store))
    }

    pub fn with_parts(
        config: AppConfig,
        api: Arc<dyn DendroApi>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self { config, api, store }
    }

    fn recent_projects(&self) -> RecentProjects {
        RecentProjects::with_key(self.store.clone(), self.config.storage.recent_projects_key.clone())
    }

    async fn open_project(&self, project_id: &str) -> Result<ProjectContext> {
        let ctx = ProjectContext::load(
            self.api.clone(),
            project_id,
            self.config.project.default_compute_resource_id.clone(),
        )
        .await
        .with_context(|| format!("加载项目失败: {project_id}"))?;

        let route = Route::Project {
            project_id: project_id.to_string(),
        };
        if let Err(e) = self
            .recent_projects()
            .observe(&route, std::slice::from_ref(ctx.project()))
        {
            warn!("记录最近访问的项目失败: {}", e);
        }
        Ok(ctx)
    }

    /// 挂载作业视图并等待作业和控制台输出都加载完成
    pub async fn load_job_view(&self, job_id: &str) -> Result<JobViewSnapshot> {
        let controller = JobPollingController::new(self.api.clone());
        let mut updates = controller.subscribe();
        controller.attach(job_id);

        loop {
            {
                let snapshot = updates.borrow_and_update();
                let job_done = !matches!(snapshot.job, JobLoadState::Idle | JobLoadState::Loading);
                if job_done && snapshot.console != ConsoleState::Loading {
                    return Ok(snapshot.clone());
                }
            }
            updates.changed().await.context("作业视图已关闭")?;
        }
    }

    async fn load_job(&self, job_id: &str) -> Result<(Job, JobViewSnapshot)> {
        let snapshot = self.load_job_view(job_id).await?;
        match &snapshot.job {
            JobLoadState::Loaded(job) => Ok(((**job).clone(), snapshot)),
            JobLoadState::NotFound => bail!("作业未找到: {job_id}"),
            JobLoadState::Failed(message) => bail!("加载作业 {job_id} 失败: {message}"),
            JobLoadState::Idle | JobLoadState::Loading => bail!("作业 {job_id} 尚未加载"),
        }
    }

    pub async fn show_job(&self, job_id: &str) -> Result<()> {
        let (job, _) = self.load_job(job_id).await?;
        let mut tabs = WorkspaceTabs::new(self.config.workspace.max_tab_label_length);
        tabs.open(TabName::job(&job.job_id));

        println!("{}", tabs.label(&TabName::job(&job.job_id)));
        println!("  processor:  {}", job.processor_name);
        println!("  status:     {}", job.status);
        if let Some(error) = &job.error {
            println!("  error:      {error}");
        }
        println!("  run method: {}", job.run_method);
        if let Some(elapsed) = job.elapsed_seconds(Utc::now()) {
            println!("  elapsed:    {elapsed:.0}s");
        }
        for input in &job.input_files {
            println!("  input  {} = {}", input.name, input.file_name);
        }
        for output in &job.output_files {
            println!("  output {} = {}", output.name, output.file_name);
        }
        for parameter in job.display_parameters() {
            println!("  param  {} = {}", parameter.name, parameter.value);
        }
        Ok(())
    }

    pub async fn show_console(&self, job_id: &str) -> Result<()> {
        let (_, snapshot) = self.load_job(job_id).await?;
        match snapshot.console {
            ConsoleState::Loaded(text) => print!("{text}"),
            ConsoleState::Absent => println!("作业 {job_id} 没有控制台输出"),
            _ => println!("无法获取作业 {job_id} 的控制台输出"),
        }
        Ok(())
    }

    pub async fn export_job(&self, job_id: &str, dir: &Path) -> Result<()> {
        let (job, _) = self.load_job(job_id).await?;
        let path = write_job_export(dir, &job)
            .with_context(|| format!("导出作业失败: {job_id}"))?;
        println!("{}", path.display());
        Ok(())
    }

    /// 为分拣文件准备分析：已有等价作业则复用，否则提交新作业
    pub async fn prepare_analysis(
        &self,
        project_id: &str,
        sorting_file_name: &str,
        submit: bool,
    ) -> Result<()> {
        let mut ctx = self.open_project(project_id).await?;
        let sorting_file = ctx.file(sorting_file_name)?;
        let Some(sorting_job_id) = sorting_file.job_id.clone() else {
            bail!("文件 {sorting_file_name} 不是由作业生成的");
        };
        let sorting_job = ctx.job(&sorting_job_id)?.clone();
        let intent = SpikeSortingAnalysisIntent::from_spike_sorting_job(&sorting_job, sorting_file_name)?;

        let compute_resource = ctx.fetch_compute_resource().await?;
        let processor_available = compute_resource
            .find_processor(intent.processor_name())
            .is_some();

        // 先只读判定，不做任何修改
        let bindings = intent.bindings();
        let candidate = dendro_domain::JobDefinition {
            processor_name: intent.processor_name().to_string(),
            input_files: bindings.input_files,
            output_files: bindings.output_files,
            input_parameters: bindings.parameters,
        };
        let existing =
            JobIdentityResolver::resolve(&intent.match_criteria(), &candidate, ctx.jobs());
        let status = AnalysisViewStatus::classify(existing, processor_available, ctx.files());
        debug!("分析视图状态: {:?}", status);

        match status {
            AnalysisViewStatus::CanPrepare if submit => {}
            AnalysisViewStatus::CanPrepare => {
                println!("尚无分析作业，使用 --submit 提交");
                return Ok(());
            }
            AnalysisViewStatus::ProcessorUnavailable => {
                println!("计算资源 {} 未提供处理器 {}", compute_resource.compute_resource_id, intent.processor_name());
                return Ok(());
            }
            AnalysisViewStatus::Ready { job_id, output_file } => {
                println!("分析已完成 (job:{job_id})");
                if let Some(url) = output_file.as_ref().and_then(|f| f.content_url()) {
                    println!("{url}");
                }
                return Ok(());
            }
            AnalysisViewStatus::InProgress { job_id, status } => {
                println!("分析作业 job:{job_id} 进行中: {status}");
                return Ok(());
            }
            AnalysisViewStatus::Failed { job_id, error } => {
                println!("分析作业 job:{job_id} 失败: {}", error.unwrap_or_default());
                return Ok(());
            }
        }

        let orchestrator = JobSubmissionOrchestrator::new(self.api.clone());
        let submission = SubmissionContext {
            project_id: ctx.project_id(),
            compute_resource: &compute_resource,
            files: ctx.files(),
            jobs: ctx.jobs(),
        };
        let outcome = orchestrator.submit_or_reuse(&submission, &intent).await?;
        match &outcome {
            SubmissionOutcome::Reused(job) => println!("复用已有作业 job:{}", job.job_id),
            SubmissionOutcome::Created(job) => {
                info!("已提交分析作业 {}", job.job_id);
                println!("已提交作业 job:{}", job.job_id);
            }
        }
        ctx.refresh_jobs().await?;
        Ok(())
    }

    pub fn list_recent(&self, accessible: Option<Vec<String>>) -> Result<()> {
        let recent = self.recent_projects();
        let projects = match accessible {
            Some(ids) => recent.list(&ids),
            None => recent.entries(),
        };
        if projects.is_empty() {
            println!("没有最近访问的项目");
        }
        for project in projects {
            println!("{}\t{}", project.project_id, project.name);
        }
        Ok(())
    }

    pub async fn set_description(&self, project_id: &str, description: &str) -> Result<()> {
        let mut ctx = self.open_project(project_id).await?;
        ctx.set_description(description).await?;
        println!("{}", ctx.project().description);
        Ok(())
    }

    pub async fn set_analysis_url(&self, project_id: &str, url: &str) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("分析源地址必须是 http(s) URL: {url}");
        }
        let mut ctx = self.open_project(project_id).await?;
        ctx.set_analysis_source_url(url).await?;
        println!("{}", ctx.project().analysis_source_url.as_deref().unwrap_or_default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendro_testing_utils::{
        spike_sorting_analysis_processor, test_file, ComputeResourceBuilder, JobBuilder,
        MockDendroApi, ProjectBuilder,
    };
    use serde_json::json;

    fn spike_sorting_project() -> MockDendroApi {
        let sorting_job = JobBuilder::new()
            .with_id("sort-job")
            .with_project_id("p1")
            .with_processor_name("mountainsort5")
            .with_input("input", "rec.nwb")
            .with_output("output", "sort.nh5")
            .with_parameter("electrical_series_path", json!("/acquisition/ElectricalSeries"))
            .build();
        let mut sorting_file = test_file("p1", "sort.nh5");
        sorting_file.job_id = Some("sort-job".to_string());

        MockDendroApi::new()
            .with_project(ProjectBuilder::new("p1").with_compute_resource_id("cr-1").build())
            .with_compute_resource(
                ComputeResourceBuilder::new("cr-1")
                    .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
                    .build(),
            )
            .with_files("p1", vec![test_file("p1", "rec.nwb"), sorting_file])
            .with_jobs(vec![sorting_job])
    }

    fn application(api: &MockDendroApi) -> (Application, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let app = Application::with_parts(AppConfig::default(), Arc::new(api.clone()), store.clone());
        (app, store)
    }

    #[tokio::test]
    async fn test_prepare_analysis_submits_once() {
        let api = spike_sorting_project();
        let (app, _) = application(&api);

        app.prepare_analysis("p1", "sort.nh5", false).await.unwrap();
        assert_eq!(api.create_job_calls(), 0);

        app.prepare_analysis("p1", "sort.nh5", true).await.unwrap();
        assert_eq!(api.create_job_calls(), 1);
        let request = &api.created_requests()[0];
        assert_eq!(
            request.job_definition.parameter("electrical_series_path").map(|p| &p.value),
            Some(&json!("/acquisition/ElectricalSeries"))
        );

        // 已有进行中的分析作业，不再重复提交
        app.prepare_analysis("p1", "sort.nh5", true).await.unwrap();
        assert_eq!(api.create_job_calls(), 1);
    }

    #[tokio::test]
    async fn test_opening_project_records_recent_entry() {
        let api = spike_sorting_project();
        let (app, store) = application(&api);

        app.set_description("p1", "updated").await.unwrap();

        let recent = RecentProjects::new(store);
        let ids: Vec<String> = recent.entries().into_iter().map(|p| p.project_id).collect();
        assert_eq!(ids, vec!["p1".to_string()]);
        assert_eq!(api.project("p1").unwrap().description, "updated");
    }

    #[tokio::test]
    async fn test_corrupt_store_file_does_not_block_project_commands() {
        let api = spike_sorting_project();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = Arc::new(JsonFileStore::new(&path));
        let app = Application::with_parts(AppConfig::default(), Arc::new(api.clone()), store.clone());

        app.set_description("p1", "x").await.unwrap();
        app.set_description("p1", "y").await.unwrap();

        assert_eq!(api.project("p1").unwrap().description, "y");
        let recent = RecentProjects::new(store);
        let entries = recent.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].project_id, "p1");
    }

    #[tokio::test]
    async fn test_recency_write_failure_is_not_fatal() {
        let api = spike_sorting_project();
        let store = dendro_testing_utils::MockKeyValueStore::new();
        store.set_fail_writes(true);
        let app = Application::with_parts(AppConfig::default(), Arc::new(api.clone()), Arc::new(store));

        app.set_analysis_url("p1", "https://example.org/analysis").await.unwrap();
        assert_eq!(
            api.project("p1").unwrap().analysis_source_url.as_deref(),
            Some("https://example.org/analysis")
        );
    }

    #[tokio::test]
    async fn test_prepare_analysis_rejects_unknown_file() {
        let api = spike_sorting_project();
        let (app, _) = application(&api);

        let err = app.prepare_analysis("p1", "missing.nh5", true).await.unwrap_err();
        assert!(err.downcast_ref::<dendro_domain::DendroError>().is_some());
        assert_eq!(api.create_job_calls(), 0);
    }

    #[tokio::test]
    async fn test_load_job_view_waits_for_console() {
        let api = MockDendroApi::new()
            .with_jobs(vec![JobBuilder::new()
                .with_id("j1")
                .with_console_output_url("https://example.org/c.txt")
                .build()])
            .with_text("https://example.org/c.txt", "done\n");
        let (app, _) = application(&api);

        let snapshot = app.load_job_view("j1").await.unwrap();
        assert!(snapshot.loaded_job().is_some());
        assert_eq!(snapshot.console, ConsoleState::Loaded("done\n".to_string()));

        assert!(app.load_job("ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_export_job_writes_json_file() {
        let api = MockDendroApi::new().with_jobs(vec![JobBuilder::new().with_id("j9").build()]);
        let (app, _) = application(&api);
        let dir = tempfile::tempdir().unwrap();

        app.export_job("j9", dir.path()).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join("dendro-job-j9.json")).unwrap();
        let exported = dendro_jobs::parse_exported_job(&text).unwrap();
        assert_eq!(exported.job_id, "j9");
    }
}
