//! Mock implementations of the remote service and local storage traits
//!
//! Every mock keeps its state behind `Arc<Mutex<_>>` so clones share state:
//! a test can hand one clone to the code under test and inspect another.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dendro_domain::{
    ComputeResource, CreateJobRequest, DendroApi, DendroFile, Job, JobStatus, KeyValueStore,
    Project,
};
use dendro_errors::{DendroError, DendroResult};

#[derive(Default)]
struct ApiState {
    projects: HashMap<String, Project>,
    files: HashMap<String, Vec<DendroFile>>,
    jobs: Vec<Job>,
    compute_resources: HashMap<String, ComputeResource>,
    texts: HashMap<String, String>,
    create_failure: Option<String>,
    fetch_job_failure: Option<String>,
    job_fetch_delays: VecDeque<Duration>,
    text_fetch_delays: VecDeque<Duration>,
    next_job_number: u64,
    create_job_calls: usize,
    fetch_job_calls: usize,
    fetch_jobs_calls: usize,
    fetch_text_calls: usize,
    fetch_project_calls: usize,
    created_requests: Vec<CreateJobRequest>,
}

/// In-memory stand-in for the remote Dendro service
#[derive(Clone, Default)]
pub struct MockDendroApi {
    state: Arc<Mutex<ApiState>>,
}

impl MockDendroApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(self, project: Project) -> Self {
        self.set_project(project);
        self
    }

    pub fn with_compute_resource(self, compute_resource: ComputeResource) -> Self {
        self.state
            .lock()
            .unwrap()
            .compute_resources
            .insert(compute_resource.compute_resource_id.clone(), compute_resource);
        self
    }

    pub fn with_files(self, project_id: &str, files: Vec<DendroFile>) -> Self {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(project_id.to_string(), files);
        self
    }

    /// Jobs are returned in the order they were added
    pub fn with_jobs(self, jobs: Vec<Job>) -> Self {
        self.state.lock().unwrap().jobs.extend(jobs);
        self
    }

    pub fn with_text(self, url: &str, text: &str) -> Self {
        self.set_text(url, text);
        self
    }

    pub fn set_project(&self, project: Project) {
        self.state
            .lock()
            .unwrap()
            .projects
            .insert(project.project_id.clone(), project);
    }

    /// Insert or replace a job by id
    pub fn set_job(&self, job: Job) {
        let mut state = self.state.lock().unwrap();
        match state.jobs.iter_mut().find(|j| j.job_id == job.job_id) {
            Some(existing) => *existing = job,
            None => state.jobs.push(job),
        }
    }

    pub fn set_text(&self, url: &str, text: &str) {
        self.state
            .lock()
            .unwrap()
            .texts
            .insert(url.to_string(), text.to_string());
    }

    /// Make every subsequent `create_job` fail with a submission error
    pub fn fail_create_job(&self, message: &str) {
        self.state.lock().unwrap().create_failure = Some(message.to_string());
    }

    pub fn fail_fetch_job(&self, message: Option<&str>) {
        self.state.lock().unwrap().fetch_job_failure = message.map(str::to_string);
    }

    /// Delay applied to the next `fetch_job` call; queued delays are consumed in order
    pub fn push_job_fetch_delay(&self, delay: Duration) {
        self.state.lock().unwrap().job_fetch_delays.push_back(delay);
    }

    pub fn push_text_fetch_delay(&self, delay: Duration) {
        self.state.lock().unwrap().text_fetch_delays.push_back(delay);
    }

    pub fn create_job_calls(&self) -> usize {
        self.state.lock().unwrap().create_job_calls
    }

    pub fn fetch_job_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_job_calls
    }

    pub fn fetch_jobs_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_jobs_calls
    }

    pub fn fetch_text_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_text_calls
    }

    pub fn fetch_project_calls(&self) -> usize {
        self.state.lock().unwrap().fetch_project_calls
    }

    pub fn created_requests(&self) -> Vec<CreateJobRequest> {
        self.state.lock().unwrap().created_requests.clone()
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.state.lock().unwrap().jobs.clone()
    }

    pub fn project(&self, project_id: &str) -> Option<Project> {
        self.state.lock().unwrap().projects.get(project_id).cloned()
    }
}

async fn apply_delay(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl DendroApi for MockDendroApi {
    async fn fetch_project(&self, project_id: &str) -> DendroResult<Project> {
        let mut state = self.state.lock().unwrap();
        state.fetch_project_calls += 1;
        state
            .projects
            .get(project_id)
            .cloned()
            .ok_or_else(|| DendroError::project_not_found(project_id))
    }

    async fn fetch_project_files(&self, project_id: &str) -> DendroResult<Vec<DendroFile>> {
        let state = self.state.lock().unwrap();
        Ok(state.files.get(project_id).cloned().unwrap_or_default())
    }

    async fn fetch_jobs_for_project(&self, project_id: &str) -> DendroResult<Vec<Job>> {
        let mut state = self.state.lock().unwrap();
        state.fetch_jobs_calls += 1;
        Ok(state
            .jobs
            .iter()
            .filter(|j| j.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn fetch_job(&self, job_id: &str) -> DendroResult<Job> {
        // Snapshot at call time, then wait: a slow call returns the state it saw
        let (result, delay) = {
            let mut state = self.state.lock().unwrap();
            state.fetch_job_calls += 1;
            let delay = state.job_fetch_delays.pop_front();
            let result = match &state.fetch_job_failure {
                Some(message) => Err(DendroError::network_error(message.clone())),
                None => state
                    .jobs
                    .iter()
                    .find(|j| j.job_id == job_id)
                    .cloned()
                    .ok_or_else(|| DendroError::job_not_found(job_id)),
            };
            (result, delay)
        };
        apply_delay(delay).await;
        result
    }

    async fn create_job(&self, request: &CreateJobRequest) -> DendroResult<Job> {
        let mut state = self.state.lock().unwrap();
        state.create_job_calls += 1;
        state.created_requests.push(request.clone());
        if let Some(message) = &state.create_failure {
            return Err(DendroError::submission_error(message.clone()));
        }

        state.next_job_number += 1;
        let compute_resource_id = state
            .projects
            .get(&request.project_id)
            .and_then(|p| p.compute_resource_id.clone())
            .unwrap_or_default();
        let definition = &request.job_definition;
        let job = Job {
            job_id: format!("created-job-{}", state.next_job_number),
            project_id: request.project_id.clone(),
            user_id: "test-user".to_string(),
            compute_resource_id,
            processor_name: definition.processor_name.clone(),
            processor_spec: request.processor_spec.clone(),
            input_files: definition.input_files.clone(),
            output_files: definition.output_files.clone(),
            input_parameters: definition.input_parameters.clone(),
            required_resources: request.required_resources,
            run_method: request.run_method,
            status: JobStatus::Pending,
            error: None,
            console_output_url: None,
            batch_id: request.batch_id.clone(),
            timestamp_created: 1_700_000_000.0 + state.next_job_number as f64,
            timestamp_started: None,
            timestamp_finished: None,
        };
        state.jobs.push(job.clone());
        Ok(job)
    }

    async fn fetch_compute_resource(&self, compute_resource_id: &str) -> DendroResult<ComputeResource> {
        let state = self.state.lock().unwrap();
        state
            .compute_resources
            .get(compute_resource_id)
            .cloned()
            .ok_or_else(|| DendroError::compute_resource_not_found(compute_resource_id))
    }

    async fn fetch_text(&self, url: &str) -> Option<String> {
        let (text, delay) = {
            let mut state = self.state.lock().unwrap();
            state.fetch_text_calls += 1;
            (state.texts.get(url).cloned(), state.text_fetch_delays.pop_front())
        };
        apply_delay(delay).await;
        text
    }

    async fn set_project_description(&self, project_id: &str, description: &str) -> DendroResult<()> {
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .get_mut(project_id)
            .ok_or_else(|| DendroError::project_not_found(project_id))?;
        project.description = description.to_string();
        project.timestamp_modified += 1.0;
        Ok(())
    }

    async fn set_project_analysis_source_url(
        &self,
        project_id: &str,
        analysis_source_url: &str,
    ) -> DendroResult<()> {
        let mut state = self.state.lock().unwrap();
        let project = state
            .projects
            .get_mut(project_id)
            .ok_or_else(|| DendroError::project_not_found(project_id))?;
        project.analysis_source_url = Some(analysis_source_url.to_string());
        project.timestamp_modified += 1.0;
        Ok(())
    }
}

/// In-memory key-value store with optional read and write failures
#[derive(Clone, Default)]
pub struct MockKeyValueStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<Mutex<bool>>,
    fail_writes: Arc<Mutex<bool>>,
    writes: Arc<Mutex<usize>>,
}

impl MockKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    /// Reads fail until the next `remove`, like an unreadable backing record
    pub fn set_fail_reads(&self, fail: bool) {
        *self.fail_reads.lock().unwrap() = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    /// Number of successful `set` calls
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl KeyValueStore for MockKeyValueStore {
    fn get(&self, key: &str) -> DendroResult<Option<String>> {
        if *self.fail_reads.lock().unwrap() {
            return Err(DendroError::storage_error("mock read failure"));
        }
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DendroResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(DendroError::storage_error("mock write failure"));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> DendroResult<()> {
        *self.fail_reads.lock().unwrap() = false;
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}
