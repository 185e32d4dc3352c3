//! Test data builders with sensible defaults

use dendro_domain::{
    ComputeResource, ComputeResourceApp, ComputeResourceSpec, DendroFile, Job, JobInputFile,
    JobOutputFile, JobParameter, JobStatus, ProcessorInputSpec, ProcessorOutputSpec,
    ProcessorParameterSpec, ProcessorSpec, Project, RequiredResources, RunMethod,
};

/// Builder for test Job entities
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new() -> Self {
        Self {
            job: Job {
                job_id: "job-1".to_string(),
                project_id: "project-1".to_string(),
                user_id: "test-user".to_string(),
                compute_resource_id: "cr-1".to_string(),
                processor_name: "test_processor".to_string(),
                processor_spec: ProcessorSpecBuilder::new("test_processor").build(),
                input_files: vec![],
                output_files: vec![],
                input_parameters: vec![],
                required_resources: RequiredResources::new(1, 0, 4.0, 3600.0),
                run_method: RunMethod::Local,
                status: JobStatus::Pending,
                error: None,
                console_output_url: None,
                batch_id: None,
                timestamp_created: 1_700_000_000.0,
                timestamp_started: None,
                timestamp_finished: None,
            },
        }
    }

    pub fn with_id(mut self, job_id: &str) -> Self {
        self.job.job_id = job_id.to_string();
        self
    }

    pub fn with_project_id(mut self, project_id: &str) -> Self {
        self.job.project_id = project_id.to_string();
        self
    }

    pub fn with_processor_name(mut self, name: &str) -> Self {
        self.job.processor_name = name.to_string();
        self.job.processor_spec.name = name.to_string();
        self
    }

    pub fn with_processor_spec(mut self, spec: ProcessorSpec) -> Self {
        self.job.processor_name = spec.name.clone();
        self.job.processor_spec = spec;
        self
    }

    pub fn with_input(mut self, name: &str, file_name: &str) -> Self {
        self.job.input_files.push(JobInputFile::new(name, file_name));
        self
    }

    pub fn with_output(mut self, name: &str, file_name: &str) -> Self {
        self.job.output_files.push(JobOutputFile::new(name, file_name));
        self
    }

    pub fn with_parameter(mut self, name: &str, value: serde_json::Value) -> Self {
        self.job.input_parameters.push(JobParameter::new(name, value));
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.job.status = status;
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.job.status = JobStatus::Failed;
        self.job.error = Some(error.to_string());
        self
    }

    pub fn with_console_output_url(mut self, url: &str) -> Self {
        self.job.console_output_url = Some(url.to_string());
        self
    }

    pub fn with_timestamps(mut self, started: Option<f64>, finished: Option<f64>) -> Self {
        self.job.timestamp_started = started;
        self.job.timestamp_finished = finished;
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

impl Default for JobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for test Project entities
pub struct ProjectBuilder {
    project: Project,
}

impl ProjectBuilder {
    pub fn new(project_id: &str) -> Self {
        Self {
            project: Project {
                project_id: project_id.to_string(),
                name: format!("Project {project_id}"),
                description: String::new(),
                tags: vec![],
                compute_resource_id: None,
                analysis_source_url: None,
                timestamp_created: 1_700_000_000.0,
                timestamp_modified: 1_700_000_000.0,
            },
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.project.name = name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.project.description = description.to_string();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.project.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_compute_resource_id(mut self, id: &str) -> Self {
        self.project.compute_resource_id = Some(id.to_string());
        self
    }

    pub fn with_analysis_source_url(mut self, url: &str) -> Self {
        self.project.analysis_source_url = Some(url.to_string());
        self
    }

    pub fn with_timestamp_modified(mut self, ts: f64) -> Self {
        self.project.timestamp_modified = ts;
        self
    }

    pub fn build(self) -> Project {
        self.project
    }
}

/// Builder for test ProcessorSpec values
pub struct ProcessorSpecBuilder {
    spec: ProcessorSpec,
}

impl ProcessorSpecBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            spec: ProcessorSpec {
                name: name.to_string(),
                description: String::new(),
                version: None,
                inputs: vec![],
                outputs: vec![],
                parameters: vec![],
                tags: vec![],
            },
        }
    }

    pub fn with_input(mut self, name: &str) -> Self {
        self.spec.inputs.push(ProcessorInputSpec {
            name: name.to_string(),
            description: String::new(),
            optional: None,
        });
        self
    }

    pub fn with_optional_input(mut self, name: &str) -> Self {
        self.spec.inputs.push(ProcessorInputSpec {
            name: name.to_string(),
            description: String::new(),
            optional: Some(true),
        });
        self
    }

    pub fn with_output(mut self, name: &str) -> Self {
        self.spec.outputs.push(ProcessorOutputSpec {
            name: name.to_string(),
            description: String::new(),
        });
        self
    }

    pub fn with_parameter(
        mut self,
        name: &str,
        param_type: &str,
        default: Option<serde_json::Value>,
    ) -> Self {
        self.spec.parameters.push(ProcessorParameterSpec {
            name: name.to_string(),
            description: String::new(),
            param_type: param_type.to_string(),
            default,
            secret: false,
            path_into_input: None,
        });
        self
    }

    pub fn with_secret_parameter(mut self, name: &str) -> Self {
        self.spec.parameters.push(ProcessorParameterSpec {
            name: name.to_string(),
            description: String::new(),
            param_type: "str".to_string(),
            default: None,
            secret: true,
            path_into_input: None,
        });
        self
    }

    /// A required string parameter holding a path inside the given input
    pub fn with_path_parameter(mut self, name: &str, input_name: &str) -> Self {
        self.spec.parameters.push(ProcessorParameterSpec {
            name: name.to_string(),
            description: String::new(),
            param_type: "str".to_string(),
            default: None,
            secret: false,
            path_into_input: Some(input_name.to_string()),
        });
        self
    }

    pub fn build(self) -> ProcessorSpec {
        self.spec
    }
}

/// The processor that produces spike sorting analysis files
pub fn spike_sorting_analysis_processor() -> ProcessorSpec {
    ProcessorSpecBuilder::new("create_spike_sorting_analysis")
        .with_input("recording")
        .with_input("sorting")
        .with_output("output")
        .with_path_parameter("electrical_series_path", "recording")
        .build()
}

/// Builder for test ComputeResource values
pub struct ComputeResourceBuilder {
    resource: ComputeResource,
}

impl ComputeResourceBuilder {
    pub fn new(compute_resource_id: &str) -> Self {
        Self {
            resource: ComputeResource {
                compute_resource_id: compute_resource_id.to_string(),
                name: format!("Compute resource {compute_resource_id}"),
                owner_id: None,
                spec: Some(ComputeResourceSpec {
                    apps: vec![],
                    default_job_run_method: Some(RunMethod::Local),
                }),
            },
        }
    }

    pub fn with_app(mut self, name: &str, processors: Vec<ProcessorSpec>) -> Self {
        let spec = self.resource.spec.get_or_insert(ComputeResourceSpec {
            apps: vec![],
            default_job_run_method: None,
        });
        spec.apps.push(ComputeResourceApp {
            name: name.to_string(),
            spec_uri: None,
            processors,
        });
        self
    }

    pub fn with_default_run_method(mut self, run_method: Option<RunMethod>) -> Self {
        if let Some(spec) = self.resource.spec.as_mut() {
            spec.default_job_run_method = run_method;
        }
        self
    }

    pub fn without_spec(mut self) -> Self {
        self.resource.spec = None;
        self
    }

    pub fn build(self) -> ComputeResource {
        self.resource
    }
}

pub fn test_file(project_id: &str, file_name: &str) -> DendroFile {
    DendroFile {
        project_id: project_id.to_string(),
        file_name: file_name.to_string(),
        size: Some(1024),
        content: Some(format!("url:https://example.org/{file_name}")),
        job_id: None,
        is_folder: None,
        timestamp_created: Some(1_700_000_000.0),
    }
}
