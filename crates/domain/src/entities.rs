use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ProcessorSpec;
use crate::value_objects::{dataset_ids_from_tags, JobStatus, RequiredResources, RunMethod};

pub const URL_CONTENT_PREFIX: &str = "url:";

/// 项目
///
/// 最近访问缓存保存的是完整快照，因此比较时需要逐字段相等。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_source_url: Option<String>,
    pub timestamp_created: f64,
    pub timestamp_modified: f64,
}

impl Project {
    pub fn dataset_ids(&self) -> Vec<String> {
        dataset_ids_from_tags(&self.tags)
    }
}

/// 项目内的文件
///
/// `content` 可能是字面值，也可能是 `url:<href>` 形式的间接引用。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DendroFile {
    pub project_id: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_created: Option<f64>,
}

impl DendroFile {
    /// 间接引用的外部 URL
    pub fn content_url(&self) -> Option<&str> {
        self.content.as_deref()?.strip_prefix(URL_CONTENT_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobInputFile {
    pub name: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,
}

impl JobInputFile {
    pub fn new<N: Into<String>, F: Into<String>>(name: N, file_name: F) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            is_folder: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobOutputFile {
    pub name: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_folder: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_cloud_upload: Option<bool>,
}

impl JobOutputFile {
    pub fn new<N: Into<String>, F: Into<String>>(name: N, file_name: F) -> Self {
        Self {
            name: name.into(),
            file_name: file_name.into(),
            is_folder: None,
            skip_cloud_upload: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobParameter {
    pub name: String,
    pub value: serde_json::Value,
}

impl JobParameter {
    pub fn new<N: Into<String>>(name: N, value: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 作业
///
/// 定义部分创建后不可变，只有 `status`、`error`、`console_output_url`
/// 和时间戳由远程执行器更新。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub project_id: String,
    pub user_id: String,
    pub compute_resource_id: String,
    pub processor_name: String,
    pub processor_spec: ProcessorSpec,
    pub input_files: Vec<JobInputFile>,
    pub output_files: Vec<JobOutputFile>,
    pub input_parameters: Vec<JobParameter>,
    pub required_resources: RequiredResources,
    pub run_method: RunMethod,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_output_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub timestamp_created: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_started: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_finished: Option<f64>,
}

impl Job {
    pub fn input_file(&self, name: &str) -> Option<&JobInputFile> {
        self.input_files.iter().find(|f| f.name == name)
    }

    pub fn output_file(&self, name: &str) -> Option<&JobOutputFile> {
        self.output_files.iter().find(|f| f.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&JobParameter> {
        self.input_parameters.iter().find(|p| p.name == name)
    }

    /// 已运行的秒数，未开始时为空；未结束时以 `now` 为终点
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> Option<f64> {
        let started = self.timestamp_started?;
        let end = self
            .timestamp_finished
            .unwrap_or_else(|| now.timestamp_millis() as f64 / 1000.0);
        Some((end - started).max(0.0))
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt((self.timestamp_created * 1000.0) as i64)
            .single()
    }

    /// 展示用的参数列表，secret 参数的值被遮盖
    pub fn display_parameters(&self) -> Vec<JobParameter> {
        let secrets = self.processor_spec.secret_parameter_names();
        self.input_parameters
            .iter()
            .map(|p| {
                if secrets.contains(&p.name) {
                    JobParameter::new(p.name.clone(), serde_json::Value::String("******".into()))
                } else {
                    p.clone()
                }
            })
            .collect()
    }
}

/// 尚未提交（或从已有作业派生）的作业定义
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobDefinition {
    pub processor_name: String,
    pub input_files: Vec<JobInputFile>,
    pub output_files: Vec<JobOutputFile>,
    pub input_parameters: Vec<JobParameter>,
}

impl JobDefinition {
    /// 从已有作业派生出可编辑/可展示的定义
    pub fn from_job(job: &Job) -> Self {
        Self {
            processor_name: job.processor_name.clone(),
            input_files: job
                .input_files
                .iter()
                .map(|f| JobInputFile {
                    name: f.name.clone(),
                    file_name: f.file_name.clone(),
                    is_folder: f.is_folder,
                })
                .collect(),
            output_files: job
                .output_files
                .iter()
                .map(|f| JobOutputFile {
                    name: f.name.clone(),
                    file_name: f.file_name.clone(),
                    is_folder: f.is_folder,
                    skip_cloud_upload: f.skip_cloud_upload,
                })
                .collect(),
            input_parameters: job.input_parameters.clone(),
        }
    }

    pub fn input_file(&self, name: &str) -> Option<&JobInputFile> {
        self.input_files.iter().find(|f| f.name == name)
    }

    pub fn parameter(&self, name: &str) -> Option<&JobParameter> {
        self.input_parameters.iter().find(|p| p.name == name)
    }
}
