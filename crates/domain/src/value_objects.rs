use std::fmt;
use std::str::FromStr;

use dendro_errors::DendroError;
use serde::{Deserialize, Serialize};

/// 作业的执行后端
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RunMethod {
    Local,
    AwsBatch,
    Slurm,
}

impl fmt::Display for RunMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMethod::Local => write!(f, "local"),
            RunMethod::AwsBatch => write!(f, "aws_batch"),
            RunMethod::Slurm => write!(f, "slurm"),
        }
    }
}

/// 作业状态
///
/// 只有远程执行器会修改作业状态，客户端只读。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Queued,
    Starting,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            JobStatus::Pending | JobStatus::Queued | JobStatus::Starting | JobStatus::Running
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Queued => "queued",
            JobStatus::Starting => "starting",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// 作业所需资源
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RequiredResources {
    pub num_cpus: u32,
    pub num_gpus: u32,
    pub memory_gb: f64,
    pub time_sec: f64,
}

impl RequiredResources {
    pub fn new(num_cpus: u32, num_gpus: u32, memory_gb: f64, time_sec: f64) -> Self {
        Self {
            num_cpus,
            num_gpus,
            memory_gb,
            time_sec,
        }
    }
}

pub const FILE_TAB_PREFIX: &str = "file:";
pub const JOB_TAB_PREFIX: &str = "job:";

/// 工作区标签页名称
///
/// 文本形式为 `file:<fileName>` 或 `job:<jobId>`，同时作为标签页的唯一标识。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TabName {
    File(String),
    Job(String),
}

impl TabName {
    pub fn file<S: Into<String>>(file_name: S) -> Self {
        TabName::File(file_name.into())
    }

    pub fn job<S: Into<String>>(job_id: S) -> Self {
        TabName::Job(job_id.into())
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            TabName::File(name) => Some(name),
            TabName::Job(_) => None,
        }
    }

    pub fn job_id(&self) -> Option<&str> {
        match self {
            TabName::Job(id) => Some(id),
            TabName::File(_) => None,
        }
    }
}

impl fmt::Display for TabName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TabName::File(name) => write!(f, "{FILE_TAB_PREFIX}{name}"),
            TabName::Job(id) => write!(f, "{JOB_TAB_PREFIX}{id}"),
        }
    }
}

impl FromStr for TabName {
    type Err = DendroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(name) = s.strip_prefix(FILE_TAB_PREFIX) {
            Ok(TabName::File(name.to_string()))
        } else if let Some(id) = s.strip_prefix(JOB_TAB_PREFIX) {
            Ok(TabName::Job(id.to_string()))
        } else {
            Err(DendroError::InvalidTabName(s.to_string()))
        }
    }
}

/// 按扩展名推断的文件类别，用于标签页图标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Nwb,
    Nh5,
    Python,
    Json,
    Text,
    Other,
}

impl FileKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let base = file_name.rsplit('/').next().unwrap_or(file_name);
        let ext = match base.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
            _ => return FileKind::Other,
        };
        match ext.as_str() {
            "nwb" => FileKind::Nwb,
            "nh5" => FileKind::Nh5,
            "py" => FileKind::Python,
            "json" => FileKind::Json,
            "md" | "txt" => FileKind::Text,
            _ => FileKind::Other,
        }
    }
}

pub const DATASET_TAG_PREFIX: &str = "dataset.";
pub const DATASET_STAGING_TAG_PREFIX: &str = "dataset-staging.";

/// 关联的外部数据集
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetRef {
    Published(String),
    Staging(String),
}

impl DatasetRef {
    pub fn parse_tag(tag: &str) -> Option<Self> {
        if let Some(id) = tag.strip_prefix(DATASET_TAG_PREFIX) {
            Some(DatasetRef::Published(id.to_string()))
        } else {
            tag.strip_prefix(DATASET_STAGING_TAG_PREFIX)
                .map(|id| DatasetRef::Staging(id.to_string()))
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DatasetRef::Published(id) | DatasetRef::Staging(id) => id,
        }
    }
}

/// 从项目标签中提取数据集 ID，保留原有顺序
pub fn dataset_ids_from_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| DatasetRef::parse_tag(tag))
        .map(|d| d.id().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_name_parse_and_display() {
        let tab: TabName = "file:recordings/rec.nwb".parse().unwrap();
        assert_eq!(tab, TabName::file("recordings/rec.nwb"));
        assert_eq!(tab.to_string(), "file:recordings/rec.nwb");

        let tab: TabName = "job:abc123".parse().unwrap();
        assert_eq!(tab.job_id(), Some("abc123"));
        assert_eq!(tab.file_name(), None);

        assert!("project-home".parse::<TabName>().is_err());
    }

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_file_name("imported/rec.nwb"), FileKind::Nwb);
        assert_eq!(
            FileKind::from_file_name(".spike_sorting_analysis/sort.nh5"),
            FileKind::Nh5
        );
        assert_eq!(FileKind::from_file_name("scripts/run.PY"), FileKind::Python);
        assert_eq!(FileKind::from_file_name("README.md"), FileKind::Text);
        assert_eq!(FileKind::from_file_name("Makefile"), FileKind::Other);
        assert_eq!(FileKind::from_file_name(".hidden"), FileKind::Other);
    }

    #[test]
    fn test_dataset_ids_from_tags() {
        let tags = vec![
            "dataset.000409".to_string(),
            "ephys".to_string(),
            "dataset-staging.200001".to_string(),
        ];
        assert_eq!(dataset_ids_from_tags(&tags), vec!["000409", "200001"]);
        assert_eq!(
            DatasetRef::parse_tag("dataset-staging.200001"),
            Some(DatasetRef::Staging("200001".to_string()))
        );
    }

    #[test]
    fn test_job_status_serde() {
        let status: JobStatus = serde_json::from_str("\"running\"").unwrap();
        assert_eq!(status, JobStatus::Running);
        assert!(status.is_in_progress());
        assert!(JobStatus::Failed.is_terminal());

        let method: RunMethod = serde_json::from_str("\"aws_batch\"").unwrap();
        assert_eq!(method, RunMethod::AwsBatch);
        assert_eq!(serde_json::to_string(&RunMethod::Slurm).unwrap(), "\"slurm\"");
    }
}
