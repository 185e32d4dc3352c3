//! 作业意图
//!
//! 意图描述"想要什么计算"，由它给出处理器名称、绑定、比较字段和资源估计；
//! 编排器据此决定复用还是创建。

use dendro_domain::{
    is_electrical_series_path_parameter, BindingKind, DendroError, DendroFile, DendroResult, Job,
    JobStatus, RequiredResources,
};
use serde_json::Value;

use crate::builder::{JobBindings, DEFAULT_REQUIRED_RESOURCES};
use crate::resolver::MatchCriteria;

pub const SPIKE_SORTING_ANALYSIS_PROCESSOR: &str = "create_spike_sorting_analysis";
pub const SPIKE_SORTING_ANALYSIS_DIR: &str = ".spike_sorting_analysis";

pub trait JobIntent: Send + Sync {
    fn processor_name(&self) -> &str;
    fn bindings(&self) -> JobBindings;
    fn match_criteria(&self) -> MatchCriteria;
    fn required_resources(&self) -> RequiredResources {
        DEFAULT_REQUIRED_RESOURCES
    }
}

/// 通用意图，调用方直接给出全部内容
#[derive(Debug, Clone)]
pub struct GenericJobIntent {
    pub processor_name: String,
    pub bindings: JobBindings,
    pub criteria: MatchCriteria,
    pub required_resources: RequiredResources,
}

impl GenericJobIntent {
    pub fn new<S: Into<String>>(processor_name: S, bindings: JobBindings) -> Self {
        Self {
            processor_name: processor_name.into(),
            bindings,
            criteria: MatchCriteria::default(),
            required_resources: DEFAULT_REQUIRED_RESOURCES,
        }
    }

    /// 以全部输入槽和参数作为比较字段
    pub fn compare_all_bindings(mut self) -> Self {
        let mut criteria = MatchCriteria::new();
        for input in &self.bindings.input_files {
            criteria = criteria.with_input(input.name.clone());
        }
        for parameter in &self.bindings.parameters {
            criteria = criteria.with_parameter(parameter.name.clone());
        }
        self.criteria = criteria;
        self
    }

    pub fn with_criteria(mut self, criteria: MatchCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_required_resources(mut self, resources: RequiredResources) -> Self {
        self.required_resources = resources;
        self
    }
}

impl JobIntent for GenericJobIntent {
    fn processor_name(&self) -> &str {
        &self.processor_name
    }

    fn bindings(&self) -> JobBindings {
        self.bindings.clone()
    }

    fn match_criteria(&self) -> MatchCriteria {
        self.criteria.clone()
    }

    fn required_resources(&self) -> RequiredResources {
        self.required_resources
    }
}

/// "用这个记录文件分析这个分拣结果"
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeSortingAnalysisIntent {
    pub recording_file_name: String,
    pub sorting_file_name: String,
    pub electrical_series_path: Value,
}

impl SpikeSortingAnalysisIntent {
    pub fn new<R: Into<String>, S: Into<String>>(
        recording_file_name: R,
        sorting_file_name: S,
        electrical_series_path: Value,
    ) -> Self {
        Self {
            recording_file_name: recording_file_name.into(),
            sorting_file_name: sorting_file_name.into(),
            electrical_series_path,
        }
    }

    /// 从产生分拣文件的作业中取出记录文件和 electrical series 路径
    pub fn from_spike_sorting_job<S: Into<String>>(
        sorting_job: &Job,
        sorting_file_name: S,
    ) -> DendroResult<Self> {
        let recording = sorting_job
            .input_file("input")
            .ok_or_else(|| DendroError::missing_binding(BindingKind::Input, "input"))?;
        let es_path = sorting_job
            .input_parameters
            .iter()
            .find(|p| is_electrical_series_path_parameter(&p.name))
            .ok_or_else(|| {
                DendroError::missing_binding(BindingKind::Parameter, "electrical_series_path")
            })?;

        Ok(Self::new(
            recording.file_name.clone(),
            sorting_file_name,
            es_path.value.clone(),
        ))
    }

    pub fn output_file_name(&self) -> String {
        format!("{}/{}.nh5", SPIKE_SORTING_ANALYSIS_DIR, self.sorting_file_name)
    }
}

impl JobIntent for SpikeSortingAnalysisIntent {
    fn processor_name(&self) -> &str {
        SPIKE_SORTING_ANALYSIS_PROCESSOR
    }

    fn bindings(&self) -> JobBindings {
        JobBindings::new()
            .input("recording", self.recording_file_name.clone())
            .input("sorting", self.sorting_file_name.clone())
            .output("output", self.output_file_name())
            .parameter("electrical_series_path", self.electrical_series_path.clone())
    }

    fn match_criteria(&self) -> MatchCriteria {
        MatchCriteria::new()
            .with_input("recording")
            .with_input("sorting")
            .with_parameter("electrical_series_path")
    }

    fn required_resources(&self) -> RequiredResources {
        RequiredResources::new(4, 0, 8.0, 3600.0)
    }
}

/// 分析视图状态
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisViewStatus {
    /// 已有完成的分析作业；输出文件可能尚未出现在文件列表中
    Ready {
        job_id: String,
        output_file: Option<DendroFile>,
    },
    InProgress { job_id: String, status: JobStatus },
    Failed { job_id: String, error: Option<String> },
    ProcessorUnavailable,
    CanPrepare,
}

impl AnalysisViewStatus {
    /// 由复用判定得到的作业（若有）、处理器是否可用、项目文件列表得出状态
    pub fn classify(
        analysis_job: Option<&Job>,
        processor_available: bool,
        files: &[DendroFile],
    ) -> Self {
        let Some(job) = analysis_job else {
            return if processor_available {
                AnalysisViewStatus::CanPrepare
            } else {
                AnalysisViewStatus::ProcessorUnavailable
            };
        };

        match job.status {
            JobStatus::Completed => AnalysisViewStatus::Ready {
                job_id: job.job_id.clone(),
                output_file: job
                    .output_file("output")
                    .and_then(|o| files.iter().find(|f| f.file_name == o.file_name))
                    .cloned(),
            },
            JobStatus::Failed => AnalysisViewStatus::Failed {
                job_id: job.job_id.clone(),
                error: job.error.clone(),
            },
            status => AnalysisViewStatus::InProgress {
                job_id: job.job_id.clone(),
                status,
            },
        }
    }
}
