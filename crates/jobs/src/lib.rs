//! 作业标识与编排
//!
//! - [`builder`]: 由处理器规格和绑定构造规范的作业定义
//! - [`resolver`]: 在已有作业中查找语义等价的作业，避免重复的昂贵计算
//! - [`orchestrator`]: 组合以上两者，决定复用还是创建
//! - [`intents`]: 高层意图（例如"用这个记录分析这个分拣结果"）
//! - [`export`]: 作业 JSON 导出

pub mod builder;
pub mod export;
pub mod intents;
pub mod orchestrator;
pub mod resolver;

pub use builder::{BuiltJob, JobBindings, JobDefinitionBuilder, DEFAULT_REQUIRED_RESOURCES};
pub use export::{export_file_name, export_job_json, parse_exported_job, write_job_export};
pub use intents::{
    AnalysisViewStatus, GenericJobIntent, JobIntent, SpikeSortingAnalysisIntent,
    SPIKE_SORTING_ANALYSIS_PROCESSOR,
};
pub use orchestrator::{JobSubmissionOrchestrator, SubmissionContext, SubmissionOutcome};
pub use resolver::{JobIdentityResolver, MatchCriteria};
