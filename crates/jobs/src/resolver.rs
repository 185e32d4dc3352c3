use dendro_domain::{Job, JobDefinition};
use tracing::debug;

/// 判定"同一计算"所比较的字段
///
/// 只比较这里列出的输入槽和参数；未列出的字段（输出文件名、资源、
/// 提交者、时间戳等）不参与判定。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchCriteria {
    pub input_slots: Vec<String>,
    pub parameter_names: Vec<String>,
}

impl MatchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<S: Into<String>>(mut self, slot: S) -> Self {
        self.input_slots.push(slot.into());
        self
    }

    pub fn with_parameter<S: Into<String>>(mut self, name: S) -> Self {
        self.parameter_names.push(name.into());
        self
    }

    /// 逐字段比较候选定义与已有作业
    ///
    /// 候选定义自身缺少某个比较字段时视为不匹配。
    pub fn matches(&self, candidate: &JobDefinition, job: &Job) -> bool {
        if job.processor_name != candidate.processor_name {
            return false;
        }

        for slot in &self.input_slots {
            let wanted = match candidate.input_file(slot) {
                Some(f) => &f.file_name,
                None => return false,
            };
            match job.input_file(slot) {
                Some(f) if &f.file_name == wanted => {}
                _ => return false,
            }
        }

        for name in &self.parameter_names {
            let wanted = match candidate.parameter(name) {
                Some(p) => &p.value,
                None => return false,
            };
            match job.parameter(name) {
                Some(p) if &p.value == wanted => {}
                _ => return false,
            }
        }

        true
    }
}

/// 作业标识解析器
///
/// 纯函数，无状态。按给定顺序线性扫描，返回第一个匹配的作业。
pub struct JobIdentityResolver;

impl JobIdentityResolver {
    pub fn resolve<'a>(
        criteria: &MatchCriteria,
        candidate: &JobDefinition,
        existing: &'a [Job],
    ) -> Option<&'a Job> {
        let found = existing.iter().find(|job| criteria.matches(candidate, job));
        match found {
            Some(job) => debug!(
                "找到等价作业 {} (processor={}, status={})",
                job.job_id, job.processor_name, job.status
            ),
            None => debug!(
                "未找到等价作业 (processor={}, 已检查 {} 个)",
                candidate.processor_name,
                existing.len()
            ),
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendro_testing_utils::JobBuilder;
    use dendro_domain::{JobInputFile, JobParameter};
    use serde_json::json;

    fn criteria() -> MatchCriteria {
        MatchCriteria::new()
            .with_input("recording")
            .with_input("sorting")
            .with_parameter("electrical_series_path")
    }

    fn candidate(es_path: &str) -> JobDefinition {
        JobDefinition {
            processor_name: "create_spike_sorting_analysis".to_string(),
            input_files: vec![
                JobInputFile::new("recording", "rec.nwb"),
                JobInputFile::new("sorting", "sort.nh5"),
            ],
            output_files: vec![],
            input_parameters: vec![JobParameter::new("electrical_series_path", json!(es_path))],
        }
    }

    fn existing(job_id: &str, es_path: &str) -> Job {
        JobBuilder::new()
            .with_id(job_id)
            .with_processor_name("create_spike_sorting_analysis")
            .with_input("recording", "rec.nwb")
            .with_input("sorting", "sort.nh5")
            .with_parameter("electrical_series_path", json!(es_path))
            .build()
    }

    #[test]
    fn test_resolve_finds_equivalent_job() {
        let jobs = vec![existing("A", "/es1")];
        let found = JobIdentityResolver::resolve(&criteria(), &candidate("/es1"), &jobs);
        assert_eq!(found.map(|j| j.job_id.as_str()), Some("A"));
    }

    #[test]
    fn test_resolve_never_reuses_on_parameter_difference() {
        let jobs = vec![existing("A", "/es1")];
        assert!(JobIdentityResolver::resolve(&criteria(), &candidate("/es2"), &jobs).is_none());
    }

    #[test]
    fn test_resolve_never_reuses_on_input_file_difference() {
        let jobs = vec![existing("A", "/es1")];

        let mut other_sorting = candidate("/es1");
        other_sorting.input_files[1] = JobInputFile::new("sorting", "sort2.nh5");
        assert!(JobIdentityResolver::resolve(&criteria(), &other_sorting, &jobs).is_none());

        let mut other_recording = candidate("/es1");
        other_recording.input_files[0] = JobInputFile::new("recording", "rec2.nwb");
        assert!(JobIdentityResolver::resolve(&criteria(), &other_recording, &jobs).is_none());
    }

    #[test]
    fn test_resolve_ignores_other_processors_and_uncompared_fields() {
        let mut other = existing("B", "/es1");
        other.processor_name = "mountainsort5".to_string();

        let mut renamed_output = existing("C", "/es1");
        renamed_output.output_files.clear();
        renamed_output.user_id = "someone-else".to_string();

        let jobs = vec![other, renamed_output];
        let found = JobIdentityResolver::resolve(&criteria(), &candidate("/es1"), &jobs);
        assert_eq!(found.map(|j| j.job_id.as_str()), Some("C"));
    }

    #[test]
    fn test_resolve_returns_first_of_duplicates_deterministically() {
        let jobs = vec![existing("first", "/es1"), existing("second", "/es1")];
        for _ in 0..3 {
            let found = JobIdentityResolver::resolve(&criteria(), &candidate("/es1"), &jobs);
            assert_eq!(found.map(|j| j.job_id.as_str()), Some("first"));
        }
    }

    #[test]
    fn test_missing_slot_is_not_a_match() {
        let mut job = existing("A", "/es1");
        job.input_files.retain(|f| f.name != "sorting");
        assert!(JobIdentityResolver::resolve(&criteria(), &candidate("/es1"), &[job]).is_none());

        let mut partial = candidate("/es1");
        partial.input_parameters.clear();
        let jobs = vec![existing("A", "/es1")];
        assert!(JobIdentityResolver::resolve(&criteria(), &partial, &jobs).is_none());
    }

    #[test]
    fn test_parameter_values_compare_structurally() {
        let criteria = MatchCriteria::new().with_parameter("channels");
        let mut def = candidate("/es1");
        def.input_parameters = vec![JobParameter::new("channels", json!([1, 2, 3]))];

        let same = JobBuilder::new()
            .with_processor_name("create_spike_sorting_analysis")
            .with_parameter("channels", json!([1, 2, 3]))
            .build();
        let reordered = JobBuilder::new()
            .with_processor_name("create_spike_sorting_analysis")
            .with_parameter("channels", json!([3, 2, 1]))
            .build();

        assert!(criteria.matches(&def, &same));
        assert!(!criteria.matches(&def, &reordered));
    }
}
