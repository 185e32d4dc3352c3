use std::fs;
use std::path::{Path, PathBuf};

use dendro_domain::{DendroResult, Job};
use tracing::info;

pub fn export_file_name(job: &Job) -> String {
    format!("dendro-job-{}.json", job.job_id)
}

/// 作业的完整 JSON，两空格缩进
pub fn export_job_json(job: &Job) -> DendroResult<String> {
    Ok(serde_json::to_string_pretty(job)?)
}

pub fn parse_exported_job(text: &str) -> DendroResult<Job> {
    Ok(serde_json::from_str(text)?)
}

/// 写入 `<dir>/dendro-job-<jobId>.json`，返回写入路径
pub fn write_job_export(dir: &Path, job: &Job) -> DendroResult<PathBuf> {
    let path = dir.join(export_file_name(job));
    let json = export_job_json(job)?;
    fs::write(&path, json)?;
    info!("作业 {} 已导出到 {}", job.job_id, path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dendro_domain::JobStatus;
    use dendro_testing_utils::JobBuilder;
    use serde_json::json;

    #[test]
    fn test_export_file_name() {
        let job = JobBuilder::new().with_id("abc123").build();
        assert_eq!(export_file_name(&job), "dendro-job-abc123.json");
    }

    #[test]
    fn test_export_uses_wire_field_names() {
        let job = JobBuilder::new()
            .with_id("abc123")
            .with_status(JobStatus::Completed)
            .build();
        let text = export_job_json(&job).unwrap();
        assert!(text.contains("\"jobId\": \"abc123\""));
        assert!(text.contains("\"status\": \"completed\""));
        assert!(text.starts_with("{\n  \""));
    }

    #[test]
    fn test_written_export_parses_back_to_same_job() {
        let mut job = JobBuilder::new()
            .with_id("j-42")
            .with_input("input", "rec.nwb")
            .with_parameter("detect_threshold", json!(5.123456789012345))
            .with_parameter("nested", json!({"a": [1, 2, {"b": null}]}))
            .build();
        job.timestamp_created = 1700000000.123456;
        job.console_output_url = Some("https://example.org/console.txt".to_string());

        let dir = tempfile::tempdir().unwrap();
        let path = write_job_export(dir.path(), &job).unwrap();
        assert_eq!(path.file_name().unwrap(), "dendro-job-j-42.json");

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(parse_exported_job(&text).unwrap(), job);
    }
}
