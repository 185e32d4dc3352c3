use std::sync::Arc;

use dendro_domain::{DendroError, JobStatus, RunMethod};
use dendro_jobs::{
    GenericJobIntent, JobBindings, JobSubmissionOrchestrator, SpikeSortingAnalysisIntent,
    SubmissionContext, SubmissionOutcome,
};
use dendro_testing_utils::{
    spike_sorting_analysis_processor, test_file, ComputeResourceBuilder, JobBuilder,
    MockDendroApi, ProjectBuilder,
};
use serde_json::json;

fn existing_analysis(job_id: &str, es_path: &str) -> dendro_domain::Job {
    JobBuilder::new()
        .with_id(job_id)
        .with_project_id("p1")
        .with_processor_spec(spike_sorting_analysis_processor())
        .with_input("recording", "rec.nwb")
        .with_input("sorting", "sort.nh5")
        .with_output("output", ".spike_sorting_analysis/sort.nh5.nh5")
        .with_parameter("electrical_series_path", json!(es_path))
        .with_status(JobStatus::Completed)
        .build()
}

fn intent(es_path: &str) -> SpikeSortingAnalysisIntent {
    SpikeSortingAnalysisIntent::new("rec.nwb", "sort.nh5", json!(es_path))
}

#[tokio::test]
async fn test_equivalent_job_is_reused_without_create() {
    let api = MockDendroApi::new();
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));
    let resource = ComputeResourceBuilder::new("cr-1")
        .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
        .build();
    let jobs = vec![existing_analysis("A", "/es1")];
    let ctx = SubmissionContext {
        project_id: "p1",
        compute_resource: &resource,
        files: &[],
        jobs: &jobs,
    };

    let outcome = orchestrator.submit_or_reuse(&ctx, &intent("/es1")).await.unwrap();

    assert!(outcome.is_reused());
    assert_eq!(outcome.job().job_id, "A");
    assert_eq!(api.create_job_calls(), 0);
}

#[tokio::test]
async fn test_different_parameter_creates_new_job() {
    let api = MockDendroApi::new();
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));
    let resource = ComputeResourceBuilder::new("cr-1")
        .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
        .with_default_run_method(Some(RunMethod::AwsBatch))
        .build();
    let jobs = vec![existing_analysis("A", "/es1")];
    let files = vec![test_file("p1", "rec.nwb"), test_file("p1", "sort.nh5")];
    let ctx = SubmissionContext {
        project_id: "p1",
        compute_resource: &resource,
        files: &files,
        jobs: &jobs,
    };

    let outcome = orchestrator.submit_or_reuse(&ctx, &intent("/es2")).await.unwrap();

    let job = match outcome {
        SubmissionOutcome::Created(job) => job,
        other => panic!("expected a created job, got {other:?}"),
    };
    assert_ne!(job.job_id, "A");
    assert_eq!(api.create_job_calls(), 1);

    let request = &api.created_requests()[0];
    assert_eq!(request.run_method, RunMethod::AwsBatch);
    assert_eq!(request.files.len(), 2);
    assert_eq!(request.required_resources.num_cpus, 4);
    assert_eq!(request.required_resources.memory_gb, 8.0);
    assert_eq!(
        request.job_definition.parameter("electrical_series_path").unwrap().value,
        json!("/es2")
    );
    assert_eq!(
        request.job_definition.output_files[0].file_name,
        ".spike_sorting_analysis/sort.nh5.nh5"
    );
}

#[tokio::test]
async fn test_different_input_file_creates_new_job() {
    let api = MockDendroApi::new();
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));
    let resource = ComputeResourceBuilder::new("cr-1")
        .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
        .build();
    let jobs = vec![existing_analysis("A", "/es1")];
    let ctx = SubmissionContext {
        project_id: "p1",
        compute_resource: &resource,
        files: &[],
        jobs: &jobs,
    };

    let other_sorting = SpikeSortingAnalysisIntent::new("rec.nwb", "sort2.nh5", json!("/es1"));
    let outcome = orchestrator.submit_or_reuse(&ctx, &other_sorting).await.unwrap();
    assert!(!outcome.is_reused());
    assert_eq!(api.create_job_calls(), 1);
    assert_eq!(
        api.created_requests()[0].job_definition.input_file("sorting").unwrap().file_name,
        "sort2.nh5"
    );

    let other_recording = SpikeSortingAnalysisIntent::new("rec2.nwb", "sort.nh5", json!("/es1"));
    let outcome = orchestrator.submit_or_reuse(&ctx, &other_recording).await.unwrap();
    assert!(!outcome.is_reused());
    assert_eq!(api.create_job_calls(), 2);
    assert_eq!(
        api.created_requests()[1].job_definition.input_file("recording").unwrap().file_name,
        "rec2.nwb"
    );
}

#[tokio::test]
async fn test_missing_run_method_blocks_create_before_network() {
    let api = MockDendroApi::new();
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));
    let resource = ComputeResourceBuilder::new("cr-1")
        .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
        .with_default_run_method(None)
        .build();
    let ctx = SubmissionContext {
        project_id: "p1",
        compute_resource: &resource,
        files: &[],
        jobs: &[],
    };

    let err = orchestrator.submit_or_reuse(&ctx, &intent("/es1")).await.unwrap_err();
    assert!(matches!(err, DendroError::Configuration(_)));
    assert_eq!(api.create_job_calls(), 0);

    // 复用不需要运行方式
    let jobs = vec![existing_analysis("A", "/es1")];
    let ctx = SubmissionContext { jobs: &jobs, ..ctx };
    let outcome = orchestrator.submit_or_reuse(&ctx, &intent("/es1")).await.unwrap();
    assert!(outcome.is_reused());
}

#[tokio::test]
async fn test_unknown_processor_and_missing_bindings() {
    let api = MockDendroApi::new();
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));
    let resource = ComputeResourceBuilder::new("cr-1").build();
    let ctx = SubmissionContext {
        project_id: "p1",
        compute_resource: &resource,
        files: &[],
        jobs: &[],
    };

    let err = orchestrator.submit_or_reuse(&ctx, &intent("/es1")).await.unwrap_err();
    assert!(matches!(err, DendroError::ProcessorNotFound { .. }));

    let resource = ComputeResourceBuilder::new("cr-1")
        .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
        .build();
    let ctx = SubmissionContext {
        compute_resource: &resource,
        ..ctx
    };
    let incomplete = GenericJobIntent::new(
        "create_spike_sorting_analysis",
        JobBindings::new().input("recording", "rec.nwb"),
    );
    let err = orchestrator.submit_or_reuse(&ctx, &incomplete).await.unwrap_err();
    assert!(matches!(err, DendroError::MissingBinding { .. }));
    assert_eq!(api.create_job_calls(), 0);
}

#[tokio::test]
async fn test_submission_error_is_not_retried() {
    let api = MockDendroApi::new();
    api.fail_create_job("quota exceeded");
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));
    let resource = ComputeResourceBuilder::new("cr-1")
        .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
        .build();
    let ctx = SubmissionContext {
        project_id: "p1",
        compute_resource: &resource,
        files: &[],
        jobs: &[],
    };

    let err = orchestrator.submit_or_reuse(&ctx, &intent("/es1")).await.unwrap_err();
    assert!(matches!(err, DendroError::Submission(ref msg) if msg == "quota exceeded"));
    assert_eq!(api.create_job_calls(), 1);
}

#[tokio::test]
async fn test_refresh_and_submit_reuses_job_created_earlier() {
    let api = MockDendroApi::new()
        .with_project(ProjectBuilder::new("p1").with_compute_resource_id("cr-1").build())
        .with_compute_resource(
            ComputeResourceBuilder::new("cr-1")
                .with_app("misc", vec![])
                .with_app("spike-sorting", vec![spike_sorting_analysis_processor()])
                .build(),
        )
        .with_files("p1", vec![test_file("p1", "rec.nwb"), test_file("p1", "sort.nh5")]);
    let orchestrator = JobSubmissionOrchestrator::new(Arc::new(api.clone()));

    let first = orchestrator
        .refresh_and_submit("p1", "cr-1", &intent("/es1"))
        .await
        .unwrap();
    let second = orchestrator
        .refresh_and_submit("p1", "cr-1", &intent("/es1"))
        .await
        .unwrap();

    assert!(!first.is_reused());
    assert!(second.is_reused());
    assert_eq!(first.job().job_id, second.job().job_id);
    assert_eq!(first.job().compute_resource_id, "cr-1");
    assert_eq!(api.create_job_calls(), 1);
}
