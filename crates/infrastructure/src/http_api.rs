use std::time::Duration;

use async_trait::async_trait;
use dendro_config::ApiConfig;
use dendro_domain::{
    ComputeResource, CreateJobRequest, DendroApi, DendroFile, Job, Project,
};
use dendro_errors::{DendroError, DendroResult};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, warn};

pub const API_KEY_HEADER: &str = "dendro-api-key";

/// 服务端响应统一带有 `success` 字段，负载放在各自的字段下
trait ApiResponse: DeserializeOwned {
    type Payload;

    fn success(&self) -> bool;
    fn into_payload(self) -> Self::Payload;
}

macro_rules! api_response {
    ($name:ident, $field:ident, $payload:ty) => {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct $name {
            $field: $payload,
            success: bool,
        }

        impl ApiResponse for $name {
            type Payload = $payload;

            fn success(&self) -> bool {
                self.success
            }

            fn into_payload(self) -> $payload {
                self.$field
            }
        }
    };
}

api_response!(GetProjectResponse, project, Project);
api_response!(GetProjectFilesResponse, files, Vec<DendroFile>);
api_response!(GetProjectJobsResponse, jobs, Vec<Job>);
api_response!(GetJobResponse, job, Job);
api_response!(GetComputeResourceResponse, compute_resource, ComputeResource);
api_response!(CreateJobResponse, job_id, String);

/// 远程 Dendro 服务的 HTTP 客户端
pub struct HttpDendroApi {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl HttpDendroApi {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> DendroResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DendroError::network_error(format!("创建 HTTP 客户端失败: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http_client,
        })
    }

    pub fn from_config(config: &ApiConfig) -> DendroResult<Self> {
        Self::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http_client.request(method, url);
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> DendroResult<Response> {
        builder.send().await.map_err(|e| {
            error!("Failed to connect to Dendro API ({}): {}", what, e);
            DendroError::network_error(format!("{what}: {e}"))
        })
    }

    async fn get_json<R: ApiResponse>(
        &self,
        path: &str,
        not_found: impl FnOnce() -> DendroError,
    ) -> DendroResult<R::Payload> {
        let response = self.send(self.request(Method::GET, path), path).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GET {} failed: HTTP {} - {}", path, status, body);
            return Err(DendroError::network_error(format!("GET {path}: HTTP {status}")));
        }
        let body = response.json::<R>().await.map_err(|e| {
            DendroError::Serialization(format!("解析 {path} 的响应失败: {e}"))
        })?;
        if !body.success() {
            warn!("GET {} returned success=false", path);
            return Err(DendroError::Internal(format!("GET {path}: 服务返回 success=false")));
        }
        Ok(body.into_payload())
    }

    async fn put_json(
        &self,
        path: &str,
        body: serde_json::Value,
        not_found: impl FnOnce() -> DendroError,
    ) -> DendroResult<()> {
        let response = self
            .send(self.request(Method::PUT, path).json(&body), path)
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(not_found());
        }
        if !status.is_success() {
            warn!("PUT {} failed: HTTP {}", path, status);
            return Err(DendroError::network_error(format!("PUT {path}: HTTP {status}")));
        }
        Ok(())
    }
}

#[async_trait]
impl DendroApi for HttpDendroApi {
    async fn fetch_project(&self, project_id: &str) -> DendroResult<Project> {
        self.get_json::<GetProjectResponse>(&format!("/projects/{project_id}"), || {
            DendroError::project_not_found(project_id)
        })
        .await
    }

    async fn fetch_project_files(&self, project_id: &str) -> DendroResult<Vec<DendroFile>> {
        self.get_json::<GetProjectFilesResponse>(&format!("/projects/{project_id}/files"), || {
            DendroError::project_not_found(project_id)
        })
        .await
    }

    async fn fetch_jobs_for_project(&self, project_id: &str) -> DendroResult<Vec<Job>> {
        self.get_json::<GetProjectJobsResponse>(&format!("/projects/{project_id}/jobs"), || {
            DendroError::project_not_found(project_id)
        })
        .await
    }

    async fn fetch_job(&self, job_id: &str) -> DendroResult<Job> {
        self.get_json::<GetJobResponse>(&format!("/jobs/{job_id}"), || {
            DendroError::job_not_found(job_id)
        })
        .await
    }

    async fn create_job(&self, request: &CreateJobRequest) -> DendroResult<Job> {
        let response = self
            .send(self.request(Method::POST, "/jobs").json(request), "/jobs")
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Failed to create job: HTTP {} - {}", status, body);
            return Err(DendroError::submission_error(format!("HTTP {status} - {body}")));
        }

        let body: CreateJobResponse = response
            .json()
            .await
            .map_err(|e| DendroError::Serialization(format!("解析创建作业响应失败: {e}")))?;
        if !body.success() {
            error!("Failed to create job in project {}: success=false", request.project_id);
            return Err(DendroError::submission_error("服务返回 success=false"));
        }
        let job_id = body.into_payload();
        info!(
            "Successfully created job {} in project {}",
            job_id, request.project_id
        );

        // 此时作业已存在，拉取失败不按 Network 错误重试
        self.fetch_job(&job_id).await.map_err(|e| {
            error!("Created job {} but failed to fetch it: {}", job_id, e);
            DendroError::Internal(format!("作业 {job_id} 已创建，但拉取失败: {e}"))
        })
    }

    async fn fetch_compute_resource(&self, compute_resource_id: &str) -> DendroResult<ComputeResource> {
        self.get_json::<GetComputeResourceResponse>(
            &format!("/compute_resources/{compute_resource_id}"),
            || DendroError::compute_resource_not_found(compute_resource_id),
        )
        .await
    }

    async fn fetch_text(&self, url: &str) -> Option<String> {
        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            warn!("Failed to fetch {}: HTTP {}", url, response.status());
            return None;
        }
        match response.text().await {
            Ok(text) => {
                debug!("Fetched {} bytes from {}", text.len(), url);
                Some(text)
            }
            Err(e) => {
                warn!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }

    async fn set_project_description(&self, project_id: &str, description: &str) -> DendroResult<()> {
        self.put_json(
            &format!("/projects/{project_id}/description"),
            json!({ "description": description }),
            || DendroError::project_not_found(project_id),
        )
        .await
    }

    async fn set_project_analysis_source_url(
        &self,
        project_id: &str,
        analysis_source_url: &str,
    ) -> DendroResult<()> {
        self.put_json(
            &format!("/projects/{project_id}/analysis_source_url"),
            json!({ "analysisSourceUrl": analysis_source_url }),
            || DendroError::project_not_found(project_id),
        )
        .await
    }
}
