//! CloudServer REST client
//!
//! Bearer-token authenticated JSON API. Creation endpoints answer `201
//! Created`, everything else `200 OK`; any other status is a rejection.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{read_body, ComputeApi, NewProject, NewServer, ProjectData, ServerData};
use crate::config::CloudServerSettings;
use crate::error::ApiError;

/// `{"data": ...}` wrapper used by every CloudServer response
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: T,
}

/// HTTP client for the CloudServer API
#[derive(Debug, Clone)]
pub struct CloudServerClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CloudServerClient {
    pub fn new(settings: &CloudServerSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T>(
        &self,
        request: reqwest::RequestBuilder,
        expected: StatusCode,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let body = read_body(response, expected).await?;
        let envelope: Envelope<T> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl ComputeApi for CloudServerClient {
    async fn search_projects(&self, term: &str) -> Result<Vec<ProjectData>, ApiError> {
        tracing::debug!("Searching projects for '{}'", term);
        let request = self
            .http
            .get(self.url("/projects"))
            .query(&[("filter[search]", term)]);
        self.fetch(request, StatusCode::OK).await
    }

    async fn create_project(&self, project: &NewProject) -> Result<ProjectData, ApiError> {
        tracing::debug!("Creating project '{}'", project.name);
        let request = self.http.post(self.url("/projects")).json(project);
        self.fetch(request, StatusCode::CREATED).await
    }

    async fn list_project_servers(&self, project_id: u64) -> Result<Vec<ServerData>, ApiError> {
        tracing::debug!("Listing servers in project {}", project_id);
        let request = self
            .http
            .get(self.url(&format!("/projects/{}/servers", project_id)));
        self.fetch(request, StatusCode::OK).await
    }

    async fn create_server(&self, server: &NewServer) -> Result<ServerData, ApiError> {
        tracing::debug!("Creating server '{}' in project {}", server.name, server.project);
        let request = self.http.post(self.url("/servers")).json(server);
        self.fetch(request, StatusCode::CREATED).await
    }

    async fn delete_server(&self, server_id: u64) -> Result<(), ApiError> {
        tracing::debug!("Deleting server {}", server_id);
        let response = self
            .http
            .delete(self.url(&format!("/servers/{}", server_id)))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        read_body(response, StatusCode::OK).await?;
        Ok(())
    }
}
