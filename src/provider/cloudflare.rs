//! Cloudflare DNS client
//!
//! Uses the v4 API with an API token. Responses wrap their payload in
//! `{"success": .., "errors": [..], "result": ..}`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{read_body, DnsApi, DnsRecord, RecordParams, Zone};
use crate::config::CloudflareSettings;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    success: bool,
    result: Option<T>,
}

/// HTTP client for Cloudflare zones and DNS records
#[derive(Debug, Clone)]
pub struct CloudflareClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CloudflareClient {
    pub fn new(settings: &CloudflareSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let body = read_body(response, StatusCode::OK).await?;
        let parsed: ApiResponse<T> = serde_json::from_str(&body)?;

        match parsed.result {
            Some(result) if parsed.success => Ok(result),
            Some(_) => Err(ApiError::Rejected { status: 200, body }),
            None => Err(ApiError::Decode {
                message: format!("response has no result: {}", body),
            }),
        }
    }
}

#[async_trait]
impl DnsApi for CloudflareClient {
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>, ApiError> {
        tracing::debug!("Listing zones named '{}'", name);
        let request = self.http.get(self.url("/zones")).query(&[("name", name)]);
        self.fetch(request).await
    }

    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>, ApiError> {
        tracing::debug!("Listing records named '{}' in zone {}", name, zone_id);
        let request = self
            .http
            .get(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .query(&[("name", name)]);
        self.fetch(request).await
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &RecordParams,
    ) -> Result<DnsRecord, ApiError> {
        tracing::debug!("Creating {} record '{}'", record.record_type, record.name);
        let request = self
            .http
            .post(self.url(&format!("/zones/{}/dns_records", zone_id)))
            .json(record);
        self.fetch(request).await
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordParams,
    ) -> Result<DnsRecord, ApiError> {
        tracing::debug!("Updating record {} ('{}')", record_id, record.name);
        let request = self
            .http
            .put(self.url(&format!("/zones/{}/dns_records/{}", zone_id, record_id)))
            .json(record);
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query},
        http::StatusCode as HttpStatus,
        routing::{get, put},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base_url: String) -> CloudflareClient {
        CloudflareClient::new(&CloudflareSettings {
            api_key: "k".repeat(40),
            zone: "example.com".to_string(),
            api_url: base_url,
        })
    }

    #[tokio::test]
    async fn test_list_zones_unwraps_result() {
        let router = Router::new().route(
            "/zones",
            get(|Query(query): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "success": true,
                    "errors": [],
                    "result": [{"id": "z1", "name": query.get("name").cloned().unwrap_or_default()}]
                }))
            }),
        );
        let api = client(spawn_stub(router).await);

        let zones = api.list_zones("example.com").await.unwrap();
        assert_eq!(
            zones,
            vec![Zone {
                id: "z1".to_string(),
                name: "example.com".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_update_record_targets_record_id() {
        let router = Router::new().route(
            "/zones/:zone/dns_records/:record",
            put(
                |Path((zone, record)): Path<(String, String)>, Json(body): Json<Value>| async move {
                    assert_eq!(zone, "z1");
                    Json(json!({
                        "success": true,
                        "result": {
                            "id": record,
                            "name": body["name"],
                            "content": body["content"],
                            "type": body["type"],
                            "ttl": body["ttl"],
                            "proxied": body["proxied"]
                        }
                    }))
                },
            ),
        );
        let api = client(spawn_stub(router).await);

        let record = api
            .update_record(
                "z1",
                "r9",
                &RecordParams {
                    record_type: "A".to_string(),
                    name: "vpn.example.com".to_string(),
                    content: "203.0.113.7".to_string(),
                    ttl: 60,
                    proxied: false,
                },
            )
            .await
            .unwrap();
        assert_eq!(record.id, "r9");
        assert_eq!(record.content, "203.0.113.7");
        assert_eq!(record.ttl, 60);
        assert!(!record.proxied);
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let router = Router::new().route(
            "/zones",
            get(|| async {
                (
                    HttpStatus::FORBIDDEN,
                    r#"{"success":false,"errors":[{"code":9109,"message":"Invalid access token"}]}"#,
                )
            }),
        );
        let api = client(spawn_stub(router).await);

        let err = api.list_zones("example.com").await.unwrap_err();
        match err {
            ApiError::Rejected { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("Invalid access token"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unsuccessful_payload_is_rejected() {
        let router = Router::new().route(
            "/zones",
            get(|| async { Json(json!({"success": false, "result": []})) }),
        );
        let api = client(spawn_stub(router).await);

        let err = api.list_zones("example.com").await.unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 200, .. }));
    }
}
