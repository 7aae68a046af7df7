//! Remote provider APIs
//!
//! [`ComputeApi`] covers the CloudServer projects and servers endpoints and
//! [`DnsApi`] covers Cloudflare zones and records. The HTTP implementations
//! live in [`cloudserver`] and [`cloudflare`]; everything above this module
//! only talks to the traits.

pub mod cloudflare;
pub mod cloudserver;
#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub use cloudflare::CloudflareClient;
pub use cloudserver::CloudServerClient;

/// A CloudServer project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectData {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Body of a project creation request
#[derive(Debug, Clone, Serialize)]
pub struct NewProject {
    pub description: String,
    pub name: String,
}

/// An address assigned to a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerIp {
    pub ip: String,
    #[serde(rename = "is_primary", default)]
    pub primary: bool,
}

/// A CloudServer server as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerData {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ips: Vec<ServerIp>,
}

impl ServerData {
    /// The address flagged primary, if any
    pub fn primary_ip(&self) -> Option<&str> {
        self.ips
            .iter()
            .find(|ip| ip.primary)
            .map(|ip| ip.ip.as_str())
    }
}

/// Body of a server creation request
#[derive(Debug, Clone, Serialize)]
pub struct NewServer {
    pub fqdns: Vec<String>,
    pub ip_types: Vec<String>,
    pub location: u32,
    pub name: String,
    pub os: u32,
    pub plan: u32,
    pub project: u64,
    pub user_data: String,
}

/// A Cloudflare zone
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// A Cloudflare DNS record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "type", default)]
    pub record_type: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

/// Body of a DNS record create or update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordParams {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

/// Compute provider operations
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Projects matching a search term; may include partial matches
    async fn search_projects(&self, term: &str) -> Result<Vec<ProjectData>, ApiError>;

    async fn create_project(&self, project: &NewProject) -> Result<ProjectData, ApiError>;

    async fn list_project_servers(&self, project_id: u64) -> Result<Vec<ServerData>, ApiError>;

    async fn create_server(&self, server: &NewServer) -> Result<ServerData, ApiError>;

    async fn delete_server(&self, server_id: u64) -> Result<(), ApiError>;
}

/// DNS provider operations
#[async_trait]
pub trait DnsApi: Send + Sync {
    /// Zones matching a name
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>, ApiError>;

    /// Records in a zone filtered by name
    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>, ApiError>;

    async fn create_record(
        &self,
        zone_id: &str,
        record: &RecordParams,
    ) -> Result<DnsRecord, ApiError>;

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordParams,
    ) -> Result<DnsRecord, ApiError>;
}

/// Read the whole response body, rejecting any status other than `expected`
///
/// The body is read before the status is checked so rejections can carry it.
/// A body that cannot be read in full is a transport failure.
pub(crate) async fn read_body(
    response: reqwest::Response,
    expected: reqwest::StatusCode,
) -> Result<String, ApiError> {
    let status = response.status();
    let body = response.text().await?;

    if status != expected {
        return Err(ApiError::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}
