//! Top-level VPN operations
//!
//! [`Provisioner`] ties the settings to the two providers and exposes the
//! operations the CLI and serve mode are built from. Calls run one after
//! another; nothing is fanned out.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Settings;
use crate::dns;
use crate::error::Result;
use crate::provider::{CloudServerClient, CloudflareClient, ComputeApi, DnsApi, ServerData};
use crate::vps::{self, ProvisionedServer};

/// Per-server status report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub id: u64,
    pub name: String,
    /// Primary IP, empty when the server has none
    pub ip: String,
    /// Whether DNS points at `ip`; only reported when a zone is configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns: Option<bool>,
}

impl Status {
    fn from_server(server: &ServerData) -> Self {
        Self {
            id: server.id,
            name: server.name.clone(),
            ip: server.primary_ip().unwrap_or_default().to_string(),
            dns: None,
        }
    }
}

/// Settings plus provider handles
#[derive(Clone)]
pub struct Provisioner {
    settings: Arc<Settings>,
    compute: Arc<dyn ComputeApi>,
    dns: Arc<dyn DnsApi>,
}

impl Provisioner {
    /// Build a provisioner talking to the real provider APIs
    pub fn new(settings: Settings) -> Self {
        let compute = Arc::new(CloudServerClient::new(&settings.cloudserver));
        let dns = Arc::new(CloudflareClient::new(&settings.cloudflare));
        Self::with_providers(settings, compute, dns)
    }

    /// Build a provisioner with explicit provider implementations
    pub fn with_providers(
        settings: Settings,
        compute: Arc<dyn ComputeApi>,
        dns: Arc<dyn DnsApi>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            compute,
            dns,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create a VPN server
    pub async fn create(&self) -> Result<ProvisionedServer> {
        vps::create(self.compute.as_ref(), &self.settings).await
    }

    /// Point the configured DNS name at `server`
    pub async fn configure_dns(&self, server: &ProvisionedServer) -> Result<()> {
        dns::configure(self.dns.as_ref(), &self.settings, server).await
    }

    /// Create a VPN server and, when a zone is configured, publish its DNS record
    pub async fn create_and_publish(&self) -> Result<ProvisionedServer> {
        let server = self.create().await?;
        tracing::info!("VPS created, ID: {}, IP: {}", server.id, server.ip);

        if self.settings.dns_enabled() {
            tracing::info!("Configuring DNS record {}", self.settings.server.fqdn);
            self.configure_dns(&server).await?;
            tracing::info!("DNS configured");
        }

        Ok(server)
    }

    /// Servers currently in the VPN project
    pub async fn list_active(&self) -> Result<Vec<ServerData>> {
        vps::list_active(self.compute.as_ref(), &self.settings).await
    }

    /// Destroy one server
    pub async fn destroy(&self, server_id: u64) -> Result<()> {
        vps::destroy(self.compute.as_ref(), &self.settings, server_id).await
    }

    /// Destroy the given servers in order, stopping at the first failure
    pub async fn remove(&self, server_ids: &[u64]) -> Result<()> {
        vps::destroy_each(self.compute.as_ref(), &self.settings, server_ids).await
    }

    /// Destroy every server in the VPN project
    pub async fn remove_all(&self) -> Result<Vec<u64>> {
        vps::destroy_all(self.compute.as_ref(), &self.settings).await
    }

    /// Status of every active server, with DNS sync when a zone is configured
    pub async fn status(&self) -> Result<Vec<Status>> {
        let servers = self.list_active().await?;
        let mut statuses: Vec<Status> = servers.iter().map(Status::from_server).collect();

        if self.settings.dns_enabled() {
            for status in &mut statuses {
                let synced =
                    dns::in_sync(self.dns.as_ref(), &self.settings, &status.name, &status.ip).await;
                status.dns = Some(synced);
            }
        }

        Ok(statuses)
    }
}
