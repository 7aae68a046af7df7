//! VPN server lifecycle
//!
//! Servers are created with the rendered WireGuard configuration as boot data
//! and destroyed by id. Nothing is cached; the set of active servers is always
//! whatever the resolved project currently contains.

use crate::cloud_init;
use crate::config::{validate_create, validate_destroy, Settings};
use crate::error::{CloudVpnError, ConsistencyError, Result};
use crate::project::{resolve_project, ProjectSpec};
use crate::provider::{ComputeApi, NewServer, ServerData};

/// CloudServer location id (Auckland)
pub const LOCATION_ID: u32 = 1;
/// CloudServer image id (Alpine Linux)
pub const OS_ID: u32 = 15;
/// CloudServer plan id
pub const PLAN_ID: u32 = 29;

/// A server confirmed as created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedServer {
    pub id: u64,
    /// Primary IPv4 address
    pub ip: String,
}

fn check(action: &'static str, violations: Vec<String>) -> Result<()> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CloudVpnError::Validation { action, violations })
    }
}

/// Create a new VPN server
pub async fn create(compute: &dyn ComputeApi, settings: &Settings) -> Result<ProvisionedServer> {
    check("create new server", validate_create(settings))?;

    let project_id = resolve_project(compute, &settings.cloudserver, ProjectSpec::default()).await?;

    let fqdn = &settings.server.fqdn;
    let request = NewServer {
        fqdns: vec![fqdn.clone()],
        ip_types: vec!["IPv4".to_string()],
        location: LOCATION_ID,
        name: fqdn.clone(),
        os: OS_ID,
        plan: PLAN_ID,
        project: project_id,
        user_data: cloud_init::user_data(&settings.wireguard),
    };

    let server = compute
        .create_server(&request)
        .await
        .map_err(CloudVpnError::compute("create new server"))?;

    let ip = server.primary_ip().unwrap_or_default();
    tracing::debug!("Create response: id {}, primary ip '{}'", server.id, ip);

    if server.id == 0 || ip.is_empty() {
        return Err(ConsistencyError::UnverifiableCreation.into());
    }

    Ok(ProvisionedServer {
        id: server.id,
        ip: ip.to_string(),
    })
}

/// All servers in the VPN project
pub async fn list_active(
    compute: &dyn ComputeApi,
    settings: &Settings,
) -> Result<Vec<ServerData>> {
    check("list servers", validate_destroy(settings))?;

    let project_id = resolve_project(compute, &settings.cloudserver, ProjectSpec::default()).await?;

    compute
        .list_project_servers(project_id)
        .await
        .map_err(CloudVpnError::compute("perform server search"))
}

/// Destroy one server by id
pub async fn destroy(compute: &dyn ComputeApi, settings: &Settings, server_id: u64) -> Result<()> {
    check("remove server", validate_destroy(settings))?;

    compute
        .delete_server(server_id)
        .await
        .map_err(CloudVpnError::compute(format!("remove server {}", server_id)))
}

/// Destroy servers one at a time, stopping at the first failure
///
/// Servers destroyed before the failure stay destroyed.
pub async fn destroy_each(
    compute: &dyn ComputeApi,
    settings: &Settings,
    server_ids: &[u64],
) -> Result<()> {
    for &server_id in server_ids {
        tracing::info!("Removing server {}", server_id);
        destroy(compute, settings, server_id).await?;
        tracing::info!("Server {} removed", server_id);
    }
    Ok(())
}

/// Destroy every server in the VPN project, returning the ids removed
pub async fn destroy_all(compute: &dyn ComputeApi, settings: &Settings) -> Result<Vec<u64>> {
    let active: Vec<u64> = list_active(compute, settings)
        .await?
        .iter()
        .map(|server| server.id)
        .collect();

    tracing::info!("Found {} server(s) to clean up", active.len());
    destroy_each(compute, settings, &active).await?;
    Ok(active)
}
