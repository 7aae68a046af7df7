//! Project resolution
//!
//! All VPN servers live in a single CloudServer project. The project is looked
//! up by name on every call and created on first use.

use crate::config::CloudServerSettings;
use crate::error::{CloudVpnError, ConsistencyError, Result};
use crate::provider::{ComputeApi, NewProject};

/// Name of the project VPN servers are created in
pub const PROJECT_NAME: &str = "VPNs";

/// Description given to the project when it has to be created
pub const PROJECT_DESCRIPTION: &str = "VPN servers created by cloudserver-vpn";

/// Which project to find or create
#[derive(Debug, Clone, Copy)]
pub struct ProjectSpec<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

impl Default for ProjectSpec<'static> {
    fn default() -> Self {
        Self {
            name: PROJECT_NAME,
            description: PROJECT_DESCRIPTION,
        }
    }
}

/// Find the project to use, creating it when none exists
///
/// An explicit project id in the settings is returned as-is without asking
/// the provider.
pub async fn resolve_project(
    compute: &dyn ComputeApi,
    settings: &CloudServerSettings,
    spec: ProjectSpec<'_>,
) -> Result<u64> {
    if let Some(project_id) = settings.project {
        return Ok(project_id);
    }

    if let Some(project_id) = find_project(compute, spec).await? {
        tracing::debug!("Using existing project {} ({})", project_id, spec.name);
        return Ok(project_id);
    }

    let created = compute
        .create_project(&NewProject {
            description: spec.description.to_string(),
            name: spec.name.to_string(),
        })
        .await
        .map_err(CloudVpnError::compute("create new project"))?;

    if created.id == 0 {
        return Err(ConsistencyError::UnverifiableProject.into());
    }

    tracing::info!("Created project {} ({})", created.id, spec.name);
    Ok(created.id)
}

/// Search for the project; the provider's search may return partial matches
async fn find_project(compute: &dyn ComputeApi, spec: ProjectSpec<'_>) -> Result<Option<u64>> {
    let candidates = compute
        .search_projects(spec.name)
        .await
        .map_err(CloudVpnError::compute("perform project search"))?;

    Ok(candidates
        .iter()
        .find(|project| project.name.eq_ignore_ascii_case(spec.name))
        .map(|project| project.id))
}
