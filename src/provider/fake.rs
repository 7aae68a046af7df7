//! In-memory providers for tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{
    ComputeApi, DnsApi, DnsRecord, NewProject, NewServer, ProjectData, RecordParams, ServerData,
    ServerIp, Zone,
};
use crate::error::ApiError;

#[derive(Default)]
struct ComputeState {
    projects: Vec<ProjectData>,
    servers: Vec<(u64, ServerData)>,
    next_id: u64,
    calls: Vec<String>,
    failing_deletes: HashSet<u64>,
    create_response: Option<ServerData>,
    projects_without_id: bool,
    last_created: Option<NewServer>,
}

/// Fake compute provider keeping projects and servers in memory
#[derive(Default)]
pub(crate) struct FakeCompute {
    state: Mutex<ComputeState>,
}

impl FakeCompute {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().next_id = 100;
        fake
    }

    pub fn with_project(self, id: u64, name: &str) -> Self {
        self.state.lock().unwrap().projects.push(ProjectData {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn with_server(self, project_id: u64, id: u64, name: &str, ip: &str) -> Self {
        self.state.lock().unwrap().servers.push((
            project_id,
            ServerData {
                id,
                name: name.to_string(),
                ips: vec![ServerIp {
                    ip: ip.to_string(),
                    primary: true,
                }],
            },
        ));
        self
    }

    /// Make `delete_server(id)` fail with a 500
    pub fn fail_delete(&self, id: u64) {
        self.state.lock().unwrap().failing_deletes.insert(id);
    }

    /// Return `server` from the next creations instead of a generated one
    pub fn respond_to_create_with(&self, server: ServerData) {
        self.state.lock().unwrap().create_response = Some(server);
    }

    /// Answer project creations with an id of 0
    pub fn create_projects_without_id(&self) {
        self.state.lock().unwrap().projects_without_id = true;
    }

    /// Every call made so far, e.g. `"search_projects VPNs"`
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split_whitespace().next() == Some(operation))
            .count()
    }

    pub fn server_ids(&self) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .servers
            .iter()
            .map(|(_, s)| s.id)
            .collect()
    }

    pub fn last_created(&self) -> Option<NewServer> {
        self.state.lock().unwrap().last_created.clone()
    }
}

#[async_trait]
impl ComputeApi for FakeCompute {
    async fn search_projects(&self, term: &str) -> Result<Vec<ProjectData>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("search_projects {}", term));
        let term = term.to_lowercase();
        Ok(state
            .projects
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&term))
            .cloned()
            .collect())
    }

    async fn create_project(&self, project: &NewProject) -> Result<ProjectData, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_project {}", project.name));
        state.next_id += 1;
        let created = ProjectData {
            id: if state.projects_without_id { 0 } else { state.next_id },
            name: project.name.clone(),
        };
        state.projects.push(created.clone());
        Ok(created)
    }

    async fn list_project_servers(&self, project_id: u64) -> Result<Vec<ServerData>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("list_project_servers {}", project_id));
        Ok(state
            .servers
            .iter()
            .filter(|(project, _)| *project == project_id)
            .map(|(_, s)| s.clone())
            .collect())
    }

    async fn create_server(&self, server: &NewServer) -> Result<ServerData, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("create_server {}", server.name));
        state.last_created = Some(server.clone());

        if let Some(response) = state.create_response.clone() {
            return Ok(response);
        }

        state.next_id += 1;
        let id = state.next_id;
        let created = ServerData {
            id,
            name: server.name.clone(),
            ips: vec![
                ServerIp {
                    ip: format!("10.10.0.{}", id % 250),
                    primary: false,
                },
                ServerIp {
                    ip: format!("203.0.113.{}", id % 250),
                    primary: true,
                },
            ],
        };
        state.servers.push((server.project, created.clone()));
        Ok(created)
    }

    async fn delete_server(&self, server_id: u64) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete_server {}", server_id));

        if state.failing_deletes.contains(&server_id) {
            return Err(ApiError::Rejected {
                status: 500,
                body: format!("cannot delete {}", server_id),
            });
        }

        let before = state.servers.len();
        state.servers.retain(|(_, s)| s.id != server_id);
        if state.servers.len() == before {
            return Err(ApiError::Rejected {
                status: 404,
                body: "server not found".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
struct DnsState {
    zones: Vec<Zone>,
    records: Vec<(String, DnsRecord)>,
    next_id: u64,
    creates: usize,
    updates: usize,
}

/// Fake DNS provider keeping zones and records in memory
#[derive(Default)]
pub(crate) struct FakeDns {
    state: Mutex<DnsState>,
}

impl FakeDns {
    pub fn with_zone(self, id: &str, name: &str) -> Self {
        self.state.lock().unwrap().zones.push(Zone {
            id: id.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_record(self, zone_id: &str, name: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let record = DnsRecord {
                id: format!("rec-{}", state.next_id),
                name: name.to_string(),
                content: content.to_string(),
                record_type: "A".to_string(),
                ttl: 300,
                proxied: true,
            };
            state.records.push((zone_id.to_string(), record));
        }
        self
    }

    pub fn records(&self) -> Vec<DnsRecord> {
        self.state
            .lock()
            .unwrap()
            .records
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn creates(&self) -> usize {
        self.state.lock().unwrap().creates
    }

    pub fn updates(&self) -> usize {
        self.state.lock().unwrap().updates
    }
}

#[async_trait]
impl DnsApi for FakeDns {
    async fn list_zones(&self, name: &str) -> Result<Vec<Zone>, ApiError> {
        let state = self.state.lock().unwrap();
        let name = name.to_lowercase();
        Ok(state
            .zones
            .iter()
            .filter(|z| z.name.to_lowercase().contains(&name))
            .cloned()
            .collect())
    }

    async fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>, ApiError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .records
            .iter()
            .filter(|(zone, r)| zone == zone_id && r.name.eq_ignore_ascii_case(name))
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_record(
        &self,
        zone_id: &str,
        record: &RecordParams,
    ) -> Result<DnsRecord, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.creates += 1;
        state.next_id += 1;
        let created = DnsRecord {
            id: format!("rec-{}", state.next_id),
            name: record.name.clone(),
            content: record.content.clone(),
            record_type: record.record_type.clone(),
            ttl: record.ttl,
            proxied: record.proxied,
        };
        state.records.push((zone_id.to_string(), created.clone()));
        Ok(created)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        record: &RecordParams,
    ) -> Result<DnsRecord, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.updates += 1;
        let existing = state
            .records
            .iter_mut()
            .find(|(zone, r)| zone == zone_id && r.id == record_id)
            .map(|(_, r)| r)
            .ok_or_else(|| ApiError::Rejected {
                status: 404,
                body: "record not found".to_string(),
            })?;
        existing.content = record.content.clone();
        existing.ttl = record.ttl;
        existing.proxied = record.proxied;
        Ok(existing.clone())
    }
}
