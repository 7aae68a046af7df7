//! Serve mode
//!
//! Exposes create, remove and status over HTTP so a VPN can be started and
//! stopped from anything that can make a request.

pub mod routes;

use std::net::SocketAddr;

use crate::config::{validate_serve, Settings};
use crate::error::{CloudVpnError, Result};
use crate::provision::Provisioner;

pub use routes::{build_router, AppState};

/// Port used when `HTTP_PORT` is unset
pub const DEFAULT_HTTP_PORT: u16 = 5252;

/// Address serve mode binds: all interfaces, `HTTP_PORT` or the default
///
/// A port of 0 asks the OS for an ephemeral port.
pub fn listen_addr(settings: &Settings) -> SocketAddr {
    let port = settings.http.port.effective(DEFAULT_HTTP_PORT);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Validate the settings and serve until the listener fails
pub async fn serve(provisioner: Provisioner) -> Result<()> {
    let violations = validate_serve(provisioner.settings());
    if !violations.is_empty() {
        return Err(CloudVpnError::Validation {
            action: "start http server",
            violations,
        });
    }

    let listener = tokio::net::TcpListener::bind(listen_addr(provisioner.settings())).await?;
    tracing::info!("Listening on port {}", listener.local_addr()?.port());

    let router = build_router(AppState::new(provisioner));
    axum::serve(listener, router).await?;

    Ok(())
}
