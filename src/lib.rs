//! cloudserver-vpn - On-demand WireGuard VPN servers
//!
//! Creates a VPN server on CloudServer with a WireGuard configuration baked
//! into its cloud-init data, optionally publishes its address on Cloudflare
//! DNS, and tears servers down again when they are no longer needed.
//!
//! # Features
//!
//! - Validates the whole configuration before touching either provider
//! - Deterministic WireGuard configuration rendering
//! - Find-or-create of the VPN project
//! - Create-or-update of the server's DNS record
//! - HTTP serve mode exposing create, remove and status
//!
//! # Usage
//!
//! ```no_run
//! use cloudserver_vpn::{Provisioner, Settings};
//!
//! #[tokio::main]
//! async fn main() -> cloudserver_vpn::Result<()> {
//!     let provisioner = Provisioner::new(Settings::from_env());
//!     let server = provisioner.create_and_publish().await?;
//!     println!("{} is up at {}", server.id, server.ip);
//!     Ok(())
//! }
//! ```

pub mod cloud_init;
pub mod config;
pub mod dns;
pub mod error;
pub mod http;
pub mod project;
pub mod provider;
pub mod provision;
pub mod vps;
pub mod wireguard;

pub use config::Settings;
pub use error::{CloudVpnError, Result};
pub use provision::{Provisioner, Status};
pub use vps::ProvisionedServer;
