//! Configuration for cloudserver-vpn
//!
//! Settings are read from environment variables and checked before any
//! provider is contacted.

mod settings;
pub mod validate;

pub use settings::{
    CloudServerSettings, CloudflareSettings, HttpSettings, InterfaceSettings, NetworkConfig,
    Peer, PortSetting, ServerIdentity, Settings, CLOUDFLARE_API_URL, CLOUDSERVER_API_URL,
    MAX_PEER_ID,
};
pub use validate::{validate_create, validate_destroy, validate_serve};
