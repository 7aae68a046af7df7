//! Pre-flight checks run before any provider is contacted
//!
//! Each function collects every problem it finds rather than stopping at the
//! first, so an operator can fix a configuration in one pass.

use std::sync::OnceLock;

use ipnet::IpNet;
use regex::Regex;

use super::Settings;

const CLOUDFLARE_KEY_LEN: usize = 40;
const WIREGUARD_KEY_LEN: usize = 44;

/// ASCII word character at both ends, word/dot/hyphen in between
fn server_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9A-Za-z_][0-9A-Za-z_.-]*[0-9A-Za-z_]$").expect("server name pattern")
    })
}

/// Checks required before creating a server
pub fn validate_create(settings: &Settings) -> Vec<String> {
    let mut errs = Vec::new();

    if settings.dns_enabled() {
        let key = &settings.cloudflare.api_key;
        if key.is_empty() {
            errs.push("CLOUDFLARE_APIKEY is mandatory when CLOUDFLARE_ZONE is set".to_string());
        } else if key.len() != CLOUDFLARE_KEY_LEN {
            errs.push(format!("CLOUDFLARE_APIKEY '{}' is not valid", key));
        }
    }

    if settings.cloudserver.api_key.is_empty() {
        errs.push("CLOUDSERVER_APIKEY is mandatory".to_string());
    }

    let name = &settings.server.name;
    if name.is_empty() {
        errs.push("SERVER_NAME is mandatory".to_string());
    } else if !server_name_pattern().is_match(name) {
        errs.push(format!("SERVER_NAME '{}' is not a valid RFC 3696 subdomain", name));
    }

    let interface = &settings.wireguard.interface;
    let interface_net = interface.address.parse::<IpNet>().ok();
    if interface.address.is_empty() {
        errs.push("WIREGUARD_ADDRESS is mandatory".to_string());
    } else if interface_net.is_none() {
        errs.push(format!(
            "WIREGUARD_ADDRESS '{}' is not a valid CIDR",
            interface.address
        ));
    }

    if interface.listen_port.is_out_of_range() {
        errs.push(
            "WIREGUARD_LISTENPORT must be numeric and between 0 and 65535 if specified".to_string(),
        );
    }

    if interface.private_key.is_empty() {
        errs.push("WIREGUARD_PRIVATEKEY is mandatory".to_string());
    } else if interface.private_key.len() != WIREGUARD_KEY_LEN {
        errs.push(format!(
            "WIREGUARD_PRIVATEKEY '{}' is not valid",
            interface.private_key
        ));
    }

    for peer in &settings.wireguard.peers {
        match peer.allowed_ips.parse::<IpNet>() {
            Err(_) => errs.push(format!(
                "WIREGUARD_PEER{}_ALLOWEDIPS '{}' is not a valid CIDR",
                peer.id, peer.allowed_ips
            )),
            Ok(peer_net) => {
                // Only meaningful once the interface network itself is known
                if let Some(interface_net) = interface_net {
                    if !interface_net.trunc().contains(&peer_net.network()) {
                        errs.push(format!(
                            "WIREGUARD_PEER{}_ALLOWEDIPS '{}' is not within WIREGUARD_ADDRESS '{}' CIDR",
                            peer.id, peer.allowed_ips, interface.address
                        ));
                    }
                }
            }
        }

        if peer.public_key.len() != WIREGUARD_KEY_LEN {
            errs.push(format!(
                "WIREGUARD_PEER{}_PUBLICKEY '{}' is not valid",
                peer.id, peer.public_key
            ));
        }
    }

    errs
}

/// Checks required before listing or removing servers
pub fn validate_destroy(settings: &Settings) -> Vec<String> {
    let mut errs = Vec::new();

    if settings.cloudserver.api_key.is_empty() {
        errs.push("CLOUDSERVER_APIKEY is mandatory".to_string());
    }

    errs
}

/// Checks required before starting serve mode
pub fn validate_serve(settings: &Settings) -> Vec<String> {
    let mut errs = validate_create(settings);

    if settings.http.port.is_out_of_range() {
        errs.push("HTTP_PORT must be numeric and between 0 and 65535 if specified".to_string());
    }

    errs
}
