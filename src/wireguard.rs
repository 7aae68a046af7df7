//! WireGuard configuration rendering
//!
//! Produces the `wg0.conf` written to the server at first boot. Output depends
//! only on the input: peers keep their order and nothing time- or
//! randomness-based is included.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::config::NetworkConfig;

/// Listen port used when `WIREGUARD_LISTENPORT` is unset
pub const DEFAULT_LISTEN_PORT: u16 = 51820;

/// Egress interface NAT is applied to on the server
const EGRESS_INTERFACE: &str = "eth0";

/// Render the plain-text tunnel configuration
pub fn render_config(network: &NetworkConfig) -> String {
    let interface = &network.interface;
    let port = interface.listen_port.effective(DEFAULT_LISTEN_PORT);

    // `%i` is expanded by wg-quick to the tunnel interface name
    let mut config = format!(
        "[Interface]\n\
         Address = {address}\n\
         ListenPort = {port}\n\
         PostDown = iptables -D FORWARD -i %i -j ACCEPT; iptables -t nat -D POSTROUTING -o {egress} -j MASQUERADE\n\
         PostUp = iptables -A FORWARD -i %i -j ACCEPT; iptables -t nat -A POSTROUTING -o {egress} -j MASQUERADE\n\
         PrivateKey = {key}\n\
         \n",
        address = interface.address,
        port = port,
        egress = EGRESS_INTERFACE,
        key = interface.private_key,
    );

    for peer in &network.peers {
        config.push_str(&format!(
            "[Peer]\nAllowedIPs = {}\nPublicKey = {}\n\n",
            peer.allowed_ips, peer.public_key
        ));
    }

    config
}

/// Render the tunnel configuration and base64-encode it for cloud-init
pub fn encode_config(network: &NetworkConfig) -> String {
    BASE64.encode(render_config(network))
}
