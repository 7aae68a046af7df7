//! Cloud-init user data for new VPN servers
//!
//! The server image is Alpine; WireGuard is installed with `apk` and managed
//! by an OpenRC service that wraps `wg-quick`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::config::NetworkConfig;
use crate::wireguard;

const SYSCTL_CONF: &str = "net.ipv4.conf.all.proxy_arp=1\nnet.ipv4.ip_forward=1\n";

// Installed byte for byte, including the blank line with trailing spaces
const INIT_SCRIPT: &str = concat!(
    "#!/sbin/openrc-run\n",
    "\n",
    "depend() {\n",
    "    need localmount net\n",
    "    use dns\n",
    "    after bootmisc\n",
    "}\n",
    "\n",
    "checkconfig() {\n",
    "    # TODO: does wireguard module is loaded\n",
    "    return 0\n",
    "}\n",
    "\n",
    "start() {\n",
    "    ebegin \"Starting Wireguard\"\n",
    "\n",
    "    checkconfig || return 1\n",
    "    \n",
    "    wg-quick up wg0\n",
    "    eend $?\n",
    "}\n",
    "\n",
    "stop() {\n",
    "    ebegin \"Stopping Wireguard\"\n",
    "    wg-quick down wg0\n",
    "    eend $?\n",
    "}\n",
);

/// A file written by cloud-init before `runcmd`
struct WriteFile<'a> {
    path: &'a str,
    permissions: &'a str,
    content_b64: String,
}

const RUN_COMMANDS: &[&str] = &[
    "sysctl -p /etc/sysctl.d/wireguard.conf",
    "apk add wireguard-tools",
    "rc-update add wireguard default",
    "rc-service wireguard start",
];

/// Build the complete `#cloud-config` document for a VPN server
pub fn user_data(network: &NetworkConfig) -> String {
    let files = [
        WriteFile {
            path: "/etc/sysctl.d/wireguard.conf",
            permissions: "0644",
            content_b64: BASE64.encode(SYSCTL_CONF),
        },
        WriteFile {
            path: "/etc/wireguard/wg0.conf",
            permissions: "0600",
            content_b64: wireguard::encode_config(network),
        },
        WriteFile {
            path: "/etc/init.d/wireguard",
            permissions: "0755",
            content_b64: BASE64.encode(INIT_SCRIPT),
        },
    ];

    let mut doc = String::from("#cloud-config\nwrite_files:\n");
    for file in &files {
        doc.push_str(&format!(
            "- content: {}\n  encoding: b64\n  owner: root:root\n  path: {}\n  permissions: '{}'\n",
            file.content_b64, file.path, file.permissions
        ));
    }

    doc.push_str("runcmd:");
    for command in RUN_COMMANDS {
        doc.push_str("\n  - ");
        doc.push_str(command);
    }

    doc
}
