//! Settings loaded from the process environment
//!
//! Every field is read as-is; nothing is checked here. Validation lives in
//! [`super::validate`] so that all problems can be reported together.

/// Default CloudServer API endpoint
pub const CLOUDSERVER_API_URL: &str = "https://cloudserver.nz/api/v1";

/// Default Cloudflare API endpoint
pub const CLOUDFLARE_API_URL: &str = "https://api.cloudflare.com/client/v4";

/// Highest peer index scanned in `WIREGUARD_PEER{n}_*`
pub const MAX_PEER_ID: u8 = 254;

/// Complete runtime configuration
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub cloudflare: CloudflareSettings,
    pub cloudserver: CloudServerSettings,
    pub http: HttpSettings,
    pub server: ServerIdentity,
    pub wireguard: NetworkConfig,
}

/// DNS provider credentials and zone
#[derive(Debug, Clone)]
pub struct CloudflareSettings {
    pub api_key: String,
    /// Empty when DNS publishing is disabled
    pub zone: String,
    pub api_url: String,
}

/// Compute provider credentials
#[derive(Debug, Clone)]
pub struct CloudServerSettings {
    pub api_key: String,
    /// Explicit project id, skips the project lookup entirely
    pub project: Option<u64>,
    pub api_url: String,
}

/// Serve mode settings
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    pub port: PortSetting,
}

/// Server naming
#[derive(Debug, Clone, Default)]
pub struct ServerIdentity {
    pub name: String,
    /// `name`, or lowercase `name.zone` when a zone is configured
    pub fqdn: String,
}

/// WireGuard interface and peers rendered into the server's boot data
#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    pub interface: InterfaceSettings,
    pub peers: Vec<Peer>,
}

/// WireGuard `[Interface]` values
#[derive(Debug, Clone, Default)]
pub struct InterfaceSettings {
    /// Interface address in CIDR form
    pub address: String,
    pub listen_port: PortSetting,
    pub private_key: String,
}

/// WireGuard `[Peer]` values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    /// Index `n` taken from `WIREGUARD_PEER{n}_*`
    pub id: u8,
    pub allowed_ips: String,
    pub public_key: String,
}

/// A numeric port setting that remembers how it was written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PortSetting {
    /// Unset or empty
    #[default]
    Absent,
    /// Literally "0": disable the default and let the system choose
    Zero,
    /// Any other integer, not yet range-checked
    Value(i64),
    /// Not an integer
    Invalid(String),
}

impl PortSetting {
    /// Classify a raw setting value
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") => Self::Absent,
            Some("0") => Self::Zero,
            Some(value) => match value.parse::<i64>() {
                Ok(n) => Self::Value(n),
                Err(_) => Self::Invalid(value.to_string()),
            },
        }
    }

    /// True when the setting is present and neither "0" nor a valid port
    pub fn is_out_of_range(&self) -> bool {
        match self {
            Self::Absent | Self::Zero => false,
            Self::Value(n) => !(1..=65535).contains(n),
            Self::Invalid(_) => true,
        }
    }

    /// Port to actually use: 0 for an explicit "0", `default` when unset or unusable
    pub fn effective(&self, default: u16) -> u16 {
        match self {
            Self::Zero => 0,
            Self::Value(n) => u16::try_from(*n).ok().filter(|p| *p != 0).unwrap_or(default),
            Self::Absent | Self::Invalid(_) => default,
        }
    }
}

impl Default for CloudflareSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            zone: String::new(),
            api_url: CLOUDFLARE_API_URL.to_string(),
        }
    }
}

impl Default for CloudServerSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            project: None,
            api_url: CLOUDSERVER_API_URL.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let cloudflare = CloudflareSettings {
            api_key: get("CLOUDFLARE_APIKEY"),
            zone: get("CLOUDFLARE_ZONE"),
            ..Default::default()
        };

        let cloudserver = CloudServerSettings {
            api_key: get("CLOUDSERVER_APIKEY"),
            project: get("CLOUDSERVER_PROJECT")
                .parse::<u64>()
                .ok()
                .filter(|id| *id != 0),
            ..Default::default()
        };

        let http = HttpSettings {
            port: PortSetting::parse(lookup("HTTP_PORT").as_deref()),
        };

        let interface = InterfaceSettings {
            address: get("WIREGUARD_ADDRESS"),
            listen_port: PortSetting::parse(lookup("WIREGUARD_LISTENPORT").as_deref()),
            private_key: get("WIREGUARD_PRIVATEKEY"),
        };

        // A peer needs both variables present; an empty value still counts
        let peers = (0..=MAX_PEER_ID)
            .filter_map(|id| {
                let allowed_ips = lookup(&format!("WIREGUARD_PEER{}_ALLOWEDIPS", id))?;
                let public_key = lookup(&format!("WIREGUARD_PEER{}_PUBLICKEY", id))?;
                Some(Peer {
                    id,
                    allowed_ips,
                    public_key,
                })
            })
            .collect();

        let server = ServerIdentity::new(get("SERVER_NAME"), &cloudflare.zone);

        Settings {
            cloudflare,
            cloudserver,
            http,
            server,
            wireguard: NetworkConfig { interface, peers },
        }
    }

    /// True when DNS publishing is configured
    pub fn dns_enabled(&self) -> bool {
        !self.cloudflare.zone.is_empty()
    }
}

impl ServerIdentity {
    /// Derive the fully-qualified name from `name` and an optional zone
    pub fn new(name: String, zone: &str) -> Self {
        let fqdn = if zone.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", name, zone).to_lowercase()
        };
        Self { name, fqdn }
    }
}
