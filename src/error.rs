//! Error types for cloudserver-vpn

use thiserror::Error;

/// Main error type for cloudserver-vpn
#[derive(Error, Debug)]
pub enum CloudVpnError {
    /// Configuration failed validation; nothing was sent to either provider
    #[error("unable to {action}:\n - {}", .violations.join("\n - "))]
    Validation {
        action: &'static str,
        violations: Vec<String>,
    },

    /// Compute provider call failed
    #[error("unable to {operation}: {source}")]
    Compute {
        operation: String,
        #[source]
        source: ApiError,
    },

    /// DNS provider call failed
    #[error("unable to {operation}: {source}")]
    Dns {
        operation: String,
        #[source]
        source: ApiError,
    },

    /// Provider reported success but the response could not be trusted
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// System I/O errors
    #[error("System error: {0}")]
    System(#[from] std::io::Error),
}

/// Failures talking to a provider REST API
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {message}")]
    Transport { message: String },

    #[error("invalid status: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("error reading response from server: {message}")]
    Decode { message: String },
}

/// Success responses that are missing what we need to continue
#[derive(Error, Debug)]
pub enum ConsistencyError {
    #[error("unable to detect whether server was successfully created: perform a manual check")]
    UnverifiableCreation,

    #[error("unable to detect whether project was successfully created: perform a manual check")]
    UnverifiableProject,

    #[error("unable to determine zone id for {zone}")]
    ZoneNotFound { zone: String },

    #[error("unable to find dns record for {name}")]
    RecordNotFound { name: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode {
                message: e.to_string(),
            }
        } else {
            Self::Transport {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode {
            message: e.to_string(),
        }
    }
}

impl CloudVpnError {
    pub(crate) fn compute(operation: impl Into<String>) -> impl FnOnce(ApiError) -> Self {
        let operation = operation.into();
        move |source| Self::Compute { operation, source }
    }

    pub(crate) fn dns(operation: impl Into<String>) -> impl FnOnce(ApiError) -> Self {
        let operation = operation.into();
        move |source| Self::Dns { operation, source }
    }

    /// Get a user-friendly error message with suggested action
    pub fn user_message(&self) -> String {
        match self {
            Self::Compute {
                source: ApiError::Rejected { status: 401, .. },
                ..
            } => format!("{}\n  Check that CLOUDSERVER_APIKEY is correct.", self),

            Self::Dns {
                source: ApiError::Rejected { status: 401 | 403, .. },
                ..
            } => format!(
                "{}\n  Check that CLOUDFLARE_APIKEY has DNS edit permission for the zone.",
                self
            ),

            Self::Consistency(ConsistencyError::UnverifiableCreation) => format!(
                "{}\n  The server may still exist. Check the CloudServer console before retrying.",
                self
            ),

            Self::Consistency(ConsistencyError::UnverifiableProject) => format!(
                "{}\n  A \"VPNs\" project may exist without an id. Check the CloudServer console.",
                self
            ),

            _ => format!("{}", self),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation { .. } => 1,
            Self::Compute { .. } => 2,
            Self::Dns { .. } => 3,
            Self::Consistency(_) => 4,
            Self::System(_) => 5,
        }
    }
}

/// Result type alias for cloudserver-vpn operations
pub type Result<T> = std::result::Result<T, CloudVpnError>;
