/// Shared error type used across every gateway crate.
///
/// The variant set is closed and mirrors the propagation policy in the
/// control-plane spec: `Validation`/`Authentication`/`NotFound` surface
/// immediately, `RateLimit`/`ServerError`/`Connection`/`Timeout` are
/// retried by the media client before surfacing, `Cancelled` propagates
/// silently, and `Internal` is always logged with a journaled system event.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(String),

    #[error("authentication: {0}")]
    Authentication(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited: {0}")]
    RateLimit(String),

    #[error("server error: {0}")]
    ServerError(String),

    #[error("connection: {0}")]
    Connection(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("cancelled")]
    Cancelled,

    #[error("internal: {0}")]
    Internal(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// The closed error-kind label used for counters and journal entries.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Authentication(_) => "authentication",
            Error::NotFound(_) => "not_found",
            Error::RateLimit(_) => "rate_limit",
            Error::ServerError(_) => "server_error",
            Error::Connection(_) => "connection",
            Error::Timeout(_) => "timeout",
            Error::Cancelled => "cancelled",
            Error::Internal(_) => "internal",
            Error::Io(_) => "internal",
            Error::Json(_) => "internal",
            Error::Yaml(_) => "config",
            Error::Config(_) => "config",
            Error::Other(_) => "internal",
        }
    }

    /// Whether MC's retry policy should retry this error kind (spec §4.2/§7).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RateLimit(_) | Error::ServerError(_) | Error::Connection(_) | Error::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
