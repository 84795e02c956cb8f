use thiserror::Error;

/// Problems reading configuration at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// A category slug that does not name any known category.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

/// Where a failed completion call broke down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The endpoint answered with a non-200 status.
    Http,
    /// 200, but the body was not JSON or had no `choices[0].message.content`.
    MalformedResponse,
    /// Timeout, DNS, refused or reset connection.
    Network,
}

/// Status used when the request never produced an upstream status.
pub const GATEWAY_TIMEOUT: u16 = 504;
pub const BAD_GATEWAY: u16 = 502;

/// A single failed completion attempt, surfaced to the user as-is.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Error {status_code}: {detail}")]
pub struct CompletionFailure {
    pub kind: FailureKind,
    pub status_code: u16,
    pub detail: String,
}

impl CompletionFailure {
    pub fn http(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Http,
            status_code,
            detail: body.into(),
        }
    }

    pub fn malformed(status_code: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::MalformedResponse,
            status_code,
            detail: detail.into(),
        }
    }

    pub fn network(timed_out: bool, detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            status_code: if timed_out { GATEWAY_TIMEOUT } else { BAD_GATEWAY },
            detail: detail.into(),
        }
    }
}
