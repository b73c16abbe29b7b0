use thiserror::Error;

/// Top-level error type for the `shelter-api` crate.
///
/// Covers every failure mode of the backend surfaces: HTTP transport,
/// REST error envelopes, row-level-security rejections, and the realtime
/// websocket. `shelter-core` maps these into its user-facing taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authorization ───────────────────────────────────────────────
    /// The API key or access token was rejected (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Row-level security or grants refused the operation.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        message: String,
        code: Option<String>,
    },

    /// A write matched zero rows. Under row-level security this is how
    /// a filtered-out update or delete looks from the outside.
    #[error("No rows affected in '{table}' for id {id}")]
    NoRowsAffected { table: String, id: String },

    // ── REST ────────────────────────────────────────────────────────
    /// Unique, foreign-key, not-null or check constraint violation.
    #[error("Constraint violation: {message}")]
    Constraint {
        message: String,
        code: Option<String>,
        details: Option<String>,
    },

    /// Any other structured error returned by the REST surface.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    // ── Realtime ────────────────────────────────────────────────────
    /// Realtime websocket connection failed.
    #[error("Realtime connection failed: {0}")]
    RealtimeConnect(String),

    /// Realtime websocket closed unexpectedly.
    #[error("Realtime socket closed (code {code}): {reason}")]
    RealtimeClosed { code: u16, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::RealtimeConnect(_) => true,
            Self::Api { status, .. } => *status == 502 || *status == 503 || *status == 504,
            _ => false,
        }
    }

    /// Returns `true` if the backend refused the operation on policy
    /// grounds (permissions, row-level security, constraints).
    pub fn is_policy(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. }
                | Self::PermissionDenied { .. }
                | Self::NoRowsAffected { .. }
                | Self::Constraint { .. }
        )
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the backend error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::PermissionDenied { code, .. }
            | Self::Constraint { code, .. }
            | Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_errors_are_transient() {
        let err = Error::Api {
            status: 503,
            message: "upstream unavailable".into(),
            code: None,
        };
        assert!(err.is_transient());
        assert!(!err.is_policy());
    }

    #[test]
    fn policy_errors_are_not_transient() {
        let err = Error::PermissionDenied {
            message: "new row violates row-level security policy".into(),
            code: Some("42501".into()),
        };
        assert!(err.is_policy());
        assert!(!err.is_transient());
        assert_eq!(err.api_error_code(), Some("42501"));
    }

    #[test]
    fn zero_row_writes_count_as_policy() {
        let err = Error::NoRowsAffected {
            table: "rescued_animals".into(),
            id: "abc".into(),
        };
        assert!(err.is_policy());
        assert!(err.to_string().contains("rescued_animals"));
    }
}
