// ── Core error types ──
//
// User-facing errors from shelter-core. Consumers never see HTTP status
// codes or JSON bodies directly; `From<shelter_api::Error>` sorts
// transport-layer failures into transport, timeout and policy errors.

use std::fmt;

use thiserror::Error;

use crate::model::Collection;

/// One failed write inside a multi-collection operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub collection: Collection,
    pub reason: String,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.collection, self.reason)
    }
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local validation ─────────────────────────────────────────────
    #[error("Validation failed: {}", format_fields(.fields))]
    Validation { fields: Vec<(String, String)> },

    #[error("Invalid status '{value}': expected one of Available, Adopted, Under Care")]
    InvalidStatus { value: String },

    /// A review action on a record that is no longer in the state the
    /// action applies to.
    #[error("Cannot {action} {entity_type} {identifier}: it is already {current}")]
    InvalidTransition {
        action: String,
        entity_type: String,
        identifier: String,
        current: String,
    },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Cannot reach backend: {reason}")]
    Transport { reason: String },

    #[error("Backend request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Backend refusals ─────────────────────────────────────────────
    /// Permission, row-level-security or constraint failure. `message`
    /// is the backend's own text.
    #[error("Rejected by backend: {message}")]
    Policy {
        message: String,
        code: Option<String>,
    },

    // ── Multi-collection writes ──────────────────────────────────────
    /// Some required writes succeeded and others failed. Nothing is
    /// rolled back; the record may need manual reconciliation.
    #[error(
        "{operation} partially failed: succeeded on [{}], failed on [{}]",
        join_collections(.succeeded),
        join_failures(.failed)
    )]
    PartialFailure {
        operation: String,
        succeeded: Vec<Collection>,
        failed: Vec<WriteFailure>,
    },

    /// Every required write failed; nothing changed.
    #[error("{operation} failed on [{}]", join_failures(.failed))]
    WritesFailed {
        operation: String,
        failed: Vec<WriteFailure>,
    },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Could not decode {collection} row: {message}")]
    Decode {
        collection: Collection,
        message: String,
    },

    // ── Controller state ─────────────────────────────────────────────
    #[error("Another change is still in progress")]
    Busy,

    #[error("List is not loaded yet")]
    NotReady,

    #[error("List has been closed")]
    Unmounted,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Transport failures worth one more attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Collections named as failed by a write error, if any.
    pub fn failed_collections(&self) -> Vec<Collection> {
        match self {
            Self::PartialFailure { failed, .. } | Self::WritesFailed { failed, .. } => {
                failed.iter().map(|f| f.collection).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Build the outcome of a set of per-collection writes: `Ok` when all
    /// succeeded, `WritesFailed` when none did, `PartialFailure` otherwise.
    pub fn from_write_outcomes(
        operation: &str,
        outcomes: Vec<(Collection, Result<(), CoreError>)>,
    ) -> Result<(), CoreError> {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (collection, outcome) in outcomes {
            match outcome {
                Ok(()) => succeeded.push(collection),
                Err(e) => failed.push(WriteFailure {
                    collection,
                    reason: e.to_string(),
                }),
            }
        }

        if failed.is_empty() {
            Ok(())
        } else if succeeded.is_empty() {
            Err(Self::WritesFailed {
                operation: operation.to_owned(),
                failed,
            })
        } else {
            Err(Self::PartialFailure {
                operation: operation.to_owned(),
                succeeded,
                failed,
            })
        }
    }
}

fn format_fields(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_collections(collections: &[Collection]) -> String {
    collections
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_failures(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<shelter_api::Error> for CoreError {
    fn from(err: shelter_api::Error) -> Self {
        use shelter_api::Error as Api;

        match err {
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        entity_type: "resource".into(),
                        identifier: e.url().map(|u| u.path().to_owned()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Transport {
                        reason: e.to_string(),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::Tls(msg) => CoreError::Transport {
                reason: format!("TLS error: {msg}"),
            },
            Api::Authentication { message } => CoreError::Policy {
                message,
                code: Some("401".into()),
            },
            Api::PermissionDenied { message, code } | Api::Constraint { message, code, .. } => {
                CoreError::Policy { message, code }
            }
            Api::NoRowsAffected { table, id } => CoreError::Policy {
                message: format!(
                    "no row in {table} with id {id} was changed (missing or not permitted)"
                ),
                code: None,
            },
            Api::Api {
                status,
                message,
                code,
            } => {
                if status == 404 {
                    CoreError::NotFound {
                        entity_type: "resource".into(),
                        identifier: message,
                    }
                } else if status >= 500 {
                    CoreError::Transport {
                        reason: format!("HTTP {status}: {message}"),
                    }
                } else {
                    CoreError::Policy { message, code }
                }
            }
            Api::RealtimeConnect(reason) => CoreError::Transport {
                reason: format!("realtime connection failed: {reason}"),
            },
            Api::RealtimeClosed { code, reason } => CoreError::Transport {
                reason: format!("realtime socket closed (code {code}): {reason}"),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
