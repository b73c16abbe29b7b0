//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use shelter_config::ConfigError;
use shelter_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const PARTIAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the shelter backend: {reason}")]
    #[diagnostic(
        code(shelter::connection_failed),
        help("Check the profile URL and your network connection.\nTry: shelter config show")
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(shelter::timeout),
        help("Increase the deadline with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("No API key configured for profile '{profile}'")]
    #[diagnostic(
        code(shelter::no_credentials),
        help(
            "Configure credentials with: shelter config init\n\
             Or set the SHELTER_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Backend refusals ─────────────────────────────────────────────
    #[error("Rejected by backend: {message}")]
    #[diagnostic(
        code(shelter::rejected),
        help("Your account may lack permission for this table, or a constraint failed.")
    )]
    Rejected { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(shelter::not_found),
        help("Run: shelter {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(shelter::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(shelter::partial_failure),
        help(
            "Nothing was rolled back. The record now differs between listings \
             and may need to be fixed by hand; run the command again once the \
             failed listing is reachable."
        )
    )]
    PartialFailure { message: String },

    #[error("{message}")]
    #[diagnostic(code(shelter::write_failed))]
    WriteFailed { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(shelter::validation))]
    Validation { field: String, reason: String },

    #[error("The form has errors:\n{}", format_fields(.fields))]
    #[diagnostic(code(shelter::invalid_form), help("Fix the listed fields and submit again."))]
    InvalidForm { fields: Vec<(String, String)> },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(shelter::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: shelter config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(shelter::no_config),
        help(
            "Create one with: shelter config init\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(shelter::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(shelter::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Other ────────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(shelter::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_fields(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(field, message)| format!("  {field}: {message}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Rejected { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            Self::Validation { .. }
            | Self::InvalidForm { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Validation { fields } => CliError::InvalidForm { fields },

            CoreError::InvalidStatus { value } => CliError::Validation {
                field: "status".into(),
                reason: format!(
                    "'{value}' is not one of Available, Adopted, Under Care (exact spelling)"
                ),
            },

            CoreError::InvalidTransition { .. } | CoreError::Busy => {
                CliError::Conflict { message }
            }

            CoreError::Transport { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Policy { message, .. } => CliError::Rejected { message },

            CoreError::PartialFailure { .. } => CliError::PartialFailure { message },

            CoreError::WritesFailed { .. } => CliError::WriteFailed { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command(&entity_type),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Decode { .. }
            | CoreError::NotReady
            | CoreError::Unmounted
            | CoreError::Internal(_) => CliError::Internal(message),
        }
    }
}

fn list_command(entity_type: &str) -> String {
    match entity_type {
        "Animal" => "animals list",
        "adoptions" => "adoptions list",
        "donations" => "donations list",
        "volunteers" => "volunteers list",
        "contacts" => "messages list",
        "lost_found_submissions" => "lost-found list",
        "gov_rules" => "rules list",
        _ => "--help",
    }
    .into()
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see: shelter config profiles)".into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use shelter_core::{Collection, WriteFailure};

    use super::*;

    #[test]
    fn partial_failure_has_its_own_exit_code() {
        let err = CliError::from(CoreError::PartialFailure {
            operation: "set status".into(),
            succeeded: vec![Collection::AdoptAnimals],
            failed: vec![WriteFailure {
                collection: Collection::RescuedAnimals,
                reason: "permission denied".into(),
            }],
        });
        assert_eq!(err.exit_code(), exit_code::PARTIAL);
        let text = err.to_string();
        assert!(text.contains("adopt_animals"));
        assert!(text.contains("rescued_animals"));
    }

    #[test]
    fn form_errors_list_every_field() {
        let err = CliError::from(CoreError::Validation {
            fields: vec![
                ("email".into(), "Please enter a valid email address".into()),
                ("phone".into(), "Phone number must be exactly 10 digits".into()),
            ],
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
        let text = err.to_string();
        assert!(text.contains("  email: Please enter a valid email address"));
        assert!(text.contains("  phone: Phone number must be exactly 10 digits"));
    }

    #[test]
    fn policy_message_is_kept_verbatim() {
        let err = CliError::from(CoreError::Policy {
            message: "new row violates row-level security policy for table \"donations\"".into(),
            code: Some("42501".into()),
        });
        assert_eq!(err.exit_code(), exit_code::PERMISSION);
        assert!(err.to_string().contains("row-level security policy"));
    }
}
