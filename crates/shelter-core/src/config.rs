// ── Runtime backend configuration ──
//
// Describes *how* to reach the shelter backend. Carries credentials and
// tuning but never touches disk; the CLI builds a `BackendConfig` from
// its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default for hosted backends.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development stacks with self-signed certs).
    DangerAcceptInvalid,
}

/// Deadline and retry rules applied to every remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Hard deadline per attempt.
    pub timeout: Duration,
    /// Extra attempts for idempotent calls after a transient failure.
    pub retries: u32,
    /// Fixed pause before a retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            retries: 1,
            backoff: Duration::from_millis(250),
        }
    }
}

/// Configuration for talking to one backend project.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL (e.g. `https://abc.supabase.co`).
    pub url: Url,
    /// Project API key.
    pub api_key: SecretString,
    /// Signed-in user's access token, if any.
    pub access_token: Option<SecretString>,
    pub tls: TlsVerification,
    pub retry: RetryPolicy,
    /// Subscribe to realtime change notifications.
    pub realtime_enabled: bool,
    /// Quiet period for batching change notifications into one reload.
    pub coalesce_window: Duration,
}

impl BackendConfig {
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            access_token: None,
            tls: TlsVerification::default(),
            retry: RetryPolicy::default(),
            realtime_enabled: true,
            coalesce_window: Duration::from_millis(200),
        }
    }
}
