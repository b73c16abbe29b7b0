// Shared transport configuration for building reqwest::Client instances.
//
// The REST client and the realtime socket share the API key, access
// token, TLS and timeout settings through this module.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

const USER_AGENT: &str = concat!("shelter/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (self-hosted development backends).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Project API key, sent as the `apikey` header on every request.
    pub api_key: SecretString,
    /// Signed-in user's access token. Falls back to the API key for the
    /// `Authorization` header when absent (anonymous role).
    pub access_token: Option<SecretString>,
}

impl TransportConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(15),
            api_key,
            access_token: None,
        }
    }

    /// Headers every backend request must carry.
    pub fn auth_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();

        let key = self.api_key.expose_secret();
        headers.insert(HeaderName::from_static("apikey"), header_value(key)?);

        let bearer = self
            .access_token
            .as_ref()
            .map_or(key, |token| token.expose_secret());
        let mut auth = header_value(&format!("Bearer {bearer}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(headers)
    }

    /// Build a `reqwest::Client` with auth headers installed as defaults.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(self.auth_headers()?);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(raw).map_err(|e| Error::Authentication {
        message: format!("credential is not a valid header value: {e}"),
    })
}
