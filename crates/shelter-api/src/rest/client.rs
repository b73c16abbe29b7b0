// REST HTTP client
//
// Wraps `reqwest::Client` with table URL construction, the
// `return=representation` write convention, and error-body mapping.
// Auth headers come from `TransportConfig` as client defaults.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::query::Query;
use crate::error::Error;
use crate::transport::TransportConfig;

const PREFER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Raw HTTP client for the backend's table endpoints.
///
/// All writes ask for the affected rows back. An empty representation on
/// update or delete means the filter matched nothing, which is reported as
/// [`Error::NoRowsAffected`] rather than silent success.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Error envelope returned by the REST surface.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl RestClient {
    /// Create a client from a `TransportConfig`. `base_url` is the project
    /// root, e.g. `https://abc.supabase.co`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/rest/v1/{table}`
    pub(crate) fn table_url(&self, table: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/rest/v1/{}",
            self.base_url.as_str().trim_end_matches('/'),
            table
        );
        Ok(Url::parse(&full)?)
    }

    // ── Table operations ─────────────────────────────────────────────

    /// Select rows matching `query`.
    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, Error> {
        let url = self.table_url(table)?;
        debug!(table, "GET {}", url);

        let resp = self
            .http
            .get(url)
            .query(&query.to_pairs())
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_rows(resp).await
    }

    /// Insert one row and return it as stored (defaults and ids filled in).
    pub async fn insert(&self, table: &str, row: &Value) -> Result<Value, Error> {
        let url = self.table_url(table)?;
        debug!(table, "POST {}", url);

        let resp = self
            .http
            .post(url)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(row)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Deserialization {
                message: format!("insert into '{table}' returned no representation"),
                body: String::new(),
            })
    }

    /// Patch the row with primary key `id`; returns the updated row.
    pub async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, Error> {
        let url = self.table_url(table)?;
        debug!(table, id, "PATCH {}", url);

        let resp = self
            .http
            .patch(url)
            .query(&[("id", format!("eq.{id}"))])
            .header(PREFER, RETURN_REPRESENTATION)
            .json(patch)
            .send()
            .await
            .map_err(Error::Transport)?;

        parse_rows(resp)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoRowsAffected {
                table: table.to_owned(),
                id: id.to_owned(),
            })
    }

    /// Delete the row with primary key `id`.
    pub async fn delete(&self, table: &str, id: &str) -> Result<(), Error> {
        let url = self.table_url(table)?;
        debug!(table, id, "DELETE {}", url);

        let resp = self
            .http
            .delete(url)
            .query(&[("id", format!("eq.{id}"))])
            .header(PREFER, RETURN_REPRESENTATION)
            .send()
            .await
            .map_err(Error::Transport)?;

        if parse_rows(resp).await?.is_empty() {
            return Err(Error::NoRowsAffected {
                table: table.to_owned(),
                id: id.to_owned(),
            });
        }
        Ok(())
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Read a JSON array of rows, or map a non-2xx response to an error.
async fn parse_rows(resp: reqwest::Response) -> Result<Vec<Value>, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(map_error(status, &body));
    }

    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body,
    })
}

/// Map an error response to the matching `Error` variant.
///
/// Row-level-security denials arrive as SQLSTATE `42501` with either 401
/// or 403; constraint violations as SQLSTATE class `23` (usually 409).
fn map_error(status: StatusCode, body: &str) -> Error {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.code.clone();

    let mut message = parsed
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_owned()
            } else {
                body.trim().to_owned()
            }
        });
    if let Some(hint) = parsed.hint.as_deref().filter(|h| !h.is_empty()) {
        message = format!("{message} (hint: {hint})");
    }

    let code_str = code.as_deref().unwrap_or("");

    if code_str == "42501" || status == StatusCode::FORBIDDEN {
        return Error::PermissionDenied { message, code };
    }
    if code_str.starts_with("23") || status == StatusCode::CONFLICT {
        return Error::Constraint {
            message,
            code,
            details: parsed.details,
        };
    }
    if status == StatusCode::UNAUTHORIZED {
        return Error::Authentication { message };
    }

    Error::Api {
        status: status.as_u16(),
        message,
        code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rls_denial_maps_to_permission_denied() {
        let body = r#"{"code":"42501","details":null,"hint":null,"message":"new row violates row-level security policy for table \"adopt_animals\""}"#;
        let err = map_error(StatusCode::UNAUTHORIZED, body);
        assert!(matches!(err, Error::PermissionDenied { .. }));
        assert!(err.to_string().contains("row-level security"));
    }

    #[test]
    fn unique_violation_maps_to_constraint() {
        let body = r#"{"code":"23505","details":"Key (email)=(a@b.co) already exists.","hint":null,"message":"duplicate key value violates unique constraint"}"#;
        match map_error(StatusCode::CONFLICT, body) {
            Error::Constraint { code, details, .. } => {
                assert_eq!(code.as_deref(), Some("23505"));
                assert!(details.unwrap_or_default().contains("already exists"));
            }
            other => panic!("expected Constraint, got {other:?}"),
        }
    }

    #[test]
    fn non_json_body_is_kept_as_message() {
        let err = map_error(StatusCode::BAD_GATEWAY, "upstream connect error");
        match err {
            Error::Api {
                status, message, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream connect error");
            }
            other => panic!("expected Api, got {other:?}"),
        }
    }

    #[test]
    fn hint_is_appended() {
        let body = r#"{"code":"PGRST204","message":"Could not find the 'colour' column","hint":"Check the column name"}"#;
        let err = map_error(StatusCode::BAD_REQUEST, body);
        assert!(err.to_string().contains("hint: Check the column name"));
    }
}
