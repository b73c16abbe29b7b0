//! Realtime change feed with auto-reconnect.
//!
//! Connects to the backend's Phoenix-channel websocket, joins one
//! `postgres_changes` channel per table, and streams parsed row changes
//! through a [`tokio::sync::broadcast`] channel. Handles heartbeats and
//! reconnection with exponential backoff + jitter automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelter_api::realtime::{RealtimeHandle, ReconnectConfig};
//! use tokio_util::sync::CancellationToken;
//!
//! let cancel = CancellationToken::new();
//! let handle = RealtimeHandle::connect(
//!     &base_url,
//!     &api_key,
//!     vec!["adopt_animals".into()],
//!     ReconnectConfig::default(),
//!     cancel.clone(),
//! )?;
//! let mut rx = handle.subscribe();
//!
//! while let Ok(change) = rx.recv().await {
//!     println!("{} {:?}", change.table, change.op);
//! }
//!
//! handle.shutdown();
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Channel / protocol constants ─────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 1024;
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);
const PROTOCOL_VSN: &str = "1.0.0";

// ── ChangeMessage ────────────────────────────────────────────────────

/// Row operation reported by the change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One row change from a `postgres_changes` channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeMessage {
    pub table: String,

    #[serde(rename = "type")]
    pub op: ChangeOp,

    #[serde(default)]
    pub commit_timestamp: Option<String>,

    /// New row image (empty object for deletes).
    #[serde(default)]
    pub record: Value,

    /// Old row image; only the primary key unless replica identity is full.
    #[serde(default)]
    pub old_record: Value,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for websocket reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── RealtimeHandle ───────────────────────────────────────────────────

/// Handle to a running change-feed connection.
///
/// Cancelling the token (directly or via [`shutdown`](Self::shutdown))
/// leaves every joined channel and tears down the background task.
pub struct RealtimeHandle {
    event_rx: broadcast::Receiver<Arc<ChangeMessage>>,
    cancel: CancellationToken,
}

impl RealtimeHandle {
    /// Spawn the connection loop for `tables`.
    ///
    /// Returns once the background task is spawned; the first connection
    /// attempt happens asynchronously. Must be called inside a Tokio runtime.
    pub fn connect(
        base_url: &Url,
        api_key: &SecretString,
        tables: Vec<String>,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let ws_url = websocket_url(base_url, api_key)?;
        let (event_tx, event_rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(ws_url, tables, event_tx, reconnect, task_cancel).await;
        });

        Ok(Self { event_rx, cancel })
    }

    /// Get a new broadcast receiver for the change stream.
    ///
    /// Multiple consumers can subscribe concurrently. If a consumer falls
    /// behind, it receives [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeMessage>> {
        self.event_rx.resubscribe()
    }

    /// Signal the background task to shut down gracefully.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// `{base}/realtime/v1/websocket?apikey=..&vsn=1.0.0` with an http(s)
/// scheme swapped for ws(s).
pub fn websocket_url(base_url: &Url, api_key: &SecretString) -> Result<Url, Error> {
    let mut url = base_url.join("realtime/v1/websocket")?;
    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(Error::RealtimeConnect(format!(
                "unsupported URL scheme '{other}'"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| Error::RealtimeConnect(format!("cannot switch scheme to {scheme}")))?;
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", api_key.expose_secret())
        .append_pair("vsn", PROTOCOL_VSN);
    Ok(url)
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → join → read → on error, backoff → reconnect.
async fn ws_loop(
    ws_url: Url,
    tables: Vec<String>,
    event_tx: broadcast::Sender<Arc<ChangeMessage>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &tables, &event_tx, &cancel) => {
                match result {
                    // Clean disconnect: reset the attempt counter and reconnect.
                    Ok(()) => {
                        if cancel.is_cancelled() {
                            break;
                        }
                        tracing::info!("Realtime socket disconnected cleanly, reconnecting");
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "Realtime socket error");

                        if let Some(max) = reconnect.max_retries {
                            if attempt >= max {
                                tracing::error!(
                                    max_retries = max,
                                    "Realtime reconnection limit reached, giving up"
                                );
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "Waiting before reconnect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        }
    }

    tracing::debug!("Realtime loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one websocket connection, join every table channel, and read
/// frames until the socket drops or the token is cancelled.
async fn connect_and_read(
    url: &Url,
    tables: &[String],
    event_tx: &broadcast::Sender<Arc<ChangeMessage>>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(host = url.host_str().unwrap_or(""), "Connecting to realtime socket");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::RealtimeConnect(e.to_string()))?;

    tracing::info!(tables = ?tables, "Realtime socket connected");

    let (mut write, mut read) = ws_stream.split();
    let mut refs = RefCounter::default();

    for table in tables {
        let frame = join_frame(table, refs.next_ref());
        write
            .send(tungstenite::Message::text(frame.to_string()))
            .await
            .map_err(|e| Error::RealtimeConnect(e.to_string()))?;
    }

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                for table in tables {
                    let frame = leave_frame(table, refs.next_ref());
                    let _ = write.send(tungstenite::Message::text(frame.to_string())).await;
                }
                let _ = write.close().await;
                return Ok(());
            }
            _ = heartbeat.tick() => {
                let frame = heartbeat_frame(refs.next_ref());
                write
                    .send(tungstenite::Message::text(frame.to_string()))
                    .await
                    .map_err(|e| Error::RealtimeConnect(e.to_string()))?;
                tracing::trace!("Realtime heartbeat sent");
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, event_tx)?;
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            tracing::info!(
                                code = %cf.code,
                                reason = %cf.reason,
                                "Realtime close frame received"
                            );
                            return Err(Error::RealtimeClosed {
                                code: u16::from(cf.code),
                                reason: cf.reason.to_string(),
                            });
                        }
                        tracing::info!("Realtime close frame received (no payload)");
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::RealtimeConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("Realtime stream ended");
                        return Ok(());
                    }
                    // Ping is answered by tungstenite; binary/pong ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

// ── Phoenix framing ──────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RefCounter(u64);

impl RefCounter {
    fn next_ref(&mut self) -> String {
        self.0 += 1;
        self.0.to_string()
    }
}

fn channel_topic(table: &str) -> String {
    format!("realtime:public:{table}")
}

fn join_frame(table: &str, msg_ref: String) -> Value {
    json!({
        "topic": channel_topic(table),
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [
                    { "event": "*", "schema": "public", "table": table }
                ]
            }
        },
        "ref": msg_ref,
        "join_ref": msg_ref,
    })
}

fn leave_frame(table: &str, msg_ref: String) -> Value {
    json!({
        "topic": channel_topic(table),
        "event": "phx_leave",
        "payload": {},
        "ref": msg_ref,
    })
}

fn heartbeat_frame(msg_ref: String) -> Value {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": msg_ref,
    })
}

/// Raw Phoenix message envelope.
#[derive(Debug, Deserialize)]
struct PhxMessage {
    topic: String,
    event: String,
    #[serde(default)]
    payload: Value,
}

/// Parse a text frame and broadcast any row change inside it.
///
/// Channel-level errors (`phx_error`, a failed join reply) are returned
/// so the caller reconnects; everything else unrecognised is skipped.
fn parse_and_broadcast(
    text: &str,
    event_tx: &broadcast::Sender<Arc<ChangeMessage>>,
) -> Result<(), Error> {
    let msg: PhxMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "Failed to parse realtime frame");
            return Ok(());
        }
    };

    match msg.event.as_str() {
        "postgres_changes" => {
            let Some(data) = msg.payload.get("data") else {
                tracing::debug!(topic = %msg.topic, "postgres_changes frame without data");
                return Ok(());
            };
            match serde_json::from_value::<ChangeMessage>(data.clone()) {
                Ok(change) => {
                    tracing::debug!(table = %change.table, op = ?change.op, "Row change");
                    // No active subscribers is not an error.
                    let _ = event_tx.send(Arc::new(change));
                }
                Err(e) => {
                    tracing::debug!(error = %e, topic = %msg.topic, "Could not decode row change");
                }
            }
            Ok(())
        }
        "phx_reply" => {
            let status = msg.payload["status"].as_str().unwrap_or("");
            if status == "error" && msg.topic != "phoenix" {
                let reason = msg.payload["response"]["reason"]
                    .as_str()
                    .unwrap_or("join refused")
                    .to_owned();
                return Err(Error::RealtimeConnect(format!("{}: {reason}", msg.topic)));
            }
            tracing::trace!(topic = %msg.topic, status, "Realtime reply");
            Ok(())
        }
        "phx_error" => Err(Error::RealtimeConnect(format!(
            "channel {} crashed",
            msg.topic
        ))),
        "phx_close" => {
            tracing::debug!(topic = %msg.topic, "Realtime channel closed");
            Ok(())
        }
        other => {
            tracing::trace!(topic = %msg.topic, event = other, "Ignoring realtime frame");
            Ok(())
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25% to spread out reconnection storms from multiple clients.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = calculate_backoff(10, &config);
        assert!(
            d10 <= Duration::from_secs(13),
            "delay at attempt 10 ({d10:?}) should be capped near max_delay"
        );
    }

    #[test]
    fn websocket_url_swaps_scheme_and_adds_key() {
        let base = Url::parse("https://abc.supabase.co").unwrap();
        let key = SecretString::from("anon".to_owned());
        let url = websocket_url(&base, &key).unwrap();
        assert_eq!(
            url.as_str(),
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=anon&vsn=1.0.0"
        );

        let local = Url::parse("http://localhost:54321/").unwrap();
        assert_eq!(websocket_url(&local, &key).unwrap().scheme(), "ws");
    }

    #[test]
    fn join_frame_targets_table_channel() {
        let frame = join_frame("rescued_animals", "1".into());
        assert_eq!(frame["topic"], "realtime:public:rescued_animals");
        assert_eq!(frame["event"], "phx_join");
        let change = &frame["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["event"], "*");
        assert_eq!(change["table"], "rescued_animals");
    }

    #[test]
    fn ref_counter_is_monotonic() {
        let mut refs = RefCounter::default();
        assert_eq!(refs.next_ref(), "1");
        assert_eq!(refs.next_ref(), "2");
    }

    #[test]
    fn broadcasts_postgres_change() {
        let (tx, mut rx) = broadcast::channel(16);

        let raw = json!({
            "topic": "realtime:public:adopt_animals",
            "event": "postgres_changes",
            "payload": {
                "ids": [123],
                "data": {
                    "schema": "public",
                    "table": "adopt_animals",
                    "commit_timestamp": "2026-03-01T10:00:00Z",
                    "type": "UPDATE",
                    "record": { "id": "a1", "name": "Rex", "current_status": "Adopted" },
                    "old_record": { "id": "a1" }
                }
            },
            "ref": null
        });

        parse_and_broadcast(&raw.to_string(), &tx).unwrap();

        let change = rx.try_recv().unwrap();
        assert_eq!(change.table, "adopt_animals");
        assert_eq!(change.op, ChangeOp::Update);
        assert_eq!(change.record["name"], "Rex");
        assert_eq!(change.old_record["id"], "a1");
    }

    #[test]
    fn failed_join_reply_is_an_error() {
        let (tx, _rx) = broadcast::channel::<Arc<ChangeMessage>>(16);
        let raw = json!({
            "topic": "realtime:public:admins",
            "event": "phx_reply",
            "payload": { "status": "error", "response": { "reason": "unauthorized" } },
            "ref": "1"
        });
        let err = parse_and_broadcast(&raw.to_string(), &tx).unwrap_err();
        assert!(err.to_string().contains("unauthorized"));
    }

    #[test]
    fn heartbeat_reply_is_ignored() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeMessage>>(16);
        let raw = json!({
            "topic": "phoenix",
            "event": "phx_reply",
            "payload": { "status": "ok", "response": {} },
            "ref": "3"
        });
        parse_and_broadcast(&raw.to_string(), &tx).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn malformed_frame_is_skipped() {
        let (tx, mut rx) = broadcast::channel::<Arc<ChangeMessage>>(16);
        parse_and_broadcast("not json at all", &tx).unwrap();
        assert!(rx.try_recv().is_err());
    }
}
