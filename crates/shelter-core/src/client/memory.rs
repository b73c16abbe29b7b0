// ── In-memory backend ──
//
// A complete `ResourceClient` over process-local tables. Used by tests,
// demos and the CLI's `--offline` mode. Supports the same filter
// operators as the REST surface, per-collection latency, scripted
// failures, and change notifications for every write.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{ChangeEvent, ChangeOp, FilterOp, Query, ResourceClient, Subscription};
use crate::error::CoreError;
use crate::model::{Collection, RecordId};

const FEED_CAPACITY: usize = 256;

/// Operation kinds, for failure scripting and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Select,
    Insert,
    Update,
    Delete,
    Subscribe,
}

/// Error to produce from a scripted failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Backend refusal; surfaced verbatim.
    Policy(String),
    /// Network-level failure; retryable.
    Transport(String),
}

impl FailureKind {
    fn to_error(&self) -> CoreError {
        match self {
            Self::Policy(message) => CoreError::Policy {
                message: message.clone(),
                code: None,
            },
            Self::Transport(reason) => CoreError::Transport {
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Debug)]
struct FailureRule {
    collection: Collection,
    op: Op,
    kind: FailureKind,
    /// `None` fails forever.
    remaining: Option<usize>,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Collection, Vec<Value>>,
    failures: Vec<FailureRule>,
    latency: HashMap<Collection, Duration>,
    calls: HashMap<(Collection, Op), usize>,
    feeds: HashMap<Collection, broadcast::Sender<ChangeEvent>>,
    subscriptions: Vec<CancellationToken>,
}

/// Process-local backend. Cheap to clone; clones share tables.
#[derive(Clone, Default)]
pub struct MemoryClient {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-write; the data
        // is still usable.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // ── Setup ────────────────────────────────────────────────────────

    /// Replace a table's rows. Rows without an `id` get a fresh UUID.
    pub fn seed(&self, collection: Collection, rows: Vec<Value>) {
        let rows = rows.into_iter().map(with_defaults).collect();
        self.lock().tables.insert(collection, rows);
    }

    /// Current rows of a table, in insertion order.
    pub fn rows(&self, collection: Collection) -> Vec<Value> {
        self.lock()
            .tables
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn row(&self, collection: Collection, id: &RecordId) -> Option<Value> {
        let key = id.to_string();
        self.lock()
            .tables
            .get(&collection)?
            .iter()
            .find(|row| row_id_matches(row, &key))
            .cloned()
    }

    /// Delay every select on `collection`.
    pub fn set_latency(&self, collection: Collection, latency: Duration) {
        self.lock().latency.insert(collection, latency);
    }

    /// Fail the next `op` on `collection` once.
    pub fn fail_next(&self, collection: Collection, op: Op, kind: FailureKind) {
        self.lock().failures.push(FailureRule {
            collection,
            op,
            kind,
            remaining: Some(1),
        });
    }

    /// Fail every `op` on `collection` until cleared.
    pub fn fail_always(&self, collection: Collection, op: Op, kind: FailureKind) {
        self.lock().failures.push(FailureRule {
            collection,
            op,
            kind,
            remaining: None,
        });
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    // ── Introspection ────────────────────────────────────────────────

    pub fn call_count(&self, collection: Collection, op: Op) -> usize {
        self.lock()
            .calls
            .get(&(collection, op))
            .copied()
            .unwrap_or(0)
    }

    /// Subscriptions that have not been cancelled yet.
    pub fn active_subscriptions(&self) -> usize {
        let mut state = self.lock();
        state.subscriptions.retain(|t| !t.is_cancelled());
        state.subscriptions.len()
    }

    /// Publish a change as if another client had written it.
    pub fn emit(&self, collection: Collection, op: ChangeOp, record: Value) {
        let state = self.lock();
        if let Some(tx) = state.feeds.get(&collection) {
            let _ = tx.send(ChangeEvent::new(collection, op, record));
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Count the call and return the scripted failure, if one applies.
    fn enter(&self, collection: Collection, op: Op) -> Result<(), CoreError> {
        let mut state = self.lock();
        *state.calls.entry((collection, op)).or_insert(0) += 1;

        let Some(pos) = state
            .failures
            .iter()
            .position(|f| f.collection == collection && f.op == op)
        else {
            return Ok(());
        };

        let rule = &mut state.failures[pos];
        let err = rule.kind.to_error();
        let exhausted = match rule.remaining.as_mut() {
            Some(n) => {
                *n = n.saturating_sub(1);
                *n == 0
            }
            None => false,
        };
        if exhausted {
            state.failures.remove(pos);
        }
        Err(err)
    }

    fn notify(state: &MemoryState, collection: Collection, op: ChangeOp, record: &Value) {
        if let Some(tx) = state.feeds.get(&collection) {
            let _ = tx.send(ChangeEvent::new(collection, op, record.clone()));
        }
    }
}

#[async_trait]
impl ResourceClient for MemoryClient {
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, CoreError> {
        self.enter(collection, Op::Select)?;

        // Rows are read when the call starts; latency delays the answer.
        let (mut rows, latency) = {
            let state = self.lock();
            let rows: Vec<Value> = state
                .tables
                .get(&collection)
                .map(|rows| {
                    rows.iter()
                        .filter(|row| {
                            query
                                .filters
                                .iter()
                                .all(|f| filter_matches(row, &f.column, f.op, &f.value))
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            (rows, state.latency.get(&collection).copied())
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        for order in query.order.iter().rev() {
            rows.sort_by(|a, b| {
                let ord = compare_values(&a[&order.column], &b[&order.column]);
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        debug!(%collection, rows = rows.len(), "memory select");
        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, CoreError> {
        self.enter(collection, Op::Insert)?;
        if !row.is_object() {
            return Err(CoreError::Policy {
                message: "row must be a JSON object".into(),
                code: Some("22023".into()),
            });
        }

        let stored = with_defaults(row);
        let mut state = self.lock();
        state
            .tables
            .entry(collection)
            .or_default()
            .push(stored.clone());
        Self::notify(&state, collection, ChangeOp::Insert, &stored);
        Ok(stored)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        patch: Value,
    ) -> Result<(), CoreError> {
        self.enter(collection, Op::Update)?;
        let Value::Object(patch) = patch else {
            return Err(CoreError::Policy {
                message: "patch must be a JSON object".into(),
                code: Some("22023".into()),
            });
        };

        let key = id.to_string();
        let mut state = self.lock();
        let updated = state
            .tables
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row_id_matches(row, &key)))
            .map(|row| {
                if let Value::Object(fields) = row {
                    for (k, v) in patch {
                        fields.insert(k, v);
                    }
                }
                row.clone()
            });

        match updated {
            Some(row) => {
                Self::notify(&state, collection, ChangeOp::Update, &row);
                Ok(())
            }
            None => Err(no_rows(collection, &key)),
        }
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), CoreError> {
        self.enter(collection, Op::Delete)?;

        let key = id.to_string();
        let mut state = self.lock();
        let removed = state.tables.get_mut(&collection).and_then(|rows| {
            let pos = rows.iter().position(|row| row_id_matches(row, &key))?;
            Some(rows.remove(pos))
        });

        match removed {
            Some(row) => {
                Self::notify(&state, collection, ChangeOp::Delete, &row);
                Ok(())
            }
            None => Err(no_rows(collection, &key)),
        }
    }

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, CoreError> {
        self.enter(collection, Op::Subscribe)?;

        let mut state = self.lock();
        let rx = state
            .feeds
            .entry(collection)
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe();
        let cancel = CancellationToken::new();
        state.subscriptions.push(cancel.clone());
        debug!(%collection, "memory subscribe");
        Ok(Subscription::new(collection, rx, cancel))
    }
}

// ── Row helpers ──────────────────────────────────────────────────────

fn no_rows(collection: Collection, id: &str) -> CoreError {
    CoreError::Policy {
        message: format!("no row in {collection} with id {id} was changed (missing or not permitted)"),
        code: None,
    }
}

fn with_defaults(row: Value) -> Value {
    let Value::Object(mut fields) = row else {
        return row;
    };
    fields
        .entry("id")
        .or_insert_with(|| Value::from(RecordId::new_v4().to_string()));
    fields
        .entry("created_at")
        .or_insert_with(|| Value::from(chrono::Utc::now().to_rfc3339()));
    Value::Object(fields)
}

fn row_id_matches(row: &Value, key: &str) -> bool {
    row.get("id").is_some_and(|id| render(id) == key)
}

/// Render a JSON value the way it appears in a query string.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

fn filter_matches(row: &Value, column: &str, op: FilterOp, expected: &str) -> bool {
    let actual = row.get(column).unwrap_or(&Value::Null);
    match op {
        FilterOp::Eq => !actual.is_null() && render(actual) == expected,
        FilterOp::Neq => !actual.is_null() && render(actual) != expected,
        FilterOp::Ilike => actual
            .as_str()
            .is_some_and(|s| wildcard_match(&expected.to_lowercase(), &s.to_lowercase())),
        FilterOp::Is => match expected {
            "null" => actual.is_null(),
            "true" => actual.as_bool() == Some(true),
            "false" => actual.as_bool() == Some(false),
            _ => false,
        },
    }
}

/// `*` / `%` match any run of characters, `_` exactly one.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        match p.get(pi) {
            Some('*' | '%') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '_' || c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    pi = sp + 1;
                    ti = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|c| matches!(c, '*' | '%'))
}

/// Nulls compare greater than any value (last ascending, first
/// descending, as Postgres orders them); numbers numerically; everything
/// else by rendering.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        _ => render(a).cmp(&render(b)),
    }
}
