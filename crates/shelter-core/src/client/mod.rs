// ── Remote resource client ──
//
// The seam between shelter-core and whatever stores the rows. The real
// backend adapter, the timeout/retry wrapper and the in-memory backend
// all implement `ResourceClient`.

mod memory;
mod policy;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub use memory::{FailureKind, MemoryClient, Op};
pub use policy::PolicyClient;
pub use remote::RemoteClient;
pub use shelter_api::{ChangeOp, FilterOp, Query};

use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::model::{Collection, RecordId};

/// Row access and change notification for named collections.
///
/// No operation spans collections; callers own any cross-collection
/// consistency.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, CoreError>;

    /// Insert one row, returning it as stored.
    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, CoreError>;

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        patch: Value,
    ) -> Result<(), CoreError>;

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), CoreError>;

    /// Start receiving change notifications for `collection`. Dropping or
    /// unsubscribing the returned handle stops them.
    async fn subscribe(&self, collection: Collection) -> Result<Subscription, CoreError>;
}

/// Build the production client: backend adapter behind the
/// timeout/retry policy.
pub fn connect(config: &BackendConfig) -> Result<Arc<dyn ResourceClient>, CoreError> {
    let remote = RemoteClient::new(config)?;
    Ok(Arc::new(PolicyClient::new(remote, config.retry)))
}

/// Select and decode every row of `collection`.
pub async fn select_rows<T: DeserializeOwned>(
    client: &dyn ResourceClient,
    collection: Collection,
    query: &Query,
) -> Result<Vec<T>, CoreError> {
    client
        .select(collection, query)
        .await?
        .into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| CoreError::Decode {
                collection,
                message: e.to_string(),
            })
        })
        .collect()
}

// ── ChangeEvent ──────────────────────────────────────────────────────

/// One change notification. Consumed once to trigger a reload.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub collection: Collection,
    /// `None` when notifications were dropped and the exact change is
    /// unknown.
    pub op: Option<ChangeOp>,
    pub record: Value,
}

impl ChangeEvent {
    pub fn new(collection: Collection, op: ChangeOp, record: Value) -> Self {
        Self {
            collection,
            op: Some(op),
            record,
        }
    }

    pub fn missed(collection: Collection) -> Self {
        Self {
            collection,
            op: None,
            record: Value::Null,
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// Unsubscribe handle plus the notification receiver for one collection.
///
/// Cancelling is idempotent; dropping the handle cancels it.
pub struct Subscription {
    collection: Collection,
    events: broadcast::Receiver<ChangeEvent>,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn new(
        collection: Collection,
        events: broadcast::Receiver<ChangeEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            collection,
            events,
            cancel,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    /// Next notification, or `None` once unsubscribed or the source closed.
    /// A lagged receiver yields [`ChangeEvent::missed`].
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            received = self.events.recv() => match received {
                Ok(event) => Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(collection = %self.collection, skipped, "change feed lagged");
                    Some(ChangeEvent::missed(self.collection))
                }
                Err(broadcast::error::RecvError::Closed) => None,
            },
        }
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn unsubscribe(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
