// ── Deadline and retry wrapper ──
//
// Every call runs under a fixed deadline. Idempotent calls (select,
// update, delete) get one retry after a short pause when the failure is
// transient. Inserts and subscriptions are never retried.

use std::future::Future;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Query, ResourceClient, Subscription};
use crate::config::RetryPolicy;
use crate::error::CoreError;
use crate::model::{Collection, RecordId};

/// Wraps a [`ResourceClient`] with a [`RetryPolicy`].
pub struct PolicyClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: ResourceClient> PolicyClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    async fn with_deadline<T, F>(&self, fut: F) -> Result<T, CoreError>
    where
        F: Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        match tokio::time::timeout(self.policy.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                timeout_secs: self.policy.timeout.as_secs(),
            }),
        }
    }

    async fn idempotent<T, F, Fut>(
        &self,
        what: &'static str,
        collection: Collection,
        call: F,
    ) -> Result<T, CoreError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, CoreError>> + Send,
        T: Send,
    {
        let mut attempt: u32 = 0;
        loop {
            match self.with_deadline(call()).await {
                Err(e) if e.is_retryable() && attempt < self.policy.retries => {
                    attempt += 1;
                    warn!(%collection, op = what, attempt, error = %e, "transient failure, retrying");
                    tokio::time::sleep(self.policy.backoff).await;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl<C: ResourceClient> ResourceClient for PolicyClient<C> {
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, CoreError> {
        self.idempotent("select", collection, || self.inner.select(collection, query))
            .await
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, CoreError> {
        debug!(%collection, "insert (no retry)");
        self.with_deadline(self.inner.insert(collection, row)).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        patch: Value,
    ) -> Result<(), CoreError> {
        self.idempotent("update", collection, || {
            self.inner.update(collection, id, patch.clone())
        })
        .await
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), CoreError> {
        self.idempotent("delete", collection, || self.inner.delete(collection, id))
            .await
    }

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, CoreError> {
        self.with_deadline(self.inner.subscribe(collection)).await
    }
}
