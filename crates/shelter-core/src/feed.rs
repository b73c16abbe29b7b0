// ── Change feed coordination ──
//
// Owns every subscription a view needs and turns their notifications
// into coalesced reloads. One pump task per subscription forwards into a
// bounded channel; a single coalescer waits out a short quiet window,
// drains whatever piled up, and runs the reload once.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ResourceClient, Subscription};
use crate::error::CoreError;
use crate::model::Collection;

const PENDING_CAPACITY: usize = 64;

/// Subscriptions for one view plus the task that reloads it.
///
/// [`shutdown`](Self::shutdown) is idempotent and also runs on drop.
pub struct ChangeFeedCoordinator {
    collections: Vec<Collection>,
    cancel: CancellationToken,
    subscriptions: Vec<CancellationToken>,
    shut_down: AtomicBool,
}

impl ChangeFeedCoordinator {
    /// Subscribe to every collection and start reloading on change.
    ///
    /// If any subscription fails, the ones already established are torn
    /// down before the error is returned.
    pub async fn start<F, Fut>(
        client: &dyn ResourceClient,
        collections: &[Collection],
        window: Duration,
        reload: F,
    ) -> Result<Self, CoreError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut subscriptions: Vec<Subscription> = Vec::with_capacity(collections.len());
        for &collection in collections {
            match client.subscribe(collection).await {
                Ok(sub) => subscriptions.push(sub),
                Err(e) => {
                    warn!(%collection, error = %e, "subscribe failed, tearing down feed");
                    for sub in &subscriptions {
                        sub.unsubscribe();
                    }
                    return Err(e);
                }
            }
        }

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(PENDING_CAPACITY);
        let tokens = subscriptions.iter().map(Subscription::cancel_token).collect();

        for sub in subscriptions {
            tokio::spawn(pump(sub, tx.clone(), cancel.clone()));
        }
        drop(tx);
        tokio::spawn(coalesce(rx, window, reload, cancel.clone()));

        info!(?collections, "change feed started");
        Ok(Self {
            collections: collections.to_vec(),
            cancel,
            subscriptions: tokens,
            shut_down: AtomicBool::new(false),
        })
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn is_active(&self) -> bool {
        !self.shut_down.load(Ordering::Acquire)
    }

    /// Unsubscribe from everything and stop reloading.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        for token in &self.subscriptions {
            token.cancel();
        }
        self.cancel.cancel();
        debug!(collections = ?self.collections, "change feed shut down");
    }
}

impl Drop for ChangeFeedCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn pump(mut sub: Subscription, tx: mpsc::Sender<Collection>, cancel: CancellationToken) {
    let collection = sub.collection();
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            event = sub.recv() => match event {
                Some(event) => {
                    debug!(%collection, op = ?event.op, "change notification");
                    // Full means a reload is already pending.
                    let _ = tx.try_send(collection);
                }
                None => break,
            },
        }
    }
}

async fn coalesce<F, Fut>(
    mut rx: mpsc::Receiver<Collection>,
    window: Duration,
    reload: F,
    cancel: CancellationToken,
) where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    loop {
        let first = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = rx.recv() => match next {
                Some(collection) => collection,
                None => break,
            },
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(window) => {}
        }

        let mut batched = 1usize;
        while rx.try_recv().is_ok() {
            batched += 1;
        }
        debug!(trigger = %first, batched, "coalesced reload");
        reload().await;
    }
}
