// ── Admin list controller ──
//
// One controller per admin section. Loads every collection of its view
// in parallel, publishes the result through a `ViewStore`, keeps it
// fresh from the change feed, and serialises user-triggered changes.

mod animals;
mod sections;
mod state;
mod view;

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

pub use state::ListState;
pub use view::{AnimalsView, ListView, Loaded, TableView};

use crate::client::ResourceClient;
use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::feed::ChangeFeedCoordinator;
use crate::model::{
    AdoptionRequest, ContactMessageRow, Donation, GovRule, LostFoundSubmission, Volunteer,
};
use crate::reconcile::Diagnostic;
use crate::store::{Snapshot, ViewStore};
use crate::stream::ViewStream;

pub type AnimalsController = ListController<AnimalsView>;
pub type AdoptionsController = ListController<TableView<AdoptionRequest>>;
pub type DonationsController = ListController<TableView<Donation>>;
pub type VolunteersController = ListController<TableView<Volunteer>>;
pub type MessagesController = ListController<TableView<ContactMessageRow>>;
pub type LostFoundController = ListController<TableView<LostFoundSubmission>>;
pub type RulesController = ListController<TableView<GovRule>>;

/// Controller tuning, normally taken from [`BackendConfig`].
#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    /// Subscribe to the change feed after the first successful load.
    pub realtime: bool,
    pub coalesce_window: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            realtime: true,
            coalesce_window: Duration::from_millis(200),
        }
    }
}

impl From<&BackendConfig> for ControllerOptions {
    fn from(config: &BackendConfig) -> Self {
        Self {
            realtime: config.realtime_enabled,
            coalesce_window: config.coalesce_window,
        }
    }
}

// ── ListController ───────────────────────────────────────────────────

/// Cheaply cloneable via `Arc<ControllerInner>`.
pub struct ListController<V: ListView> {
    inner: Arc<ControllerInner<V>>,
}

impl<V: ListView> Clone for ListController<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ControllerInner<V: ListView> {
    client: Arc<dyn ResourceClient>,
    view: V,
    options: ControllerOptions,
    store: ViewStore<V::Item>,
    state: watch::Sender<ListState>,
    diagnostics: watch::Sender<Arc<Vec<Diagnostic>>>,
    /// Sequence number of the newest load issued.
    issued: AtomicU64,
    /// Sequence number of the newest load applied. Older results are
    /// discarded.
    applied: std::sync::Mutex<u64>,
    mutating: AtomicBool,
    mounted: AtomicBool,
    unmounted: AtomicBool,
    feed: Mutex<Option<ChangeFeedCoordinator>>,
}

impl<V: ListView> ListController<V> {
    pub fn new(client: Arc<dyn ResourceClient>, view: V, options: ControllerOptions) -> Self {
        let (state, _) = watch::channel(ListState::Idle);
        let (diagnostics, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            inner: Arc::new(ControllerInner {
                client,
                view,
                options,
                store: ViewStore::new(),
                state,
                diagnostics,
                issued: AtomicU64::new(0),
                applied: std::sync::Mutex::new(0),
                mutating: AtomicBool::new(false),
                mounted: AtomicBool::new(false),
                unmounted: AtomicBool::new(false),
                feed: Mutex::new(None),
            }),
        }
    }

    pub fn view(&self) -> &V {
        &self.inner.view
    }

    pub fn client(&self) -> &Arc<dyn ResourceClient> {
        &self.inner.client
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Initial load, then subscribe to the change feed.
    ///
    /// A failed load leaves the controller in `LoadError` without
    /// subscribing; calling `mount` again retries.
    pub async fn mount(&self) -> Result<(), CoreError> {
        if self.inner.unmounted.load(Ordering::Acquire) {
            return Err(CoreError::Unmounted);
        }

        self.inner.reload().await?;
        if self.inner.mounted.swap(true, Ordering::AcqRel) || !self.inner.options.realtime {
            return Ok(());
        }

        let weak: Weak<ControllerInner<V>> = Arc::downgrade(&self.inner);
        let started = ChangeFeedCoordinator::start(
            self.inner.client.as_ref(),
            &self.inner.view.collections(),
            self.inner.options.coalesce_window,
            move || {
                let weak = weak.clone();
                async move {
                    let Some(inner) = weak.upgrade() else { return };
                    if let Err(e) = inner.reload().await {
                        warn!(view = inner.view.name(), error = %e, "feed-triggered reload failed");
                    }
                }
            },
        )
        .await;

        match started {
            Ok(feed) => {
                *self.inner.feed.lock().await = Some(feed);
            }
            Err(e) => {
                // The list is loaded; it just won't refresh on its own.
                warn!(view = self.inner.view.name(), error = %e, "change feed unavailable");
                self.inner.mounted.store(false, Ordering::Release);
            }
        }
        Ok(())
    }

    /// Tear down every subscription. Idempotent; the controller cannot be
    /// mounted again afterwards.
    pub async fn unmount(&self) {
        if self.inner.unmounted.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(feed) = self.inner.feed.lock().await.take() {
            feed.shutdown();
        }
        self.inner.state.send_replace(ListState::Idle);
        info!(view = self.inner.view.name(), "list unmounted");
    }

    pub fn is_live(&self) -> bool {
        self.inner.mounted.load(Ordering::Acquire) && !self.inner.unmounted.load(Ordering::Acquire)
    }

    /// Load again now. Results older than one already applied are
    /// dropped.
    pub async fn reload(&self) -> Result<(), CoreError> {
        self.inner.reload().await
    }

    // ── Observation ──────────────────────────────────────────────────

    pub fn state(&self) -> ListState {
        self.inner.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<ListState> {
        self.inner.state.subscribe()
    }

    pub fn items(&self) -> Snapshot<V::Item> {
        self.inner.store.snapshot()
    }

    pub fn stream(&self) -> ViewStream<V::Item> {
        self.inner.store.stream()
    }

    pub fn get(&self, key: &str) -> Option<Arc<V::Item>> {
        self.inner.store.get(key)
    }

    /// Rows skipped by the most recent load.
    pub fn diagnostics(&self) -> Arc<Vec<Diagnostic>> {
        self.inner.diagnostics.borrow().clone()
    }

    /// Number of loads applied so far.
    pub fn version(&self) -> u64 {
        self.inner.store.version()
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Run one user-triggered change.
    ///
    /// Only one change runs at a time; a second one gets
    /// [`CoreError::Busy`], checked before the list state. Success
    /// triggers a reload; if only that reload fails the change still
    /// returns `Ok` and the state moves to `LoadError`. Failure moves to
    /// `MutationError` naming the failed collections and keeps the last
    /// loaded list.
    pub(crate) async fn mutate<F, Fut>(&self, operation: &str, change: F) -> Result<(), CoreError>
    where
        F: FnOnce(Arc<dyn ResourceClient>) -> Fut + Send,
        Fut: Future<Output = Result<(), CoreError>> + Send,
    {
        if self.inner.unmounted.load(Ordering::Acquire) {
            return Err(CoreError::Unmounted);
        }
        if self
            .inner
            .mutating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::Busy);
        }
        let _guard = MutatingGuard(&self.inner.mutating);
        if !self.inner.state.borrow().accepts_mutation() {
            return Err(CoreError::NotReady);
        }

        self.inner.state.send_replace(ListState::Mutating {
            operation: operation.to_owned(),
        });
        debug!(view = self.inner.view.name(), operation, "mutation started");

        match change(Arc::clone(&self.inner.client)).await {
            Ok(()) => {
                info!(view = self.inner.view.name(), operation, "mutation applied");
                // The write stands even if the refresh fails; the state
                // reports the failed load.
                if let Err(e) = self.inner.reload().await {
                    warn!(view = self.inner.view.name(), operation, error = %e, "reload after mutation failed");
                }
                Ok(())
            }
            Err(e) => {
                let partial = matches!(e, CoreError::PartialFailure { .. });
                warn!(view = self.inner.view.name(), operation, partial, error = %e, "mutation failed");
                self.inner.state.send_replace(ListState::MutationError {
                    operation: operation.to_owned(),
                    message: e.to_string(),
                    failed: e.failed_collections(),
                    partial,
                });
                Err(e)
            }
        }
    }
}

struct MutatingGuard<'a>(&'a AtomicBool);

impl Drop for MutatingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<V: ListView> ControllerInner<V> {
    async fn reload(&self) -> Result<(), CoreError> {
        if self.unmounted.load(Ordering::Acquire) {
            return Err(CoreError::Unmounted);
        }

        let seq = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.send_if_modified(|state| {
            if matches!(state, ListState::Idle | ListState::LoadError { .. }) {
                *state = ListState::Loading;
                true
            } else {
                false
            }
        });

        let result = self.view.load(self.client.as_ref()).await;

        let mut applied = self
            .applied
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if seq < *applied {
            debug!(view = self.view.name(), seq, applied = *applied, "discarding stale load");
            return Ok(());
        }
        *applied = seq;
        if self.unmounted.load(Ordering::Acquire) {
            return Err(CoreError::Unmounted);
        }

        match result {
            Ok(loaded) => {
                debug!(
                    view = self.view.name(),
                    seq,
                    items = loaded.items.len(),
                    skipped = loaded.diagnostics.len(),
                    "load applied"
                );
                self.store.replace_all(loaded.items);
                self.diagnostics.send_replace(Arc::new(loaded.diagnostics));
                self.state.send_replace(ListState::Ready);
                Ok(())
            }
            Err(e) => {
                warn!(view = self.view.name(), seq, error = %e, "load failed");
                self.state.send_replace(ListState::LoadError {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}
