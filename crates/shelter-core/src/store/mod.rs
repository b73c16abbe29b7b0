// ── Reactive list storage ──

mod view_store;

pub(crate) use view_store::ViewStore;
pub use view_store::Snapshot;
