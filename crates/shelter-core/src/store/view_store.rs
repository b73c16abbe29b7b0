// ── Reactive list store ──
//
// Keyed O(1) lookups plus an ordered snapshot pushed through `watch`.
// A reload replaces the whole list at once so subscribers never see a
// half-applied result.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::stream::ViewStream;

/// Snapshot type shared with every subscriber.
pub type Snapshot<T> = Arc<Vec<Arc<T>>>;

pub(crate) struct ViewStore<T: Clone + Send + Sync + 'static> {
    /// Lookup key -> item. Keys are name keys for animals and record ids
    /// for every other section.
    by_key: DashMap<String, Arc<T>>,

    /// Bumped on every replace.
    version: watch::Sender<u64>,

    /// Items in list order.
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Clone + Send + Sync + 'static> ViewStore<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Swap in a freshly loaded list, keeping its order.
    pub(crate) fn replace_all(&self, items: Vec<(String, T)>) {
        let items: Vec<(String, Arc<T>)> = items
            .into_iter()
            .map(|(key, item)| (key, Arc::new(item)))
            .collect();

        self.by_key.retain(|key, _| items.iter().any(|(k, _)| k == key));
        for (key, item) in &items {
            self.by_key.insert(key.clone(), Arc::clone(item));
        }

        let ordered = items.into_iter().map(|(_, item)| item).collect();
        // `send_modify` updates even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(ordered));
        self.version.send_modify(|v| *v += 1);
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn stream(&self) -> ViewStream<T> {
        ViewStream::new(self.snapshot.subscribe())
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> ViewStore<String> {
        ViewStore::new()
    }

    #[test]
    fn replace_keeps_order_and_index() {
        let s = store();
        s.replace_all(vec![
            ("b".into(), "Bruno".into()),
            ("a".into(), "Asha".into()),
        ]);
        let snap = s.snapshot();
        let names: Vec<&str> = snap.iter().map(|n| n.as_str()).collect();
        assert_eq!(names, ["Bruno", "Asha"]);
        assert_eq!(*s.get("a").unwrap(), "Asha");
        assert_eq!(s.version(), 1);
    }

    #[test]
    fn replace_drops_stale_keys() {
        let s = store();
        s.replace_all(vec![("a".into(), "Asha".into()), ("b".into(), "Bruno".into())]);
        s.replace_all(vec![("b".into(), "Bruno II".into())]);
        assert!(s.get("a").is_none());
        assert_eq!(*s.get("b").unwrap(), "Bruno II");
        assert_eq!(s.len(), 1);
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let s = store();
        let mut stream = s.stream();
        assert!(stream.current().is_empty());

        s.replace_all(vec![("a".into(), "Asha".into())]);
        let snap = stream.changed().await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(stream.current().len(), 1);
    }
}
