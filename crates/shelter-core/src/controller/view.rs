// ── List views ──
//
// What a controller loads: the collections it watches and how their rows
// become list items.

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::client::{Query, ResourceClient, select_rows};
use crate::error::CoreError;
use crate::model::{Animal, Collection, SectionRow};
use crate::reconcile::{Diagnostic, EntityReconciler};

/// One complete load: keyed items in display order plus skipped rows.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub items: Vec<(String, T)>,
    pub diagnostics: Vec<Diagnostic>,
}

#[async_trait]
pub trait ListView: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    /// Collections whose changes should trigger a reload.
    fn collections(&self) -> Vec<Collection>;

    /// Fetch every collection and build the list. Any failed select
    /// fails the whole load.
    async fn load(&self, client: &dyn ResourceClient) -> Result<Loaded<Self::Item>, CoreError>;
}

// ── Animals ──────────────────────────────────────────────────────────

/// Reconciled animals from both animal tables, keyed by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimalsView;

#[async_trait]
impl ListView for AnimalsView {
    type Item = Animal;

    fn name(&self) -> &'static str {
        "animals"
    }

    fn collections(&self) -> Vec<Collection> {
        vec![Collection::AdoptAnimals, Collection::RescuedAnimals]
    }

    async fn load(&self, client: &dyn ResourceClient) -> Result<Loaded<Animal>, CoreError> {
        let query = Query::new().order_by("created_at", true);
        let (adopt, rescued) = tokio::try_join!(
            client.select(Collection::AdoptAnimals, &query),
            client.select(Collection::RescuedAnimals, &query),
        )?;

        let merged = EntityReconciler::merge_rows(adopt, rescued);
        Ok(Loaded {
            items: merged
                .animals
                .into_iter()
                .map(|animal| (animal.key(), animal))
                .collect(),
            diagnostics: merged.diagnostics,
        })
    }
}

// ── Single-collection sections ───────────────────────────────────────

/// Rows of one collection, newest first, keyed by id.
pub struct TableView<T> {
    _row: PhantomData<fn() -> T>,
}

impl<T> TableView<T> {
    pub fn new() -> Self {
        Self { _row: PhantomData }
    }
}

impl<T> Default for TableView<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: SectionRow> ListView for TableView<T> {
    type Item = T;

    fn name(&self) -> &'static str {
        T::COLLECTION.as_str()
    }

    fn collections(&self) -> Vec<Collection> {
        vec![T::COLLECTION]
    }

    async fn load(&self, client: &dyn ResourceClient) -> Result<Loaded<T>, CoreError> {
        let query = Query::new().order_by(T::ORDER_BY, false);
        let rows: Vec<T> = select_rows(client, T::COLLECTION, &query).await?;
        Ok(Loaded {
            items: rows
                .into_iter()
                .map(|row| (row.id().to_string(), row))
                .collect(),
            diagnostics: Vec::new(),
        })
    }
}
