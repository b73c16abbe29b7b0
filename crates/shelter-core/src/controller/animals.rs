// ── Animal operations ──
//
// Every write fans out to each collection in the animal's provenance (or
// placement, for adds). Outcomes are collected per collection so a
// half-applied change is reported as such rather than as success or
// total failure.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::info;

use super::{AnimalsController, AnimalsView, ListView};
use crate::client::ResourceClient;
use crate::error::CoreError;
use crate::model::{
    Animal, AnimalPatch, AnimalStatus, NewAnimal, Placement, RecordId, SourceTable, name_key,
};

impl AnimalsController {
    /// Look up an animal by name, case-insensitively.
    pub fn find(&self, name: &str) -> Result<Arc<Animal>, CoreError> {
        self.get(&name_key(name)).ok_or_else(|| CoreError::NotFound {
            entity_type: "Animal".into(),
            identifier: name.trim().to_owned(),
        })
    }

    /// Insert a new animal into every table `placement` names.
    pub async fn add_animal(&self, animal: NewAnimal, placement: Placement) -> Result<(), CoreError> {
        let mut missing = Vec::new();
        if animal.name.trim().is_empty() {
            missing.push(("name".to_owned(), crate::validate::REQUIRED_MESSAGE.to_owned()));
        }
        if animal.species.trim().is_empty() {
            missing.push(("species".to_owned(), crate::validate::REQUIRED_MESSAGE.to_owned()));
        }
        if !missing.is_empty() {
            return Err(CoreError::Validation { fields: missing });
        }
        if let Some(existing) = self.get(&name_key(&animal.name)) {
            let taken: Vec<_> = placement
                .tables()
                .iter()
                .filter(|&&source| existing.provenance.id_for(source).is_some())
                .map(|source| source.collection().as_str())
                .collect();
            if !taken.is_empty() {
                return Err(CoreError::Validation {
                    fields: vec![(
                        "name".to_owned(),
                        format!(
                            "An animal named '{}' is already listed in {}",
                            existing.name,
                            taken.join(", ")
                        ),
                    )],
                });
            }
        }

        let row = animal.to_row(Utc::now().date_naive());
        let name = animal.name.trim().to_owned();
        self.mutate("add animal", move |client| async move {
            let outcomes = join_all(placement.tables().iter().map(|&source| {
                let client = Arc::clone(&client);
                let row = row.clone();
                async move {
                    let collection = source.collection();
                    (collection, client.insert(collection, row).await.map(|_| ()))
                }
            }))
            .await;
            CoreError::from_write_outcomes("add animal", outcomes)?;
            info!(%name, %placement, "animal added");
            Ok(())
        })
        .await
    }

    /// Set the status on every backing row. The value must be one of the
    /// exact wire strings; anything else is rejected before any write.
    pub async fn set_status(&self, name: &str, status: &str) -> Result<(), CoreError> {
        let status = AnimalStatus::from_str(status).map_err(|_| CoreError::InvalidStatus {
            value: status.to_owned(),
        })?;
        self.apply_patch("set status", name, AnimalPatch::status(status))
            .await
    }

    /// Apply an edit to every backing row.
    pub async fn update_animal(&self, name: &str, patch: AnimalPatch) -> Result<(), CoreError> {
        if patch.is_empty() {
            return Ok(());
        }
        self.apply_patch("update animal", name, patch).await
    }

    /// Delete every backing row.
    pub async fn delete_animal(&self, name: &str) -> Result<(), CoreError> {
        let animal = self.find(name)?;
        let targets = targets(&animal);
        self.mutate("delete animal", move |client| async move {
            let outcomes = join_all(targets.into_iter().map(|(source, id)| {
                let client = Arc::clone(&client);
                async move {
                    let collection = source.collection();
                    (collection, client.delete(collection, &id).await)
                }
            }))
            .await;
            CoreError::from_write_outcomes("delete animal", outcomes)
        })
        .await
    }

    async fn apply_patch(
        &self,
        operation: &'static str,
        name: &str,
        patch: AnimalPatch,
    ) -> Result<(), CoreError> {
        let animal = self.find(name)?;
        let targets = targets(&animal);
        self.mutate(operation, move |client| async move {
            let outcomes = join_all(
                targets
                    .into_iter()
                    .map(|(source, id)| update_one(Arc::clone(&client), source, id, &patch)),
            )
            .await;
            CoreError::from_write_outcomes(operation, outcomes)
        })
        .await
    }

    /// Number of animals currently listed.
    pub fn count(&self) -> usize {
        self.items().len()
    }
}

/// Fetch both animal tables and find the animal backed by `id` in either
/// of them.
pub(super) async fn resolve_record(
    client: &dyn ResourceClient,
    id: &RecordId,
) -> Result<Animal, CoreError> {
    let loaded = AnimalsView.load(client).await?;
    loaded
        .items
        .into_iter()
        .map(|(_, animal)| animal)
        .find(|animal| {
            animal.provenance.rescued_id() == Some(id) || animal.provenance.adopt_id() == Some(id)
        })
        .ok_or_else(|| CoreError::NotFound {
            entity_type: "Animal".into(),
            identifier: id.to_string(),
        })
}

pub(super) fn targets(animal: &Animal) -> Vec<(SourceTable, RecordId)> {
    animal
        .provenance
        .entries()
        .into_iter()
        .map(|(source, id)| (source, id.clone()))
        .collect()
}

pub(super) async fn update_one(
    client: Arc<dyn ResourceClient>,
    source: SourceTable,
    id: RecordId,
    patch: &AnimalPatch,
) -> (crate::model::Collection, Result<(), CoreError>) {
    let collection = source.collection();
    let result = client.update(collection, &id, patch.to_row(source)).await;
    (collection, result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::client::{FailureKind, MemoryClient, Op};
    use crate::controller::{AnimalsView, ControllerOptions, ListController, ListState};
    use crate::model::Collection;

    async fn mounted(memory: &MemoryClient) -> AnimalsController {
        let list = ListController::new(
            Arc::new(memory.clone()),
            AnimalsView,
            ControllerOptions {
                realtime: false,
                coalesce_window: Duration::from_millis(50),
            },
        );
        list.mount().await.unwrap();
        list
    }

    fn dual(memory: &MemoryClient) {
        memory.seed(
            Collection::AdoptAnimals,
            vec![json!({ "id": "a1", "name": "Rex", "current_status": "Available" })],
        );
        memory.seed(
            Collection::RescuedAnimals,
            vec![json!({ "id": "r1", "name": "rex", "current_status": "Available" })],
        );
    }

    fn new_animal(name: &str) -> NewAnimal {
        NewAnimal {
            name: name.into(),
            species: "Dog".into(),
            breed: None,
            age: Some(2),
            gender: None,
            rescue_date: None,
            story: Some("Found near the market".into()),
            health_status: None,
            current_status: AnimalStatus::Available,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn invalid_status_is_rejected_before_writing() {
        let memory = MemoryClient::new();
        dual(&memory);
        let list = mounted(&memory).await;

        let err = list.set_status("Rex", "adopted").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatus { .. }));
        assert_eq!(memory.call_count(Collection::AdoptAnimals, Op::Update), 0);
        assert_eq!(memory.call_count(Collection::RescuedAnimals, Op::Update), 0);
    }

    #[tokio::test]
    async fn half_applied_status_change_is_partial_failure() {
        let memory = MemoryClient::new();
        dual(&memory);
        let list = mounted(&memory).await;
        memory.fail_next(
            Collection::RescuedAnimals,
            Op::Update,
            FailureKind::Policy("permission denied for table rescued_animals".into()),
        );

        let err = list.set_status("REX", "Adopted").await.unwrap_err();
        match &err {
            CoreError::PartialFailure {
                succeeded, failed, ..
            } => {
                assert_eq!(succeeded, &vec![Collection::AdoptAnimals]);
                assert_eq!(failed[0].collection, Collection::RescuedAnimals);
            }
            other => panic!("expected partial failure, got {other:?}"),
        }
        assert!(matches!(
            list.state(),
            ListState::MutationError { partial: true, .. }
        ));
        // Nothing is rolled back.
        assert_eq!(
            memory.row(Collection::AdoptAnimals, &RecordId::from("a1")).unwrap()["current_status"],
            "Adopted"
        );
    }

    #[tokio::test]
    async fn add_to_both_inserts_twice_and_merges() {
        let memory = MemoryClient::new();
        let list = mounted(&memory).await;

        list.add_animal(new_animal("Bella"), Placement::Both).await.unwrap();

        assert_eq!(memory.rows(Collection::AdoptAnimals).len(), 1);
        assert_eq!(memory.rows(Collection::RescuedAnimals).len(), 1);
        let bella = list.find("bella").unwrap();
        assert!(bella.is_dual_sourced());
        assert_eq!(bella.story.as_deref(), Some("Found near the market"));
        assert_eq!(list.state(), ListState::Ready);
    }

    #[tokio::test]
    async fn add_refuses_a_name_already_in_the_target_table() {
        let memory = MemoryClient::new();
        let list = mounted(&memory).await;
        list.add_animal(new_animal("Rex"), Placement::Adopt).await.unwrap();

        let err = list
            .add_animal(new_animal(" REX "), Placement::Both)
            .await
            .unwrap_err();
        let CoreError::Validation { fields } = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields[0].0, "name");
        assert!(fields[0].1.contains("adopt_animals"));
        assert_eq!(memory.call_count(Collection::AdoptAnimals, Op::Insert), 1);
        assert_eq!(memory.call_count(Collection::RescuedAnimals, Op::Insert), 0);

        // The other table is still free.
        list.add_animal(new_animal("rex"), Placement::Rescued).await.unwrap();
        assert!(list.find("Rex").unwrap().is_dual_sourced());
        assert!(list.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn add_requires_name_and_species() {
        let memory = MemoryClient::new();
        let list = mounted(&memory).await;
        let mut animal = new_animal("  ");
        animal.species = String::new();

        let err = list.add_animal(animal, Placement::Rescued).await.unwrap_err();
        let CoreError::Validation { fields } = err else {
            panic!("expected validation error");
        };
        assert_eq!(fields.len(), 2);
        assert_eq!(memory.call_count(Collection::RescuedAnimals, Op::Insert), 0);
    }

    #[tokio::test]
    async fn delete_removes_every_backing_row() {
        let memory = MemoryClient::new();
        dual(&memory);
        let list = mounted(&memory).await;

        list.delete_animal("Rex").await.unwrap();
        assert!(memory.rows(Collection::AdoptAnimals).is_empty());
        assert!(memory.rows(Collection::RescuedAnimals).is_empty());
        assert_eq!(list.count(), 0);
        assert!(matches!(list.find("Rex"), Err(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn edit_writes_story_to_each_tables_column() {
        let memory = MemoryClient::new();
        dual(&memory);
        let list = mounted(&memory).await;

        list.update_animal(
            "Rex",
            AnimalPatch {
                story: Some("Loves long walks".into()),
                ..AnimalPatch::default()
            },
        )
        .await
        .unwrap();

        let adopt = memory.row(Collection::AdoptAnimals, &RecordId::from("a1")).unwrap();
        let rescued = memory.row(Collection::RescuedAnimals, &RecordId::from("r1")).unwrap();
        assert_eq!(adopt["description"], "Loves long walks");
        assert_eq!(rescued["rescue_story"], "Loves long walks");
    }

    #[tokio::test]
    async fn concurrent_mutation_is_busy() {
        let memory = MemoryClient::new();
        dual(&memory);
        let list = mounted(&memory).await;
        memory.set_latency(Collection::AdoptAnimals, Duration::from_millis(50));

        let (first, second) = tokio::join!(
            list.set_status("Rex", "Adopted"),
            list.set_status("Rex", "Under Care"),
        );
        assert!(first.is_ok());
        assert!(matches!(second, Err(CoreError::Busy)));
    }
}
