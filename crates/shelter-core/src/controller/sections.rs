// ── Single-collection section operations ──

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use serde_json::json;
use tracing::info;

use super::animals;
use super::{
    AdoptionsController, DonationsController, ListController, LostFoundController,
    MessagesController, RulesController, TableView, VolunteersController,
};
use crate::error::{CoreError, WriteFailure};
use crate::model::{
    AnimalPatch, AnimalStatus, Collection, DonationSummary, RecordId, RuleDraft, SectionRow,
    SubmissionStatus, VolunteerStatus, review_patch, toggle_publish_patch,
};

impl<T: SectionRow> ListController<TableView<T>> {
    /// Look up a loaded row by id.
    pub fn row(&self, id: &RecordId) -> Result<Arc<T>, CoreError> {
        self.get(&id.to_string()).ok_or_else(|| CoreError::NotFound {
            entity_type: T::COLLECTION.to_string(),
            identifier: id.to_string(),
        })
    }

    /// Delete one row.
    pub async fn delete_row(&self, id: &RecordId) -> Result<(), CoreError> {
        self.row(id)?;
        let id = id.clone();
        self.mutate("delete", move |client| async move {
            client.delete(T::COLLECTION, &id).await
        })
        .await
    }
}

// ── Volunteers ───────────────────────────────────────────────────────

impl VolunteersController {
    pub async fn approve(&self, id: &RecordId) -> Result<(), CoreError> {
        self.review(id, VolunteerStatus::Approved, "approve").await
    }

    pub async fn reject(&self, id: &RecordId) -> Result<(), CoreError> {
        self.review(id, VolunteerStatus::Rejected, "reject").await
    }

    async fn review(
        &self,
        id: &RecordId,
        status: VolunteerStatus,
        action: &str,
    ) -> Result<(), CoreError> {
        let volunteer = self.row(id)?;
        if volunteer.status != VolunteerStatus::Pending {
            return Err(CoreError::InvalidTransition {
                action: action.to_owned(),
                entity_type: "volunteer".into(),
                identifier: id.to_string(),
                current: volunteer.status.to_string(),
            });
        }
        let id = id.clone();
        self.mutate(action, move |client| async move {
            client
                .update(
                    Collection::Volunteers,
                    &id,
                    json!({ "status": status.as_str() }),
                )
                .await
        })
        .await
    }
}

// ── Messages ─────────────────────────────────────────────────────────

impl MessagesController {
    pub async fn mark_read(&self, id: &RecordId) -> Result<(), CoreError> {
        if self.row(id)?.read_status {
            return Ok(());
        }
        let id = id.clone();
        self.mutate("mark read", move |client| async move {
            client
                .update(Collection::Contacts, &id, json!({ "read_status": true }))
                .await
        })
        .await
    }

    pub fn unread_count(&self) -> usize {
        self.items().iter().filter(|m| !m.read_status).count()
    }
}

// ── Lost & found ─────────────────────────────────────────────────────

impl LostFoundController {
    /// Publish the report as a found animal, then mark it approved.
    ///
    /// If the publish succeeds and the status update fails, the result is
    /// a partial failure naming `lost_found_submissions`.
    pub async fn approve(&self, id: &RecordId) -> Result<(), CoreError> {
        let submission = self.pending(id, "approve")?;
        let id = id.clone();
        self.mutate("approve report", move |client| async move {
            client
                .insert(Collection::FoundAnimals, submission.to_found_row())
                .await
                .map_err(|e| CoreError::WritesFailed {
                    operation: "approve report".into(),
                    failed: vec![WriteFailure {
                        collection: Collection::FoundAnimals,
                        reason: e.to_string(),
                    }],
                })?;

            let marked = client
                .update(
                    Collection::LostFoundSubmissions,
                    &id,
                    review_patch(SubmissionStatus::Approved, Utc::now()),
                )
                .await;
            CoreError::from_write_outcomes(
                "approve report",
                vec![
                    (Collection::FoundAnimals, Ok(())),
                    (Collection::LostFoundSubmissions, marked),
                ],
            )?;
            info!(%id, "lost pet report approved");
            Ok(())
        })
        .await
    }

    pub async fn reject(&self, id: &RecordId) -> Result<(), CoreError> {
        self.pending(id, "reject")?;
        let id = id.clone();
        self.mutate("reject report", move |client| async move {
            client
                .update(
                    Collection::LostFoundSubmissions,
                    &id,
                    review_patch(SubmissionStatus::Rejected, Utc::now()),
                )
                .await
        })
        .await
    }

    fn pending(
        &self,
        id: &RecordId,
        action: &str,
    ) -> Result<Arc<crate::model::LostFoundSubmission>, CoreError> {
        let submission = self.row(id)?;
        if submission.status == SubmissionStatus::Pending {
            Ok(submission)
        } else {
            Err(CoreError::InvalidTransition {
                action: action.to_owned(),
                entity_type: "report".into(),
                identifier: id.to_string(),
                current: submission.status.to_string(),
            })
        }
    }
}

// ── Adoptions ────────────────────────────────────────────────────────

impl AdoptionsController {
    /// Mark the requested animal as adopted on every table that lists it.
    ///
    /// `pet_id` may name the animal's row in either table; the status is
    /// written to each row of the reconciled animal, and a half-applied
    /// change is reported as a partial failure.
    pub async fn approve(&self, id: &RecordId) -> Result<(), CoreError> {
        let request = self.row(id)?;
        let Some(pet_id) = request.pet_id.clone() else {
            return Err(CoreError::Validation {
                fields: vec![(
                    "pet_id".into(),
                    "Adoption request does not reference an animal".into(),
                )],
            });
        };
        self.mutate("approve adoption", move |client| async move {
            let animal = animals::resolve_record(client.as_ref(), &pet_id).await?;
            let patch = AnimalPatch::status(AnimalStatus::Adopted);
            let outcomes = join_all(animals::targets(&animal).into_iter().map(|(source, id)| {
                animals::update_one(Arc::clone(&client), source, id, &patch)
            }))
            .await;
            CoreError::from_write_outcomes("approve adoption", outcomes)?;
            info!(%pet_id, name = %animal.name, "adoption approved");
            Ok(())
        })
        .await
    }
}

// ── Donations ────────────────────────────────────────────────────────

impl DonationsController {
    pub fn summary(&self) -> DonationSummary {
        let items = self.items();
        DonationSummary::from_donations(items.iter().map(|d| &**d))
    }
}

// ── Government rules ─────────────────────────────────────────────────

impl RulesController {
    /// Create a rule (`id` of `None`) or update an existing one.
    pub async fn save_rule(&self, id: Option<&RecordId>, draft: RuleDraft) -> Result<(), CoreError> {
        if draft.title.trim().is_empty() {
            return Err(CoreError::Validation {
                fields: vec![("title".into(), crate::validate::REQUIRED_MESSAGE.into())],
            });
        }
        let previous = id.map(|id| self.row(id)).transpose()?;
        let row = draft.to_row(previous.as_deref(), Utc::now());
        let id = id.cloned();

        self.mutate("save rule", move |client| async move {
            match id {
                Some(id) => client.update(Collection::GovRules, &id, row).await,
                None => client.insert(Collection::GovRules, row).await.map(|_| ()),
            }
        })
        .await
    }

    pub async fn toggle_publish(&self, id: &RecordId) -> Result<(), CoreError> {
        let rule = self.row(id)?;
        let patch = toggle_publish_patch(&rule, Utc::now());
        let id = id.clone();
        self.mutate("toggle publish", move |client| async move {
            client.update(Collection::GovRules, &id, patch).await
        })
        .await
    }
}
