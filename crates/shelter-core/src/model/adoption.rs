// ── Adoption requests (`adoptions`) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, RecordId, SectionRow};

/// A submitted adoption application.
///
/// Older rows use `adopter_name`/`contact_number`/`aadhar_number`/
/// `animal_id`; newer ones `name`/`contact_no`/`aadhaar_no`/`pet_id`.
/// Both decode into the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdoptionRequest {
    pub id: RecordId,
    #[serde(default, alias = "adopter_name")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "contact_number")]
    pub contact_no: String,
    #[serde(default, alias = "aadhar_number")]
    pub aadhaar_no: Option<String>,
    #[serde(default, alias = "already_have_pet")]
    pub already_pet: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
    /// Referenced `rescued_animals` row.
    #[serde(default, alias = "animal_id")]
    pub pet_id: Option<RecordId>,
    #[serde(default, alias = "adoption_date")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SectionRow for AdoptionRequest {
    const COLLECTION: Collection = Collection::Adoptions;
    const ORDER_BY: &'static str = "created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}
