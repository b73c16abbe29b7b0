// ── Lost & found (`lost_found_submissions` → `found_animals`) ──

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Collection, RecordId, SectionRow};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// A lost-pet report awaiting review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LostFoundSubmission {
    pub id: RecordId,
    #[serde(default)]
    pub pet_name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_seen_location: String,
    #[serde(default)]
    pub date_lost: Option<NaiveDate>,
    #[serde(default)]
    pub contact_number: String,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub status: SubmissionStatus,
    #[serde(default, alias = "created_at")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl LostFoundSubmission {
    /// `found_animals` row published when the submission is approved.
    pub fn to_found_row(&self) -> Value {
        json!({
            "pet_name": self.pet_name,
            "species": self.species,
            "description": self.description,
            "last_seen_location": self.last_seen_location,
            "date_found": self.date_lost.map(|d| d.to_string()),
            "contact_number": self.contact_number,
            "photo_url": self.photo_url,
            "finder_name": "Shelter",
            "status": "Found",
            "original_submission_id": self.id,
        })
    }
}

impl SectionRow for LostFoundSubmission {
    const COLLECTION: Collection = Collection::LostFoundSubmissions;
    const ORDER_BY: &'static str = "submitted_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Review patch: new status plus review timestamp.
pub fn review_patch(status: SubmissionStatus, at: DateTime<Utc>) -> Value {
    json!({ "status": status.as_str(), "reviewed_at": at.to_rfc3339() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn found_row_references_submission() {
        let sub: LostFoundSubmission = serde_json::from_value(json!({
            "id": "s1",
            "pet_name": "Bella",
            "species": "Dog",
            "description": "Brown collar",
            "last_seen_location": "Park Street",
            "date_lost": "2026-02-20",
            "contact_number": "9876543210",
            "status": "Pending"
        }))
        .unwrap();

        let row = sub.to_found_row();
        assert_eq!(row["finder_name"], "Shelter");
        assert_eq!(row["status"], "Found");
        assert_eq!(row["date_found"], "2026-02-20");
        assert_eq!(row["original_submission_id"], "s1");
        assert!(row["photo_url"].is_null());
    }
}
