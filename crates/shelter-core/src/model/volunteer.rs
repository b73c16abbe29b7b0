// ── Volunteer applications (`volunteers`) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VolunteerStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VolunteerStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub experience_with_animals: bool,
    #[serde(default)]
    pub why_volunteer: String,
    #[serde(default)]
    pub status: VolunteerStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SectionRow for Volunteer {
    const COLLECTION: Collection = Collection::Volunteers;
    const ORDER_BY: &'static str = "created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}
