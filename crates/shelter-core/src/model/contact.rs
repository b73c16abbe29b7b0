// ── Contact messages (`contacts`) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, RecordId, SectionRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessageRow {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub read_status: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SectionRow for ContactMessageRow {
    const COLLECTION: Collection = Collection::Contacts;
    const ORDER_BY: &'static str = "created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}
