// ── Animal domain types ──
//
// Raw rows from the two animal tables, the reconciled `Animal` built
// from them, and the write payloads the admin screens produce.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Collection, RecordId};

// ── AnimalStatus ─────────────────────────────────────────────────────

/// Lifecycle status. Wire values are exact and case-sensitive.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum AnimalStatus {
    #[default]
    Available,
    Adopted,
    #[serde(rename = "Under Care")]
    #[strum(serialize = "Under Care")]
    UnderCare,
}

impl AnimalStatus {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

// ── SourceTable ──────────────────────────────────────────────────────

/// Which of the two animal tables a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTable {
    Adopt,
    Rescued,
}

impl SourceTable {
    pub fn collection(self) -> Collection {
        match self {
            Self::Adopt => Collection::AdoptAnimals,
            Self::Rescued => Collection::RescuedAnimals,
        }
    }
}

// ── SourceRecord ─────────────────────────────────────────────────────

/// One raw row from `adopt_animals` or `rescued_animals`.
///
/// Everything except `id` is optional so that incomplete rows still
/// decode and can be reported instead of failing the whole load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub rescue_date: Option<NaiveDate>,
    #[serde(default)]
    pub rescue_story: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub current_status: Option<AnimalStatus>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl SourceRecord {
    /// Trimmed name, or `None` when missing or blank.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// The story text as the given table stores it. Adopt rows keep it in
    /// `description`; rescued rows in `rescue_story`, with `description`
    /// as a fallback.
    pub fn story(&self, source: SourceTable) -> Option<&str> {
        let text = match source {
            SourceTable::Adopt => self.description.as_deref(),
            SourceTable::Rescued => self
                .rescue_story
                .as_deref()
                .or(self.description.as_deref()),
        };
        text.filter(|s| !s.trim().is_empty())
    }
}

// ── Provenance ───────────────────────────────────────────────────────

/// The backing rows an `Animal` was built from: one per table at most.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    Adopt { adopt: RecordId },
    Rescued { rescued: RecordId },
    Both { adopt: RecordId, rescued: RecordId },
}

impl Provenance {
    pub fn single(source: SourceTable, id: RecordId) -> Self {
        match source {
            SourceTable::Adopt => Self::Adopt { adopt: id },
            SourceTable::Rescued => Self::Rescued { rescued: id },
        }
    }

    pub fn adopt_id(&self) -> Option<&RecordId> {
        match self {
            Self::Adopt { adopt } | Self::Both { adopt, .. } => Some(adopt),
            Self::Rescued { .. } => None,
        }
    }

    pub fn rescued_id(&self) -> Option<&RecordId> {
        match self {
            Self::Rescued { rescued } | Self::Both { rescued, .. } => Some(rescued),
            Self::Adopt { .. } => None,
        }
    }

    pub fn id_for(&self, source: SourceTable) -> Option<&RecordId> {
        match source {
            SourceTable::Adopt => self.adopt_id(),
            SourceTable::Rescued => self.rescued_id(),
        }
    }

    pub fn is_dual(&self) -> bool {
        matches!(self, Self::Both { .. })
    }

    /// Every `(table, id)` pair, adopt first.
    pub fn entries(&self) -> Vec<(SourceTable, &RecordId)> {
        match self {
            Self::Adopt { adopt } => vec![(SourceTable::Adopt, adopt)],
            Self::Rescued { rescued } => vec![(SourceTable::Rescued, rescued)],
            Self::Both { adopt, rescued } => {
                vec![(SourceTable::Adopt, adopt), (SourceTable::Rescued, rescued)]
            }
        }
    }

    /// Add a rescued-table id. Returns `None` when one is already present.
    pub(crate) fn with_rescued(self, id: RecordId) -> Option<Self> {
        match self {
            Self::Adopt { adopt } => Some(Self::Both { adopt, rescued: id }),
            Self::Rescued { .. } | Self::Both { .. } => None,
        }
    }
}

// ── Animal ───────────────────────────────────────────────────────────

/// Reconciled view of one animal across both tables. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub rescue_date: Option<NaiveDate>,
    pub story: Option<String>,
    pub health_status: Option<String>,
    pub current_status: AnimalStatus,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub provenance: Provenance,
}

impl Animal {
    /// Join key: trimmed, lower-cased name.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    pub fn is_dual_sourced(&self) -> bool {
        self.provenance.is_dual()
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.provenance
            .entries()
            .into_iter()
            .map(|(source, _)| source.collection())
            .collect()
    }
}

/// Normalise a name into the reconciliation join key.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ── Placement ────────────────────────────────────────────────────────

/// Which listing(s) a newly added animal should appear on.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Placement {
    Adopt,
    #[default]
    Rescued,
    Both,
}

impl Placement {
    pub fn tables(self) -> &'static [SourceTable] {
        match self {
            Self::Adopt => &[SourceTable::Adopt],
            Self::Rescued => &[SourceTable::Rescued],
            Self::Both => &[SourceTable::Adopt, SourceTable::Rescued],
        }
    }
}

// ── Write payloads ───────────────────────────────────────────────────

/// Admin "add animal" payload, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnimal {
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub rescue_date: Option<NaiveDate>,
    pub story: Option<String>,
    pub health_status: Option<String>,
    pub current_status: AnimalStatus,
    pub image_url: Option<String>,
}

impl NewAnimal {
    /// Row for either table. Both get the story in `rescue_story` and
    /// `description`; a missing rescue date becomes `today`.
    pub fn to_row(&self, today: NaiveDate) -> Value {
        let mut row = Map::new();
        row.insert("name".into(), Value::from(self.name.trim()));
        row.insert("species".into(), Value::from(self.species.trim()));
        insert_opt(&mut row, "breed", self.breed.as_deref());
        if let Some(age) = self.age {
            row.insert("age".into(), Value::from(age));
        }
        insert_opt(&mut row, "gender", self.gender.as_deref());
        row.insert(
            "rescue_date".into(),
            Value::from(self.rescue_date.unwrap_or(today).to_string()),
        );
        insert_opt(&mut row, "rescue_story", self.story.as_deref());
        insert_opt(&mut row, "description", self.story.as_deref());
        insert_opt(&mut row, "health_status", self.health_status.as_deref());
        row.insert(
            "current_status".into(),
            Value::from(self.current_status.as_str()),
        );
        insert_opt(&mut row, "image_url", self.image_url.as_deref());
        Value::Object(row)
    }
}

/// Partial edit of an animal. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub rescue_date: Option<NaiveDate>,
    pub story: Option<String>,
    pub health_status: Option<String>,
    pub current_status: Option<AnimalStatus>,
    pub image_url: Option<String>,
}

impl AnimalPatch {
    pub fn status(status: AnimalStatus) -> Self {
        Self {
            current_status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch body for one table; the story column differs per table.
    pub fn to_row(&self, source: SourceTable) -> Value {
        let mut row = Map::new();
        insert_opt(&mut row, "name", self.name.as_deref().map(str::trim));
        insert_opt(&mut row, "species", self.species.as_deref().map(str::trim));
        insert_opt(&mut row, "breed", self.breed.as_deref());
        if let Some(age) = self.age {
            row.insert("age".into(), Value::from(age));
        }
        insert_opt(&mut row, "gender", self.gender.as_deref());
        if let Some(date) = self.rescue_date {
            row.insert("rescue_date".into(), Value::from(date.to_string()));
        }
        if let Some(story) = self.story.as_deref() {
            match source {
                SourceTable::Adopt => {
                    row.insert("description".into(), Value::from(story));
                }
                SourceTable::Rescued => {
                    row.insert("rescue_story".into(), Value::from(story));
                }
            }
        }
        insert_opt(&mut row, "health_status", self.health_status.as_deref());
        if let Some(status) = self.current_status {
            row.insert("current_status".into(), Value::from(status.as_str()));
        }
        insert_opt(&mut row, "image_url", self.image_url.as_deref());
        Value::Object(row)
    }
}

fn insert_opt(row: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(v) = value {
        row.insert(key.to_owned(), Value::from(v));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_wire_values_are_exact() {
        assert_eq!("Under Care".parse::<AnimalStatus>().unwrap(), AnimalStatus::UnderCare);
        assert_eq!("Adopted".parse::<AnimalStatus>().unwrap(), AnimalStatus::Adopted);
        assert!("adopted".parse::<AnimalStatus>().is_err());
        assert!("UnderCare".parse::<AnimalStatus>().is_err());
        assert!("Under  Care".parse::<AnimalStatus>().is_err());

        let v = serde_json::to_value(AnimalStatus::UnderCare).unwrap();
        assert_eq!(v, json!("Under Care"));
    }

    #[test]
    fn source_record_decodes_sparse_row() {
        let row = json!({ "id": "a1", "name": "  Rex ", "current_status": "Available" });
        let rec: SourceRecord = serde_json::from_value(row).unwrap();
        assert_eq!(rec.name(), Some("Rex"));
        assert!(rec.species.is_none());
    }

    #[test]
    fn rescued_story_falls_back_to_description() {
        let rec: SourceRecord =
            serde_json::from_value(json!({ "id": 1, "description": "found near river" })).unwrap();
        assert_eq!(rec.story(SourceTable::Rescued), Some("found near river"));
        assert_eq!(rec.story(SourceTable::Adopt), Some("found near river"));

        let rec: SourceRecord = serde_json::from_value(
            json!({ "id": 1, "description": "friendly", "rescue_story": "found near river" }),
        )
        .unwrap();
        assert_eq!(rec.story(SourceTable::Rescued), Some("found near river"));
        assert_eq!(rec.story(SourceTable::Adopt), Some("friendly"));
    }

    #[test]
    fn provenance_accessors() {
        let p = Provenance::single(SourceTable::Adopt, RecordId::from("a1"))
            .with_rescued(RecordId::from("r1"))
            .unwrap();
        assert!(p.is_dual());
        assert_eq!(p.adopt_id(), Some(&RecordId::from("a1")));
        assert_eq!(p.rescued_id(), Some(&RecordId::from("r1")));
        assert_eq!(p.entries().len(), 2);
        assert!(p.with_rescued(RecordId::from("r2")).is_none());
    }

    #[test]
    fn new_animal_row_defaults() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let animal = NewAnimal {
            name: "Rex".into(),
            species: "Dog".into(),
            breed: None,
            age: Some(3),
            gender: None,
            rescue_date: None,
            story: Some("Found near the market".into()),
            health_status: None,
            current_status: AnimalStatus::default(),
            image_url: None,
        };
        let row = animal.to_row(today);
        assert_eq!(row["rescue_date"], "2026-03-01");
        assert_eq!(row["current_status"], "Available");
        assert_eq!(row["rescue_story"], row["description"]);
        assert!(row.get("breed").is_none());
    }

    #[test]
    fn patch_story_column_depends_on_table() {
        let patch = AnimalPatch {
            story: Some("now healthy".into()),
            ..AnimalPatch::default()
        };
        assert_eq!(patch.to_row(SourceTable::Adopt)["description"], "now healthy");
        assert_eq!(patch.to_row(SourceTable::Rescued)["rescue_story"], "now healthy");
        assert!(!patch.is_empty());
        assert!(AnimalPatch::default().is_empty());
    }

    #[test]
    fn placement_parses_case_insensitively() {
        assert_eq!("Both".parse::<Placement>().unwrap(), Placement::Both);
        assert_eq!(Placement::Both.tables().len(), 2);
    }
}
