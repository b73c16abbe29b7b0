// ── Entity reconciliation ──
//
// Joins `adopt_animals` and `rescued_animals` rows into one `Animal` per
// name. The join key is the trimmed, lower-cased name. Adopt rows seed
// the map; a rescued row with the same key is merged on top, its present
// fields winning. Output order is insertion order: adopt entries first,
// then rescued-only entries.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::model::{Animal, AnimalStatus, Provenance, RecordId, SourceRecord, SourceTable, name_key};

/// Why a source row was left out of the reconciled list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    MissingName,
    /// Another row in the same table already claimed this name.
    DuplicateName { name: String, kept: RecordId },
    /// The row could not be decoded at all.
    Undecodable { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: SourceTable,
    /// `None` when the row was too broken to read an id from.
    pub id: Option<RecordId>,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.source.collection();
        let id = self
            .id
            .as_ref()
            .map_or_else(|| "?".to_owned(), ToString::to_string);
        match &self.kind {
            DiagnosticKind::MissingName => write!(f, "{table} row {id} has no name; skipped"),
            DiagnosticKind::DuplicateName { name, kept } => write!(
                f,
                "{table} row {id} repeats the name '{name}' of row {kept}; skipped"
            ),
            DiagnosticKind::Undecodable { message } => {
                write!(f, "{table} row {id} could not be read: {message}")
            }
        }
    }
}

/// Result of one merge: the animals plus every skipped row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub animals: Vec<Animal>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Stateless name-join of the two animal tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityReconciler;

impl EntityReconciler {
    /// Decode raw rows, then [`merge`](Self::merge). Rows that fail to
    /// decode become diagnostics instead of failing the whole load.
    pub fn merge_rows(adopt: Vec<Value>, rescued: Vec<Value>) -> Reconciliation {
        let mut diagnostics = Vec::new();
        let adopt = decode(SourceTable::Adopt, adopt, &mut diagnostics);
        let rescued = decode(SourceTable::Rescued, rescued, &mut diagnostics);

        let mut out = Self::merge(&adopt, &rescued);
        diagnostics.append(&mut out.diagnostics);
        out.diagnostics = diagnostics;
        out
    }

    pub fn merge(adopt: &[SourceRecord], rescued: &[SourceRecord]) -> Reconciliation {
        let mut map: IndexMap<String, Animal> = IndexMap::new();
        let mut diagnostics = Vec::new();

        for record in adopt {
            let Some(name) = record.name() else {
                diagnostics.push(missing_name(SourceTable::Adopt, record));
                continue;
            };
            let key = name_key(name);
            if let Some(existing) = map.get(&key) {
                diagnostics.push(duplicate(SourceTable::Adopt, record, name, existing));
                continue;
            }
            map.insert(key, seed(SourceTable::Adopt, name, record));
        }

        for record in rescued {
            let Some(name) = record.name() else {
                diagnostics.push(missing_name(SourceTable::Rescued, record));
                continue;
            };
            let key = name_key(name);
            match map.get_mut(&key) {
                None => {
                    map.insert(key, seed(SourceTable::Rescued, name, record));
                }
                Some(animal) => match animal.provenance.clone().with_rescued(record.id.clone()) {
                    Some(provenance) => {
                        overlay(animal, record);
                        animal.provenance = provenance;
                    }
                    None => {
                        let kept = animal.clone();
                        diagnostics.push(duplicate(SourceTable::Rescued, record, name, &kept));
                    }
                },
            }
        }

        for diagnostic in &diagnostics {
            warn!(%diagnostic, "animal row skipped during reconciliation");
        }

        Reconciliation {
            animals: map.into_values().collect(),
            diagnostics,
        }
    }
}

fn decode(source: SourceTable, rows: Vec<Value>, diagnostics: &mut Vec<Diagnostic>) -> Vec<SourceRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row
                .get("id")
                .and_then(|v| serde_json::from_value::<RecordId>(v.clone()).ok());
            match serde_json::from_value::<SourceRecord>(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    diagnostics.push(Diagnostic {
                        source,
                        id,
                        kind: DiagnosticKind::Undecodable {
                            message: e.to_string(),
                        },
                    });
                    None
                }
            }
        })
        .collect()
}

fn seed(source: SourceTable, name: &str, record: &SourceRecord) -> Animal {
    Animal {
        name: name.to_owned(),
        species: record.species.clone().unwrap_or_default(),
        breed: record.breed.clone(),
        age: record.age,
        gender: record.gender.clone(),
        rescue_date: record.rescue_date,
        story: record.story(source).map(str::to_owned),
        health_status: record.health_status.clone(),
        current_status: record.current_status.unwrap_or(AnimalStatus::Available),
        image_url: record.image_url.clone(),
        created_at: record.created_at,
        provenance: Provenance::single(source, record.id.clone()),
    }
}

/// Rescued values win wherever the rescued row has one. The display name
/// keeps the adopt spelling; both share the join key.
fn overlay(animal: &mut Animal, rescued: &SourceRecord) {
    if let Some(species) = &rescued.species {
        animal.species.clone_from(species);
    }
    if rescued.breed.is_some() {
        animal.breed.clone_from(&rescued.breed);
    }
    if rescued.age.is_some() {
        animal.age = rescued.age;
    }
    if rescued.gender.is_some() {
        animal.gender.clone_from(&rescued.gender);
    }
    if rescued.rescue_date.is_some() {
        animal.rescue_date = rescued.rescue_date;
    }
    if let Some(story) = rescued.story(SourceTable::Rescued) {
        animal.story = Some(story.to_owned());
    }
    if rescued.health_status.is_some() {
        animal.health_status.clone_from(&rescued.health_status);
    }
    if let Some(status) = rescued.current_status {
        animal.current_status = status;
    }
    if rescued.image_url.is_some() {
        animal.image_url.clone_from(&rescued.image_url);
    }
    if rescued.created_at.is_some() {
        animal.created_at = rescued.created_at;
    }
}

fn missing_name(source: SourceTable, record: &SourceRecord) -> Diagnostic {
    Diagnostic {
        source,
        id: Some(record.id.clone()),
        kind: DiagnosticKind::MissingName,
    }
}

fn duplicate(source: SourceTable, record: &SourceRecord, name: &str, kept: &Animal) -> Diagnostic {
    let kept = kept
        .provenance
        .id_for(source)
        .cloned()
        .unwrap_or_else(|| record.id.clone());
    Diagnostic {
        source,
        id: Some(record.id.clone()),
        kind: DiagnosticKind::DuplicateName {
            name: name.to_owned(),
            kept,
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(value: Value) -> SourceRecord {
        serde_json::from_value(value).unwrap()
    }

    fn adopt_rex() -> SourceRecord {
        record(json!({
            "id": "a1", "name": "Rex", "species": "Dog", "breed": "Labrador",
            "age": 3, "description": "Friendly", "current_status": "Available"
        }))
    }

    fn rescued_rex() -> SourceRecord {
        record(json!({
            "id": "r1", "name": " rex ", "species": "Dog", "age": 4,
            "rescue_story": "Found by the river", "current_status": "Under Care"
        }))
    }

    #[test]
    fn same_name_merges_with_rescued_precedence() {
        let out = EntityReconciler::merge(&[adopt_rex()], &[rescued_rex()]);
        assert_eq!(out.animals.len(), 1);
        assert!(out.diagnostics.is_empty());

        let rex = &out.animals[0];
        assert_eq!(rex.name, "Rex");
        assert_eq!(rex.age, Some(4));
        assert_eq!(rex.breed.as_deref(), Some("Labrador"));
        assert_eq!(rex.story.as_deref(), Some("Found by the river"));
        assert_eq!(rex.current_status, AnimalStatus::UnderCare);
        assert_eq!(
            rex.provenance,
            Provenance::Both {
                adopt: RecordId::from("a1"),
                rescued: RecordId::from("r1"),
            }
        );
    }

    #[test]
    fn unmatched_rows_keep_single_provenance_and_order() {
        let milo = record(json!({ "id": "r2", "name": "Milo", "species": "Cat" }));
        let out = EntityReconciler::merge(&[adopt_rex()], &[milo]);

        let names: Vec<&str> = out.animals.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Rex", "Milo"]);
        assert_eq!(out.animals[0].provenance, Provenance::Adopt { adopt: RecordId::from("a1") });
        assert_eq!(out.animals[0].story.as_deref(), Some("Friendly"));
        assert_eq!(
            out.animals[1].provenance,
            Provenance::Rescued { rescued: RecordId::from("r2") }
        );
    }

    #[test]
    fn nameless_rows_are_reported_not_merged() {
        let blank = record(json!({ "id": "r9", "name": "   ", "species": "Dog" }));
        let out = EntityReconciler::merge(&[adopt_rex()], &[blank]);

        assert_eq!(out.animals.len(), 1);
        assert!(!out.animals[0].is_dual_sourced());
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MissingName);
        assert_eq!(out.diagnostics[0].id, Some(RecordId::from("r9")));
    }

    #[test]
    fn duplicate_name_within_a_table_skips_the_later_row() {
        let second = record(json!({ "id": "r3", "name": "REX", "species": "Dog" }));
        let out = EntityReconciler::merge(&[adopt_rex()], &[rescued_rex(), second]);

        assert_eq!(out.animals.len(), 1);
        assert_eq!(out.animals[0].provenance.rescued_id(), Some(&RecordId::from("r1")));
        assert_eq!(
            out.diagnostics[0].kind,
            DiagnosticKind::DuplicateName {
                name: "REX".into(),
                kept: RecordId::from("r1"),
            }
        );
    }

    #[test]
    fn merge_is_deterministic() {
        let adopt = [adopt_rex()];
        let rescued = [rescued_rex(), record(json!({ "id": "r2", "name": "Milo" }))];
        assert_eq!(
            EntityReconciler::merge(&adopt, &rescued),
            EntityReconciler::merge(&adopt, &rescued)
        );
    }

    #[test]
    fn undecodable_rows_become_diagnostics() {
        let out = EntityReconciler::merge_rows(
            vec![json!({ "id": "a1", "name": "Rex", "age": "three" })],
            vec![json!({ "id": "r1", "name": "Milo" })],
        );
        assert_eq!(out.animals.len(), 1);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(matches!(out.diagnostics[0].kind, DiagnosticKind::Undecodable { .. }));
        assert_eq!(out.diagnostics[0].id, Some(RecordId::from("a1")));
    }
}
