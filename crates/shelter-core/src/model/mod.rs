// ── Domain model ──
//
// Typed rows for every backing collection, plus the reconciled `Animal`.

mod adoption;
mod animal;
mod collection;
mod contact;
mod donation;
mod gov_rule;
mod lost_found;
mod record_id;
mod volunteer;

use serde::de::DeserializeOwned;

pub use adoption::AdoptionRequest;
pub use animal::{
    Animal, AnimalPatch, AnimalStatus, NewAnimal, Placement, Provenance, SourceRecord,
    SourceTable, name_key,
};
pub use collection::Collection;
pub use contact::ContactMessageRow;
pub use donation::{Donation, DonationSummary};
pub use gov_rule::{GovRule, RuleDraft, parse_tags, toggle_publish_patch};
pub use lost_found::{LostFoundSubmission, SubmissionStatus, review_patch};
pub use record_id::RecordId;
pub use volunteer::{Volunteer, VolunteerStatus};

/// A row type that lives in exactly one collection and is listed as-is.
pub trait SectionRow: DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Column the list is ordered by, newest first.
    const ORDER_BY: &'static str;

    fn id(&self) -> &RecordId;
}
