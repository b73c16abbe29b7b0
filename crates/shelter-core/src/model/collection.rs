// ── Backing collections ──

use serde::{Deserialize, Serialize};

/// Every table the shelter tools read or write, by wire name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Collection {
    AdoptAnimals,
    RescuedAnimals,
    Adoptions,
    Donations,
    Volunteers,
    Contacts,
    LostFoundSubmissions,
    FoundAnimals,
    GovRules,
    Admins,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_names() {
        let names: Vec<&str> = Collection::iter().map(Collection::as_str).collect();
        assert_eq!(
            names,
            [
                "adopt_animals",
                "rescued_animals",
                "adoptions",
                "donations",
                "volunteers",
                "contacts",
                "lost_found_submissions",
                "found_animals",
                "gov_rules",
                "admins",
            ]
        );
    }

    #[test]
    fn parses_wire_name() {
        let c: Collection = "lost_found_submissions".parse().unwrap();
        assert_eq!(c, Collection::LostFoundSubmissions);
        assert_eq!(c.to_string(), "lost_found_submissions");
    }
}
