// ── Filter predicates for list snapshots ──
//
// Applied to snapshots client-side without re-querying the backend.

use crate::model::{
    AdoptionRequest, Animal, AnimalStatus, ContactMessageRow, Donation, GovRule, Volunteer,
};

/// Age groups offered by the animal list.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AgeBracket {
    #[default]
    All,
    /// Two years or younger.
    Young,
    /// Three to six years.
    Adult,
    /// Older than six.
    Senior,
}

impl AgeBracket {
    /// Unknown ages only match [`AgeBracket::All`].
    pub fn matches(self, age: Option<u32>) -> bool {
        match (self, age) {
            (Self::All, _) => true,
            (_, None) => false,
            (Self::Young, Some(a)) => a <= 2,
            (Self::Adult, Some(a)) => (3..=6).contains(&a),
            (Self::Senior, Some(a)) => a > 6,
        }
    }
}

/// Combined animal list filter. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimalFilter {
    /// Substring of name or breed, case-insensitive.
    pub search: Option<String>,
    pub species: Option<String>,
    pub age: AgeBracket,
    pub status: Option<AnimalStatus>,
}

impl AnimalFilter {
    pub fn matches(&self, animal: &Animal) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            contains_ci(&animal.name, needle)
                || animal.breed.as_deref().is_some_and(|b| contains_ci(b, needle))
        });
        let species_ok = self
            .species
            .as_deref()
            .is_none_or(|s| animal.species.trim().eq_ignore_ascii_case(s.trim()));
        let status_ok = self.status.is_none_or(|s| animal.current_status == s);

        search_ok && species_ok && status_ok && self.age.matches(animal.age)
    }
}

// ── People lists ─────────────────────────────────────────────────────

/// Rows that the people search can look into.
pub trait Searchable {
    /// Text fields matched case-insensitively.
    fn search_fields(&self) -> Vec<&str>;

    fn phone(&self) -> &str;
}

impl Searchable for Donation {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email]
    }

    fn phone(&self) -> &str {
        &self.phone
    }
}

impl Searchable for Volunteer {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email]
    }

    fn phone(&self) -> &str {
        &self.phone
    }
}

impl Searchable for ContactMessageRow {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.message]
    }

    fn phone(&self) -> &str {
        &self.phone
    }
}

impl Searchable for AdoptionRequest {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email]
    }

    fn phone(&self) -> &str {
        &self.contact_no
    }
}

/// Free-text search for donations, volunteers and messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeopleFilter {
    pub search: Option<String>,
}

impl PeopleFilter {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
        }
    }

    pub fn matches<T: Searchable>(&self, row: &T) -> bool {
        let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return true;
        };
        row.search_fields().iter().any(|f| contains_ci(f, needle)) || row.phone().contains(needle)
    }
}

// ── Government rules ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleFilter {
    /// Matched against title, summary, jurisdiction and tags.
    pub search: Option<String>,
    pub jurisdiction: Option<String>,
    pub published_only: bool,
}

impl RuleFilter {
    pub fn matches(&self, rule: &GovRule) -> bool {
        if self.published_only && !rule.published {
            return false;
        }
        let jurisdiction_ok = self.jurisdiction.as_deref().is_none_or(|j| {
            rule.jurisdiction
                .as_deref()
                .is_some_and(|rj| rj.eq_ignore_ascii_case(j))
        });
        if !jurisdiction_ok {
            return false;
        }
        self.search.as_deref().is_none_or(|needle| {
            contains_ci(&rule.title, needle)
                || rule.summary.as_deref().is_some_and(|s| contains_ci(s, needle))
                || rule.jurisdiction.as_deref().is_some_and(|s| contains_ci(s, needle))
                || rule.tags().iter().any(|t| contains_ci(t, needle))
        })
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{Provenance, RecordId};

    fn animal(name: &str, species: &str, breed: Option<&str>, age: Option<u32>) -> Animal {
        Animal {
            name: name.into(),
            species: species.into(),
            breed: breed.map(Into::into),
            age,
            gender: None,
            rescue_date: None,
            story: None,
            health_status: None,
            current_status: AnimalStatus::Available,
            image_url: None,
            created_at: None,
            provenance: Provenance::Rescued {
                rescued: RecordId::from("r1"),
            },
        }
    }

    #[test]
    fn age_brackets() {
        assert!(AgeBracket::Young.matches(Some(2)));
        assert!(AgeBracket::Adult.matches(Some(3)));
        assert!(AgeBracket::Adult.matches(Some(6)));
        assert!(AgeBracket::Senior.matches(Some(7)));
        assert!(!AgeBracket::Senior.matches(None));
        assert!(AgeBracket::All.matches(None));
        assert_eq!("Senior".parse::<AgeBracket>().unwrap(), AgeBracket::Senior);
    }

    #[test]
    fn animal_search_covers_name_and_breed() {
        let lab = animal("Rex", "Dog", Some("Labrador"), Some(4));
        let filter = AnimalFilter {
            search: Some("lab".into()),
            ..AnimalFilter::default()
        };
        assert!(filter.matches(&lab));

        let filter = AnimalFilter {
            species: Some("cat".into()),
            ..AnimalFilter::default()
        };
        assert!(!filter.matches(&lab));

        let filter = AnimalFilter {
            status: Some(AnimalStatus::Adopted),
            ..AnimalFilter::default()
        };
        assert!(!filter.matches(&lab));
    }

    #[test]
    fn people_search_matches_phone_substring() {
        let donation: Donation = serde_json::from_value(json!({
            "id": "d1", "name": "Asha Rao", "email": "asha@example.org",
            "phone": "9876543210", "amount": 500.0, "payment_status": "success"
        }))
        .unwrap();
        assert!(PeopleFilter::new("ASHA").matches(&donation));
        assert!(PeopleFilter::new("65432").matches(&donation));
        assert!(!PeopleFilter::new("ravi").matches(&donation));
        assert!(PeopleFilter::default().matches(&donation));
    }

    #[test]
    fn rule_filter_checks_tags_and_publish_state() {
        let rule: GovRule = serde_json::from_value(json!({
            "id": "g1", "title": "Street dog feeding", "jurisdiction": "Delhi",
            "tags": ["feeding", "community"], "published": false
        }))
        .unwrap();
        let by_tag = RuleFilter {
            search: Some("commun".into()),
            ..RuleFilter::default()
        };
        assert!(by_tag.matches(&rule));

        let published = RuleFilter {
            published_only: true,
            ..RuleFilter::default()
        };
        assert!(!published.matches(&rule));

        let elsewhere = RuleFilter {
            jurisdiction: Some("Mumbai".into()),
            ..RuleFilter::default()
        };
        assert!(!elsewhere.matches(&rule));
    }
}
