// ── Government rules knowledge base (`gov_rules`) ──

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Collection, RecordId, SectionRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovRule {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub jurisdiction: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl GovRule {
    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

impl SectionRow for GovRule {
    const COLLECTION: Collection = Collection::GovRules;
    const ORDER_BY: &'static str = "created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Create/update payload for a rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleDraft {
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub pdf_url: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub jurisdiction: Option<String>,
    pub tags: Vec<String>,
    pub published: bool,
    pub source_url: Option<String>,
}

impl RuleDraft {
    /// Row body. `published_at` is stamped when the draft publishes a rule
    /// that was not published before, and kept otherwise.
    pub fn to_row(&self, previous: Option<&GovRule>, now: DateTime<Utc>) -> Value {
        let mut row = Map::new();
        row.insert("title".into(), Value::from(self.title.trim()));
        for (key, value) in [
            ("summary", &self.summary),
            ("content", &self.content),
            ("pdf_url", &self.pdf_url),
            ("jurisdiction", &self.jurisdiction),
            ("source_url", &self.source_url),
        ] {
            row.insert(
                key.into(),
                value
                    .as_deref()
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map_or(Value::Null, Value::from),
            );
        }
        row.insert(
            "effective_date".into(),
            self.effective_date
                .map_or(Value::Null, |d| Value::from(d.to_string())),
        );
        row.insert(
            "tags".into(),
            if self.tags.is_empty() {
                Value::Null
            } else {
                Value::from(self.tags.clone())
            },
        );
        row.insert("published".into(), Value::from(self.published));

        let was_published = previous.is_some_and(|r| r.published);
        let published_at = if self.published && !was_published {
            Some(now)
        } else {
            previous.and_then(|r| r.published_at)
        };
        row.insert(
            "published_at".into(),
            published_at.map_or(Value::Null, |t| Value::from(t.to_rfc3339())),
        );
        Value::Object(row)
    }
}

/// Split a comma-separated tag list, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Patch flipping the published flag of `rule`.
pub fn toggle_publish_patch(rule: &GovRule, now: DateTime<Utc>) -> Value {
    let published = !rule.published;
    let published_at = if published { Some(now) } else { rule.published_at };
    serde_json::json!({
        "published": published,
        "published_at": published_at.map(|t| t.to_rfc3339()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rule(published: bool) -> GovRule {
        GovRule {
            id: RecordId::from("g1"),
            title: "Stray feeding guidelines".into(),
            summary: None,
            content: None,
            pdf_url: None,
            effective_date: None,
            jurisdiction: Some("Delhi".into()),
            tags: None,
            published,
            published_at: published.then(|| Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            created_by: None,
            source_url: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn parses_comma_tags() {
        assert_eq!(parse_tags(" feeding, strays ,, welfare "), [
            "feeding", "strays", "welfare"
        ]);
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn first_publish_stamps_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let draft = RuleDraft {
            title: "  Pet registration ".into(),
            published: true,
            ..RuleDraft::default()
        };
        let row = draft.to_row(None, now);
        assert_eq!(row["title"], "Pet registration");
        assert_eq!(row["published_at"], now.to_rfc3339());
        assert!(row["tags"].is_null());

        let existing = rule(true);
        let row = draft.to_row(Some(&existing), now);
        assert_eq!(
            row["published_at"],
            existing.published_at.unwrap().to_rfc3339()
        );
    }

    #[test]
    fn toggle_publish_flips_flag() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let patch = toggle_publish_patch(&rule(false), now);
        assert_eq!(patch["published"], true);
        assert_eq!(patch["published_at"], now.to_rfc3339());

        let patch = toggle_publish_patch(&rule(true), now);
        assert_eq!(patch["published"], false);
        assert!(!patch["published_at"].is_null());
    }
}
