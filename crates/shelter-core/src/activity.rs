// ── Recent activity ──
//
// The dashboard's "latest updates" feed: the newest few rows of five
// collections, read in parallel and merged newest first. Any failed read
// fails the whole feed.

use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::client::{Query, ResourceClient, select_rows};
use crate::error::CoreError;
use crate::model::{
    AdoptionRequest, Collection, ContactMessageRow, Donation, SectionRow, SourceRecord, Volunteer,
};

/// Rows read from each collection.
pub const PER_SECTION: usize = 3;

/// Entries kept after merging.
pub const FEED_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityKind {
    Adoption,
    Donation,
    Volunteer,
    Contact,
    Animal,
}

impl ActivityKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Adoption => "New adoption request",
            Self::Donation => "Donation received",
            Self::Volunteer => "New volunteer application",
            Self::Contact => "New contact message",
            Self::Animal => "New animal added",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Activity {
    /// `<kind>-<row id>`, unique across the feed.
    pub id: String,
    pub kind: ActivityKind,
    pub title: &'static str,
    pub details: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

impl Activity {
    fn new(
        kind: ActivityKind,
        id: impl std::fmt::Display,
        details: Option<String>,
        time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: format!("{kind}-{id}"),
            kind,
            title: kind.title(),
            details,
            time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecentActivity {
    pub items: Vec<Activity>,
}

impl RecentActivity {
    pub async fn load(client: &dyn ResourceClient) -> Result<Self, CoreError> {
        let animals_query = Query::new().order_by("created_at", false).limit(PER_SECTION);
        let (adoptions, donations, volunteers, contacts, animals) = tokio::try_join!(
            latest::<AdoptionRequest>(client),
            latest::<Donation>(client),
            latest::<Volunteer>(client),
            latest::<ContactMessageRow>(client),
            select_rows::<SourceRecord>(
                client,
                Collection::RescuedAnimals,
                &animals_query,
            ),
        )?;

        let mut items = Vec::new();
        items.extend(adoptions.into_iter().map(|a| {
            Activity::new(ActivityKind::Adoption, &a.id, sender(&a.name), a.created_at)
        }));
        items.extend(donations.into_iter().map(|d| {
            let details = match sender(&d.name) {
                Some(sender) => format!("{} {sender}", rupees(d.amount)),
                None => rupees(d.amount),
            };
            Activity::new(ActivityKind::Donation, &d.id, Some(details), d.created_at)
        }));
        items.extend(volunteers.into_iter().map(|v| {
            Activity::new(ActivityKind::Volunteer, &v.id, sender(&v.name), v.created_at)
        }));
        items.extend(contacts.into_iter().map(|c| {
            Activity::new(ActivityKind::Contact, &c.id, sender(&c.name), c.created_at)
        }));
        items.extend(animals.into_iter().map(|r| {
            let name = r.name().map(str::to_owned);
            Activity::new(ActivityKind::Animal, &r.id, name, r.created_at)
        }));

        // Newest first; undated rows sink to the end in read order.
        items.sort_by_key(|a| Reverse(a.time));
        items.truncate(FEED_LENGTH);

        debug!(entries = items.len(), "recent activity loaded");
        Ok(Self { items })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

async fn latest<T: SectionRow>(client: &dyn ResourceClient) -> Result<Vec<T>, CoreError> {
    let query = Query::new().order_by(T::ORDER_BY, false).limit(PER_SECTION);
    select_rows(client, T::COLLECTION, &query).await
}

fn sender(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| format!("from {name}"))
}

/// `₹1,250` or `₹250.50`: whole amounts without decimals, thousands
/// grouped.
pub fn rupees(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (whole, frac) = (cents / 100, (cents % 100).abs());
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if cents < 0 { "-" } else { "" };
    if frac == 0 {
        format!("₹{sign}{grouped}")
    } else {
        format!("₹{sign}{grouped}.{frac:02}")
    }
}

/// `Just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn time_ago(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - time).num_minutes();
    if minutes < 1 {
        return "Just now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::client::{FailureKind, MemoryClient, Op};

    fn at(day: u32, hour: u32) -> String {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0)
            .unwrap()
            .to_rfc3339()
    }

    fn seeded() -> MemoryClient {
        let memory = MemoryClient::new();
        memory.seed(
            Collection::Adoptions,
            vec![json!({ "id": "x1", "name": "Asha", "created_at": at(10, 9) })],
        );
        memory.seed(
            Collection::Donations,
            vec![
                json!({ "id": "d1", "name": "Ravi", "amount": 1250.0, "created_at": at(12, 9) }),
                json!({ "id": "d2", "name": "Meera", "amount": 99.5, "created_at": at(1, 9) }),
            ],
        );
        memory.seed(
            Collection::Volunteers,
            (1..=5)
                .map(|h| json!({ "id": format!("v{h}"), "name": "Vol", "created_at": at(11, h) }))
                .collect(),
        );
        memory.seed(
            Collection::Contacts,
            vec![json!({ "id": "c1", "name": "Kiran", "created_at": at(12, 10) })],
        );
        memory.seed(
            Collection::RescuedAnimals,
            vec![json!({ "id": "r1", "name": "Milo", "created_at": at(9, 9) })],
        );
        memory
    }

    #[tokio::test]
    async fn merges_newest_across_sections() {
        let memory = seeded();
        let feed = RecentActivity::load(&memory).await.unwrap();

        let ids: Vec<&str> = feed.items.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(
            ids,
            [
                "contact-c1",
                "donation-d1",
                "volunteer-v5",
                "volunteer-v4",
                "volunteer-v3",
                "adoption-x1",
            ]
        );
        assert_eq!(feed.items[1].title, "Donation received");
        assert_eq!(feed.items[1].details.as_deref(), Some("₹1,250 from Ravi"));
        assert_eq!(memory.call_count(Collection::Volunteers, Op::Select), 1);
    }

    #[tokio::test]
    async fn one_failed_read_fails_the_feed() {
        let memory = seeded();
        memory.fail_next(
            Collection::Contacts,
            Op::Select,
            FailureKind::Policy("permission denied for table contacts".into()),
        );
        assert!(RecentActivity::load(&memory).await.is_err());
    }

    #[tokio::test]
    async fn empty_backend_gives_empty_feed() {
        let feed = RecentActivity::load(&MemoryClient::new()).await.unwrap();
        assert!(feed.is_empty());
    }

    #[test]
    fn rupee_formatting() {
        assert_eq!(rupees(0.0), "₹0");
        assert_eq!(rupees(250.5), "₹250.50");
        assert_eq!(rupees(1_234_567.0), "₹1,234,567");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now, now), "Just now");
        assert_eq!(time_ago(now - chrono::Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - chrono::Duration::hours(3), now), "3h ago");
        assert_eq!(time_ago(now - chrono::Duration::days(2), now), "2d ago");
    }
}
