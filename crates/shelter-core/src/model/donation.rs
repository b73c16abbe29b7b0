// ── Donations (`donations`) ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, RecordId, SectionRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub payment_status: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Donation {
    pub fn is_completed(&self) -> bool {
        let status = self.payment_status.to_lowercase();
        status == "success" || status == "completed"
    }

    pub fn is_pending(&self) -> bool {
        self.payment_status.eq_ignore_ascii_case("pending")
    }
}

impl SectionRow for Donation {
    const COLLECTION: Collection = Collection::Donations;
    const ORDER_BY: &'static str = "created_at";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Totals shown above the donations list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DonationSummary {
    pub total_amount: f64,
    pub count: usize,
    pub completed: usize,
    pub pending: usize,
}

impl DonationSummary {
    pub fn from_donations<'a>(donations: impl IntoIterator<Item = &'a Donation>) -> Self {
        donations
            .into_iter()
            .fold(Self::default(), |mut acc, d| {
                acc.total_amount += d.amount;
                acc.count += 1;
                if d.is_completed() {
                    acc.completed += 1;
                } else if d.is_pending() {
                    acc.pending += 1;
                }
                acc
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(amount: f64, status: &str) -> Donation {
        Donation {
            id: RecordId::new_v4(),
            name: "Donor".into(),
            email: "d@example.org".into(),
            phone: String::new(),
            amount,
            payment_status: status.into(),
            created_at: None,
        }
    }

    #[test]
    fn summary_counts_by_status() {
        let list = [
            donation(500.0, "success"),
            donation(250.5, "Completed"),
            donation(100.0, "pending"),
            donation(50.0, "failed"),
        ];
        let summary = DonationSummary::from_donations(&list);
        assert!((summary.total_amount - 900.5).abs() < f64::EPSILON);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.pending, 1);
    }
}
