// ── Dashboard statistics ──
//
// Headline counts for the admin dashboard, computed from one parallel
// read of five collections. Any failed read fails the whole computation.

use serde::Serialize;
use tracing::debug;

use crate::client::{Query, ResourceClient, select_rows};
use crate::error::CoreError;
use crate::model::{
    AdoptionRequest, AnimalStatus, Collection, ContactMessageRow, Donation, SourceRecord,
    Volunteer,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_animals: usize,
    pub available: usize,
    pub adopted: usize,
    pub under_care: usize,
    pub donation_total: f64,
    pub volunteers: usize,
    pub messages: usize,
    pub unread_messages: usize,
    pub adoption_requests: usize,
}

impl DashboardStats {
    pub async fn load(client: &dyn ResourceClient) -> Result<Self, CoreError> {
        let all = Query::new();
        let (animals, donations, volunteers, messages, adoptions) = tokio::try_join!(
            select_rows::<SourceRecord>(client, Collection::RescuedAnimals, &all),
            select_rows::<Donation>(client, Collection::Donations, &all),
            select_rows::<Volunteer>(client, Collection::Volunteers, &all),
            select_rows::<ContactMessageRow>(client, Collection::Contacts, &all),
            select_rows::<AdoptionRequest>(client, Collection::Adoptions, &all),
        )?;

        let status_count = |status: AnimalStatus| {
            animals
                .iter()
                .filter(|a| a.current_status.unwrap_or_default() == status)
                .count()
        };

        let stats = Self {
            total_animals: animals.len(),
            available: status_count(AnimalStatus::Available),
            adopted: status_count(AnimalStatus::Adopted),
            under_care: status_count(AnimalStatus::UnderCare),
            donation_total: donations.iter().map(|d| d.amount).sum(),
            volunteers: volunteers.len(),
            messages: messages.len(),
            unread_messages: messages.iter().filter(|m| !m.read_status).count(),
            adoption_requests: adoptions.len(),
        };
        debug!(?stats, "dashboard stats loaded");
        Ok(stats)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::{FailureKind, MemoryClient, Op};

    fn seeded() -> MemoryClient {
        let memory = MemoryClient::new();
        memory.seed(
            Collection::RescuedAnimals,
            vec![
                json!({ "id": "r1", "name": "Rex", "current_status": "Available" }),
                json!({ "id": "r2", "name": "Milo", "current_status": "Adopted" }),
                json!({ "id": "r3", "name": "Coco", "current_status": "Under Care" }),
                json!({ "id": "r4", "name": "Bruno" }),
            ],
        );
        memory.seed(
            Collection::Donations,
            vec![
                json!({ "id": "d1", "amount": 500.0 }),
                json!({ "id": "d2", "amount": 250.5 }),
            ],
        );
        memory.seed(Collection::Volunteers, vec![json!({ "id": "v1" })]);
        memory.seed(
            Collection::Contacts,
            vec![
                json!({ "id": "c1", "read_status": true }),
                json!({ "id": "c2", "read_status": false }),
            ],
        );
        memory
    }

    #[tokio::test]
    async fn counts_every_section() {
        let stats = DashboardStats::load(&seeded()).await.unwrap();
        assert_eq!(stats.total_animals, 4);
        assert_eq!(stats.available, 2);
        assert_eq!(stats.adopted, 1);
        assert_eq!(stats.under_care, 1);
        assert!((stats.donation_total - 750.5).abs() < f64::EPSILON);
        assert_eq!(stats.volunteers, 1);
        assert_eq!(stats.messages, 2);
        assert_eq!(stats.unread_messages, 1);
        assert_eq!(stats.adoption_requests, 0);
    }

    #[tokio::test]
    async fn one_failed_read_fails_all() {
        let memory = seeded();
        memory.fail_next(
            Collection::Volunteers,
            Op::Select,
            FailureKind::Transport("connection reset".into()),
        );
        assert!(DashboardStats::load(&memory).await.is_err());
    }
}
