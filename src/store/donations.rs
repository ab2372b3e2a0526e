use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use super::StoreError;

/// A recorded donation. Payment collection is an external collaborator that
/// always succeeds in this deployment, so records land as "completed".
#[derive(Debug, Clone, Serialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub trait DonationStore: Send + Sync {
    fn insert(&self, donation: Donation) -> Result<Donation, StoreError>;

    /// Full ledger, newest first.
    fn list_all(&self) -> Vec<Donation>;

    /// One donor's donations, newest first.
    fn list_by_donor(&self, donor_id: Uuid) -> Vec<Donation>;
}

#[derive(Default)]
pub struct MemoryDonations {
    inner: RwLock<Vec<Donation>>,
}

impl DonationStore for MemoryDonations {
    fn insert(&self, donation: Donation) -> Result<Donation, StoreError> {
        self.inner.write().push(donation.clone());
        Ok(donation)
    }

    fn list_all(&self) -> Vec<Donation> {
        let mut out = self.inner.read().clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    fn list_by_donor(&self, donor_id: Uuid) -> Vec<Donation> {
        let mut out: Vec<Donation> =
            self.inner.read().iter().filter(|d| d.donor_id == donor_id).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }
}
