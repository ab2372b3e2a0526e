//! Persistence collaborator for the application's collections.
//!
//! The HTTP layer and the credential gate only talk to the traits defined
//! here; a managed document store slots in behind them. The bundled in-memory
//! implementation provides the same contract the gate relies on, in
//! particular the atomic unique-email insert.

mod accounts;
mod donations;
mod events;

pub use accounts::{Account, AccountStore, AccountSummary, MemoryAccounts, Profile};
pub use donations::{Donation, DonationStore, MemoryDonations};
pub use events::{Event, EventStore, MemoryEvents};

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("record not found")]
    NotFound,
}

/// Handles to the collection stores, shared across requests.
#[derive(Clone)]
pub struct SharedStore {
    pub accounts: Arc<dyn AccountStore>,
    pub events: Arc<dyn EventStore>,
    pub donations: Arc<dyn DonationStore>,
}

impl SharedStore {
    pub fn in_memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccounts::default()),
            events: Arc::new(MemoryEvents::default()),
            donations: Arc::new(MemoryDonations::default()),
        }
    }
}
