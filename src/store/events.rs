use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use super::StoreError;

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub created_by: Uuid,
    /// RSVP set; deduplicated, insertion order preserved.
    pub attendees: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

pub trait EventStore: Send + Sync {
    fn insert(&self, event: Event) -> Result<Event, StoreError>;

    /// All events, soonest first.
    fn list(&self) -> Vec<Event>;

    /// Add an account to the attendee set. Idempotent.
    fn rsvp(&self, event_id: Uuid, account_id: Uuid) -> Result<Event, StoreError>;
}

#[derive(Default)]
pub struct MemoryEvents {
    inner: RwLock<HashMap<Uuid, Event>>,
}

impl EventStore for MemoryEvents {
    fn insert(&self, event: Event) -> Result<Event, StoreError> {
        self.inner.write().insert(event.id, event.clone());
        Ok(event)
    }

    fn list(&self) -> Vec<Event> {
        let mut out: Vec<Event> = self.inner.read().values().cloned().collect();
        out.sort_by_key(|e| e.starts_at);
        out
    }

    fn rsvp(&self, event_id: Uuid, account_id: Uuid) -> Result<Event, StoreError> {
        let mut inner = self.inner.write();
        let event = inner.get_mut(&event_id).ok_or(StoreError::NotFound)?;
        if !event.attendees.contains(&account_id) {
            event.attendees.push(account_id);
        }
        Ok(event.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(title: &str, starts_in_days: i64) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: title.into(),
            description: "".into(),
            location: "Alumni Hall".into(),
            starts_at: Utc::now() + Duration::days(starts_in_days),
            created_by: Uuid::new_v4(),
            attendees: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn list_orders_by_start_time() {
        let store = MemoryEvents::default();
        store.insert(event("later", 10)).unwrap();
        store.insert(event("sooner", 2)).unwrap();
        let all = store.list();
        assert_eq!(all[0].title, "sooner");
        assert_eq!(all[1].title, "later");
    }

    #[test]
    fn rsvp_is_idempotent() {
        let store = MemoryEvents::default();
        let ev = store.insert(event("reunion", 5)).unwrap();
        let guest = Uuid::new_v4();
        store.rsvp(ev.id, guest).unwrap();
        let again = store.rsvp(ev.id, guest).unwrap();
        assert_eq!(again.attendees, vec![guest]);
    }

    #[test]
    fn rsvp_unknown_event_is_not_found() {
        let store = MemoryEvents::default();
        let err = store.rsvp(Uuid::new_v4(), Uuid::new_v4()).unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }
}
