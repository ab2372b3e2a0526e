//! Role-guarded member features over the store: events with RSVPs, donation
//! tracking and the directories. The gate supplies the principals; the store
//! supplies the records.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use uuid::Uuid;

use alumni_connect::error::AppError;
use alumni_connect::identity::{Gate, LoginRequest, Principal, RegisterRequest, Role, TokenSigner};
use alumni_connect::store::{
    AccountStore, Donation, DonationStore, Event, EventStore, SharedStore,
};

fn new_gate() -> (Arc<Gate>, SharedStore) {
    let store = SharedStore::in_memory();
    let gate = Arc::new(Gate::new(store.accounts.clone(), TokenSigner::new("integration-secret")));
    (gate, store)
}

/// Register + login, returning the verified principal the handlers would see.
fn member(gate: &Gate, name: &str, email: &str, role: &str) -> Principal {
    gate.register(&RegisterRequest {
        full_name: name.into(),
        email: email.into(),
        password: "secret1".into(),
        role: role.into(),
        phone_number: None,
    })
    .expect("register");
    let resp = gate
        .login(&LoginRequest { email: email.into(), password: "secret1".into() })
        .expect("login");
    gate.verify(Some(&resp.token), &[]).expect("verify")
}

fn event_for(creator: &Principal, title: &str) -> Event {
    Event {
        id: Uuid::new_v4(),
        title: title.into(),
        description: "Annual gathering".into(),
        location: "Alumni Hall".into(),
        starts_at: Utc::now() + Duration::days(30),
        created_by: creator.account_id,
        attendees: Vec::new(),
        created_at: Utc::now(),
    }
}

#[test]
fn admins_create_events_and_members_rsvp() -> Result<()> {
    let (gate, store) = new_gate();
    let admin = member(&gate, "Ada Admin", "ada@x.com", "admin");
    let alum = member(&gate, "Jane Doe", "jane@x.com", "alumni");

    // The events route requires the admin role
    assert!(gate.verify(None, &[Role::Admin]).is_err());
    let created = store.events.insert(event_for(&admin, "Reunion 2026"))?;

    store.events.rsvp(created.id, alum.account_id)?;
    let listed = store.events.list();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].attendees, vec![alum.account_id]);
    Ok(())
}

#[test]
fn event_creation_is_admin_only() {
    let (gate, _) = new_gate();
    member(&gate, "Jane Doe", "jane@x.com", "alumni");

    // Re-verify the alum's token against the admin requirement
    let resp = gate
        .login(&LoginRequest { email: "jane@x.com".into(), password: "secret1".into() })
        .unwrap();
    let err = gate.verify(Some(&resp.token), &[Role::Admin]).unwrap_err();
    assert!(matches!(err, AppError::Forbidden { .. }));
}

#[test]
fn donation_ledger_is_admin_only_but_own_listing_is_not() -> Result<()> {
    let (gate, store) = new_gate();
    let admin = member(&gate, "Ada Admin", "ada@x.com", "admin");
    let alum = member(&gate, "Jane Doe", "jane@x.com", "alumni");

    store.donations.insert(Donation {
        id: Uuid::new_v4(),
        donor_id: alum.account_id,
        amount_cents: 5000,
        note: Some("class of 2015".into()),
        status: "completed".into(),
        created_at: Utc::now(),
    })?;

    // Ledger access mirrors the route guard: admin passes, alumni does not
    let alum_token = gate
        .login(&LoginRequest { email: "jane@x.com".into(), password: "secret1".into() })?
        .token;
    assert!(matches!(
        gate.verify(Some(&alum_token), &[Role::Admin]).unwrap_err(),
        AppError::Forbidden { .. }
    ));
    let admin_token = gate
        .login(&LoginRequest { email: "ada@x.com".into(), password: "secret1".into() })?
        .token;
    assert!(gate.verify(Some(&admin_token), &[Role::Admin]).is_ok());

    let ledger = store.donations.list_all();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].status, "completed");

    let own = store.donations.list_by_donor(alum.account_id);
    assert_eq!(own.len(), 1);
    assert!(store.donations.list_by_donor(admin.account_id).is_empty());
    Ok(())
}

#[test]
fn student_directory_admits_students_and_admins_only() -> Result<()> {
    let (gate, store) = new_gate();
    member(&gate, "Ada Admin", "ada@x.com", "admin");
    member(&gate, "Sam Student", "sam@x.com", "student");
    member(&gate, "Jane Doe", "jane@x.com", "alumni");

    let required = [Role::Admin, Role::Student];
    for (email, expect_ok) in [("ada@x.com", true), ("sam@x.com", true), ("jane@x.com", false)] {
        let token = gate
            .login(&LoginRequest { email: email.into(), password: "secret1".into() })?
            .token;
        assert_eq!(gate.verify(Some(&token), &required).is_ok(), expect_ok, "role gate for {email}");
    }

    let students = store.accounts.list_by_role(Role::Student);
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].email, "sam@x.com");

    let alumni = store.accounts.list_by_role(Role::Alumni);
    assert_eq!(alumni.len(), 1);
    Ok(())
}
