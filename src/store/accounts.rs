use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use uuid::Uuid;

use crate::identity::Role;

use super::StoreError;

/// A registered person. This record owns the password hash and therefore
/// never derives `Serialize`; responses go through the `Summary` and
/// `Profile` projections below.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub full_name: String,
    /// Unique across all accounts, case-sensitive as stored.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Safe summary returned alongside a fresh session token.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// Public profile fields, also used for directory listings.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            role: self.role,
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }
}

pub trait AccountStore: Send + Sync {
    /// Insert a new account. Email uniqueness is enforced atomically inside
    /// this call; of two concurrent inserts for one email, exactly one
    /// succeeds and the other gets `StoreError::DuplicateEmail`.
    fn insert(&self, account: Account) -> Result<Account, StoreError>;

    fn find_by_email(&self, email: &str) -> Option<Account>;

    fn find_by_id(&self, id: Uuid) -> Option<Account>;

    /// Update mutable profile fields only. Email, role and the password hash
    /// are immutable through this store.
    fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> Result<Account, StoreError>;

    fn list_by_role(&self, role: Role) -> Vec<Account>;
}

#[derive(Default)]
struct AccountsInner {
    by_id: HashMap<Uuid, Account>,
    email_index: HashMap<String, Uuid>,
}

/// In-memory account collection. Both maps live under one lock so the
/// existence check and the insert are a single atomic step.
#[derive(Default)]
pub struct MemoryAccounts {
    inner: RwLock<AccountsInner>,
}

impl AccountStore for MemoryAccounts {
    fn insert(&self, account: Account) -> Result<Account, StoreError> {
        let mut inner = self.inner.write();
        if inner.email_index.contains_key(&account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.email_index.insert(account.email.clone(), account.id);
        inner.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        let inner = self.inner.read();
        let id = inner.email_index.get(email)?;
        inner.by_id.get(id).cloned()
    }

    fn find_by_id(&self, id: Uuid) -> Option<Account> {
        self.inner.read().by_id.get(&id).cloned()
    }

    fn update_profile(
        &self,
        id: Uuid,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> Result<Account, StoreError> {
        let mut inner = self.inner.write();
        let account = inner.by_id.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = full_name {
            account.full_name = name;
        }
        if let Some(p) = phone {
            account.phone = Some(p);
        }
        Ok(account.clone())
    }

    fn list_by_role(&self, role: Role) -> Vec<Account> {
        let inner = self.inner.read();
        let mut out: Vec<Account> = inner.by_id.values().filter(|a| a.role == role).cloned().collect();
        out.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str, role: Role) -> Account {
        Account {
            id: Uuid::new_v4(),
            full_name: "Test Person".into(),
            email: email.into(),
            password_hash: "$argon2id$unused".into(),
            role,
            phone: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let store = MemoryAccounts::default();
        store.insert(account("a@x.com", Role::Alumni)).unwrap();
        let err = store.insert(account("a@x.com", Role::Student)).unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);
    }

    #[test]
    fn email_lookup_is_case_sensitive() {
        let store = MemoryAccounts::default();
        store.insert(account("Jane@x.com", Role::Alumni)).unwrap();
        assert!(store.find_by_email("Jane@x.com").is_some());
        assert!(store.find_by_email("jane@x.com").is_none());
    }

    #[test]
    fn update_profile_leaves_identity_fields_alone() {
        let store = MemoryAccounts::default();
        let created = store.insert(account("a@x.com", Role::Alumni)).unwrap();
        let updated = store
            .update_profile(created.id, Some("New Name".into()), Some("555-0100".into()))
            .unwrap();
        assert_eq!(updated.full_name, "New Name");
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.role, created.role);
        assert_eq!(updated.password_hash, created.password_hash);
    }

    #[test]
    fn update_missing_account_is_not_found() {
        let store = MemoryAccounts::default();
        let err = store.update_profile(Uuid::new_v4(), None, None).unwrap_err();
        assert_eq!(err, StoreError::NotFound);
    }

    #[test]
    fn list_by_role_filters_and_sorts() {
        let store = MemoryAccounts::default();
        let mut a = account("zed@x.com", Role::Student);
        a.full_name = "Zed".into();
        let mut b = account("amy@x.com", Role::Student);
        b.full_name = "Amy".into();
        store.insert(a).unwrap();
        store.insert(b).unwrap();
        store.insert(account("other@x.com", Role::Alumni)).unwrap();
        let students = store.list_by_role(Role::Student);
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].full_name, "Amy");
    }
}
