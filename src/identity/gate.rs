//! The credential and session gate.
//!
//! Owns account creation, credential verification, token issuance and token
//! verification. It is the only code that sees plaintext passwords or the
//! signing secret; everything downstream works with a verified `Principal`.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult, FieldError};
use crate::security;
use crate::store::{Account, AccountStore, AccountSummary, Profile, StoreError};

use super::principal::Principal;
use super::role::Role;
use super::token::TokenSigner;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

const ROLE_MESSAGE: &str = "must be one of alumni, admin, student";

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub account: AccountSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

pub struct Gate {
    accounts: Arc<dyn AccountStore>,
    signer: TokenSigner,
}

impl Gate {
    pub fn new(accounts: Arc<dyn AccountStore>, signer: TokenSigner) -> Self {
        Self { accounts, signer }
    }

    /// Create an account. Collects every failing constraint before rejecting;
    /// nothing reaches the store unless all fields pass. Email uniqueness is
    /// left to the store's atomic insert, so a concurrent duplicate surfaces
    /// as a conflict rather than a race.
    pub fn register(&self, req: &RegisterRequest) -> AppResult<Account> {
        let mut fields = Vec::new();
        if req.full_name.trim().chars().count() < 3 {
            fields.push(FieldError::new("full_name", "must be at least 3 characters"));
        }
        if !EMAIL_RE.is_match(req.email.trim()) {
            fields.push(FieldError::new("email", "must be a valid email address"));
        }
        if req.password.chars().count() < 6 {
            fields.push(FieldError::new("password", "must be at least 6 characters"));
        }
        let role = Role::from_str(&req.role).ok();
        if role.is_none() {
            fields.push(FieldError::new("role", ROLE_MESSAGE));
        }
        let (Some(role), true) = (role, fields.is_empty()) else {
            return Err(AppError::validation(fields));
        };

        let hash = security::hash_password(&req.password).map_err(|e| {
            error!("password hashing failed: {e}");
            AppError::internal("hash_failed", "internal server error")
        })?;
        let account = Account {
            id: Uuid::new_v4(),
            full_name: req.full_name.trim().to_string(),
            email: req.email.trim().to_string(),
            password_hash: hash,
            role,
            phone: req.phone_number.clone().filter(|p| !p.trim().is_empty()),
            created_at: Utc::now(),
        };
        let account = self.accounts.insert(account).map_err(|e| match e {
            StoreError::DuplicateEmail => AppError::conflict("email_taken", "email already registered"),
            other => {
                error!("account insert failed: {other}");
                AppError::internal("store_failed", "internal server error")
            }
        })?;
        info!("account registered id={} role={}", account.id, account.role);
        Ok(account)
    }

    /// Verify credentials and mint a session token. Unknown email and wrong
    /// password return the same error, and the unknown-email path still burns
    /// one hash verification so the two are not separable by timing either.
    pub fn login(&self, req: &LoginRequest) -> AppResult<LoginResponse> {
        let mut fields = Vec::new();
        if req.email.trim().is_empty() {
            fields.push(FieldError::new("email", "is required"));
        }
        if req.password.is_empty() {
            fields.push(FieldError::new("password", "is required"));
        }
        if !fields.is_empty() {
            return Err(AppError::validation(fields));
        }

        let Some(account) = self.accounts.find_by_email(req.email.trim()) else {
            security::verify_against_dummy(&req.password);
            return Err(AppError::invalid_credentials());
        };
        if !security::verify_password(&account.password_hash, &req.password) {
            return Err(AppError::invalid_credentials());
        }
        let token = self.signer.issue(&account)?;
        info!("login account={} role={}", account.id, account.role);
        Ok(LoginResponse { token, account: account.summary() })
    }

    /// Verify a presented token and optionally require one of a set of roles.
    /// A missing or unverifiable token is unauthenticated; a verified token
    /// with the wrong role is forbidden, a distinct outcome because the
    /// caller is known, just not permitted.
    pub fn verify(&self, token: Option<&str>, required: &[Role]) -> AppResult<Principal> {
        let token = token.ok_or_else(AppError::unauthenticated)?;
        let claims = self.signer.verify(token)?;
        let principal = Principal::from(claims);
        if !required.is_empty() && !required.contains(&principal.role) {
            return Err(AppError::forbidden("insufficient_role", "not permitted for this route"));
        }
        Ok(principal)
    }

    /// Current profile behind a verified identity. A token can outlive its
    /// account; that surfaces here as not-found.
    pub fn identity(&self, principal: &Principal) -> AppResult<Profile> {
        self.accounts
            .find_by_id(principal.account_id)
            .map(|a| a.profile())
            .ok_or_else(|| AppError::not_found("account_missing", "account no longer exists"))
    }

    /// Update the caller's own mutable profile fields. Email, role and the
    /// password hash are immutable here.
    pub fn update_profile(&self, principal: &Principal, req: &UpdateProfileRequest) -> AppResult<Profile> {
        let mut fields = Vec::new();
        if let Some(name) = &req.full_name {
            if name.trim().chars().count() < 3 {
                fields.push(FieldError::new("full_name", "must be at least 3 characters"));
            }
        }
        if !fields.is_empty() {
            return Err(AppError::validation(fields));
        }
        self.accounts
            .update_profile(
                principal.account_id,
                req.full_name.as_ref().map(|s| s.trim().to_string()),
                req.phone_number.clone(),
            )
            .map(|a| a.profile())
            .map_err(|_| AppError::not_found("account_missing", "account no longer exists"))
    }
}
