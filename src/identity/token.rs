//! Signed session tokens.
//!
//! A token is a bearer credential asserting an identity and role for a fixed
//! window. Claims are signed with the process-wide secret; any tampering
//! invalidates the signature, and an expired token carries no authority no
//! matter how it was signed. Nothing is kept server-side, so a token cannot be
//! revoked before its natural expiry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::Account;

use super::role::Role;

/// Fixed validity window from issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// Claims embedded in a session token at issuance. The role is copied from
/// the account at that moment and is not re-checked against the store on
/// later requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account identifier.
    pub sub: Uuid,
    pub role: Role,
    /// Display name, carried for convenience.
    pub name: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds), always iat + 7 days.
    pub exp: i64,
}

/// Sole owner of the token-signing material. Built once at startup from
/// configuration and shared read-only across requests.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, account: &Account) -> AppResult<String> {
        self.issue_at(account, Utc::now())
    }

    /// Issue with an explicit issuance instant. The expiry is always pinned
    /// seven days past `now`.
    pub fn issue_at(&self, account: &Account, now: DateTime<Utc>) -> AppResult<String> {
        let claims = TokenClaims {
            sub: account.id,
            role: account.role,
            name: account.full_name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            // Signing failure is a server fault, never a credential problem
            error!("token signing failed: {e}");
            AppError::internal("signing_failed", "internal server error")
        })
    }

    /// Decode and verify a presented token. Malformed, forged and expired
    /// tokens all collapse to the same unauthenticated error; the distinction
    /// is only logged.
    pub fn verify(&self, token: &str) -> AppResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match decode::<TokenClaims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => debug!("token rejected: expired"),
                    kind => debug!("token rejected: {:?}", kind),
                }
                Err(AppError::unauthenticated())
            }
        }
    }
}
