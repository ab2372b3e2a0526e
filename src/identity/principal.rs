use uuid::Uuid;

use super::role::Role;
use super::token::TokenClaims;

/// Verified identity attached to a request after its token checks out.
/// Downstream handlers only ever see this, never the raw token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub account_id: Uuid,
    pub role: Role,
    pub name: String,
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self { account_id: claims.sub, role: claims.role, name: claims.name }
    }
}
