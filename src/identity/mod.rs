//! Central identity for Alumni Connect: roles, signed session tokens and the
//! credential gate. Keep the public surface thin and split implementation
//! across sub-modules.

mod gate;
mod principal;
mod role;
mod token;

pub use gate::{Gate, LoginRequest, LoginResponse, RegisterRequest, UpdateProfileRequest};
pub use principal::Principal;
pub use role::Role;
pub use token::{TokenClaims, TokenSigner, TOKEN_TTL_DAYS};
