//! `userdir-auth` — authentication/authorization core.
//!
//! This crate is intentionally decoupled from HTTP: credential verification,
//! token issuance/verification and role checks live here, the persistence
//! store is consumed through the [`store::UserStore`] port, and status-code
//! mapping stays in the API layer.

pub mod claims;
pub mod password;
pub mod roles;
pub mod service;
pub mod store;
pub mod token;
pub mod user;

pub use claims::{Claims, ClaimsUser, TokenError};
pub use roles::Role;
pub use service::{AuthError, AuthService, IssuedToken};
pub use store::{NewUser, StoreError, StoreStats, UserChanges, UserStore};
pub use token::TokenService;
pub use user::{Gender, Registration, User, UserUpdate};
