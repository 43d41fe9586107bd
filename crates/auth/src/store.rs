//! The credential-store port.
//!
//! Persistence is an external collaborator: the auth core talks to it only
//! through [`UserStore`]. The store is the arbiter of uniqueness races:
//! two registrations racing on one email are serialized by the
//! implementation, and the loser sees [`StoreError::DuplicateEmail`].

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use userdir_core::{UserCode, UserId};

use crate::roles::Role;
use crate::user::{Gender, User};

/// A record to insert. The store assigns the id and the timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub code: UserCode,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    pub doc_number: Option<i64>,
    pub date_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub receive_email_notifications: bool,
    pub terms: Option<String>,
    pub date_agree_terms: Option<DateTime<Utc>>,
}

/// A partial update. `None` leaves the field untouched. The password always
/// arrives pre-hashed; the store never sees plaintext.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub doc_number: Option<i64>,
    pub date_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub receive_email_notifications: Option<bool>,
    pub date_agree_terms: Option<DateTime<Utc>>,
}

/// Diagnostics snapshot for the system endpoint.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub driver: &'static str,
    pub users: u64,
    pub approx_bytes: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("user code already assigned")]
    DuplicateCode,

    #[error("user not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence port for user records.
///
/// Emails passed in are already lowercase; implementations compare them
/// verbatim.
pub trait UserStore: Send + Sync {
    fn create(&self, new: NewUser) -> Result<User, StoreError>;

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    fn find_by_id(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Apply a partial update. Email uniqueness is re-checked excluding the
    /// record itself.
    fn update(&self, id: UserId, changes: UserChanges) -> Result<User, StoreError>;

    fn delete(&self, id: UserId) -> Result<(), StoreError>;

    fn list(&self) -> Result<Vec<User>, StoreError>;

    fn stats(&self) -> Result<StoreStats, StoreError>;
}
