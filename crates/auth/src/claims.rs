use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use userdir_core::UserId;

use crate::roles::Role;
use crate::user::User;

/// Snapshot of the authenticating user embedded in every issued token.
///
/// Carried for client convenience only; guards re-check live store state
/// and never trust this copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsUser {
    pub id: UserId,
    pub name: String,
    pub enabled: bool,
    pub role: Role,
}

/// JWT claim set (transport-agnostic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id, as a string per JWT convention.
    pub sub: String,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiry, seconds since the epoch.
    pub exp: i64,

    /// Embedded user snapshot captured at issuance.
    pub user: ClaimsUser,
}

impl Claims {
    /// Build the claim set for a user, expiring `ttl_secs` from `issued_at`.
    pub fn for_user(user: &User, issued_at: DateTime<Utc>, ttl_secs: i64) -> Self {
        Self {
            sub: user.id.to_string(),
            iat: issued_at.timestamp(),
            exp: issued_at.timestamp() + ttl_secs,
            user: ClaimsUser {
                id: user.id,
                name: user.name.clone(),
                enabled: user.enabled,
                role: user.role,
            },
        }
    }

    /// Parse the subject back into a user id.
    pub fn subject_id(&self) -> Result<UserId, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Invalid)
    }
}

/// Token verification failures. The three cases are never collapsed; the
/// API layer maps them to distinct responses.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token invalid")]
    Invalid,

    #[error("token missing")]
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::test_support::sample_user;

    #[test]
    fn claims_embed_the_user_snapshot() {
        let user = sample_user(7, Role::Team);
        let now = Utc::now();
        let claims = Claims::for_user(&user, now, 600);

        assert_eq!(claims.sub, "7");
        assert_eq!(claims.exp - claims.iat, 600);
        assert_eq!(claims.user.id, user.id);
        assert_eq!(claims.user.role, Role::Team);
        assert!(claims.user.enabled);
        assert_eq!(claims.subject_id().unwrap(), user.id);
    }

    #[test]
    fn corrupt_subject_is_invalid() {
        let user = sample_user(7, Role::User);
        let mut claims = Claims::for_user(&user, Utc::now(), 600);
        claims.sub = "not-an-id".to_string();
        assert_eq!(claims.subject_id(), Err(TokenError::Invalid));
    }
}
