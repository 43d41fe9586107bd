//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a user record.
///
/// Ids are store-assigned sequence numbers; the domain never invents them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn from_i64(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for UserId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = i64::from_str(s)
            .map_err(|e| DomainError::invalid_id(format!("UserId: {e}")))?;
        Ok(Self(id))
    }
}

const CODE_MIN: i64 = 100_000_000_000;
const CODE_MAX: i64 = 999_999_999_999;

/// The 12-digit numeric code handed out at registration.
///
/// Codes are unique per user and never reused; the store enforces the
/// uniqueness, this type only guarantees the 12-digit shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserCode(i64);

impl UserCode {
    /// Draw a fresh random code in the 12-digit range.
    pub fn generate() -> Self {
        Self(rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX))
    }

    /// Validate an externally supplied value as a 12-digit code.
    pub fn from_i64(code: i64) -> Result<Self, DomainError> {
        if !(CODE_MIN..=CODE_MAX).contains(&code) {
            return Err(DomainError::validation(format!(
                "user code must have exactly 12 digits, got {code}"
            )));
        }
        Ok(Self(code))
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for UserCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
