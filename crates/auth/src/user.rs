//! The user record and the validated inputs that create or mutate it.

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use userdir_core::{DomainError, UserCode, UserId};

use crate::password;
use crate::roles::Role;

// ─────────────────────────────────────────────────────────────────────────────
// Gender
// ─────────────────────────────────────────────────────────────────────────────

/// Optional profile gender. Wire representation is the single lowercase letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    F,
    M,
    O,
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" => Ok(Gender::F),
            "m" => Ok(Gender::M),
            "o" => Ok(Gender::O),
            other => Err(DomainError::validation(format!(
                "gender must be one of f, m, o; got '{other}'"
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user record as the store holds it.
///
/// # Invariants
/// - `email` is lowercase; all lookups and comparisons assume it.
/// - `password_hash` is a bcrypt hash and never leaves the process
///   (skipped on serialization).
/// - `code` is the 12-digit registration code, unique per user.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub code: UserCode,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    pub doc_number: Option<i64>,
    pub date_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub receive_email_notifications: bool,
    pub terms: Option<String>,
    pub date_agree_terms: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registration input
// ─────────────────────────────────────────────────────────────────────────────

/// Raw registration request body, before validation.
///
/// Every field is optional at this layer so that a missing field surfaces as
/// a validation failure with our own message instead of a deserializer error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub terms: Option<String>,
    pub doc_number: Option<i64>,
    pub date_birth: Option<String>,
    pub gender: Option<String>,
    pub receive_email_notifications: Option<bool>,
    pub date_agree_terms: Option<String>,
}

/// Registration input after validation and normalization.
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub name: String,
    /// Lowercased.
    pub email: String,
    /// Plaintext, already unwrapped from base64 if it was wrapped.
    pub password: String,
    pub terms: String,
    pub doc_number: Option<i64>,
    pub date_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub receive_email_notifications: bool,
    pub date_agree_terms: DateTime<Utc>,
}

impl Registration {
    /// Validate shape, normalize the email, unwrap the password.
    ///
    /// The terms-agreement timestamp defaults to now when the agreement text
    /// is supplied without one.
    pub fn validate(self) -> Result<ValidRegistration, DomainError> {
        let name = required_trimmed(self.name, "name")?;
        if name.chars().count() > 255 {
            return Err(DomainError::validation("name must have at most 255 characters"));
        }

        let email = normalize_email(required_trimmed(self.email, "email")?)?;

        let password = password::decode_if_base64(&required(self.password, "password")?);
        validate_password(&password)?;

        let terms = required_trimmed(self.terms, "terms")?;

        Ok(ValidRegistration {
            name,
            email,
            password,
            terms,
            doc_number: self.doc_number,
            date_birth: parse_date_opt(self.date_birth, "date_birth")?,
            gender: parse_gender_opt(self.gender)?,
            receive_email_notifications: self.receive_email_notifications.unwrap_or(true),
            date_agree_terms: parse_datetime_opt(self.date_agree_terms, "date_agree_terms")?
                .unwrap_or_else(Utc::now),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Update input
// ─────────────────────────────────────────────────────────────────────────────

/// Raw partial-update request body; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub doc_number: Option<i64>,
    pub date_birth: Option<String>,
    pub gender: Option<String>,
    pub receive_email_notifications: Option<bool>,
    pub date_agree_terms: Option<String>,
}

/// Update input after validation. `password` is still plaintext here; the
/// service re-hashes it before the store sees anything.
#[derive(Debug, Clone)]
pub struct ValidUserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub doc_number: Option<i64>,
    pub date_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub receive_email_notifications: Option<bool>,
    pub date_agree_terms: Option<DateTime<Utc>>,
}

impl UserUpdate {
    pub fn validate(self) -> Result<ValidUserUpdate, DomainError> {
        let name = match self.name {
            Some(raw) => {
                let name = raw.trim().to_string();
                if name.is_empty() {
                    return Err(DomainError::validation("name must not be empty"));
                }
                if name.chars().count() > 255 {
                    return Err(DomainError::validation("name must have at most 255 characters"));
                }
                Some(name)
            }
            None => None,
        };

        let email = match self.email {
            Some(raw) => Some(normalize_email(raw.trim().to_string())?),
            None => None,
        };

        let password = match self.password {
            Some(raw) => {
                let plain = password::decode_if_base64(&raw);
                validate_password(&plain)?;
                Some(plain)
            }
            None => None,
        };

        Ok(ValidUserUpdate {
            name,
            email,
            password,
            doc_number: self.doc_number,
            date_birth: parse_date_opt(self.date_birth, "date_birth")?,
            gender: parse_gender_opt(self.gender)?,
            receive_email_notifications: self.receive_email_notifications,
            date_agree_terms: parse_datetime_opt(self.date_agree_terms, "date_agree_terms")?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field validators
// ─────────────────────────────────────────────────────────────────────────────

fn required(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

fn required_trimmed(value: Option<String>, field: &str) -> Result<String, DomainError> {
    let v = required(value, field)?.trim().to_string();
    if v.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(v)
}

fn normalize_email(raw: String) -> Result<String, DomainError> {
    let email = raw.to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("email is not a valid address"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(DomainError::validation("email is not a valid address"));
    }
    Ok(email)
}

fn validate_password(plain: &str) -> Result<(), DomainError> {
    if plain.chars().count() < 6 {
        return Err(DomainError::validation("password must have at least 6 characters"));
    }
    Ok(())
}

fn parse_gender_opt(value: Option<String>) -> Result<Option<Gender>, DomainError> {
    value.map(|v| v.parse()).transpose()
}

fn parse_date_opt(value: Option<String>, field: &str) -> Result<Option<NaiveDate>, DomainError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|_| DomainError::validation(format!("{field} must be a YYYY-MM-DD date")))
        })
        .transpose()
}

fn parse_datetime_opt(
    value: Option<String>,
    field: &str,
) -> Result<Option<DateTime<Utc>>, DomainError> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(&v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| {
                    DomainError::validation(format!("{field} must be an RFC 3339 timestamp"))
                })
        })
        .transpose()
}

// ─────────────────────────────────────────────────────────────────────────────
// Test fixtures
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn sample_user(id: i64, role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::from_i64(id),
            code: UserCode::from_i64(123_456_789_012).unwrap(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: String::new(),
            role,
            enabled: true,
            doc_number: None,
            date_birth: None,
            gender: None,
            receive_email_notifications: true,
            terms: Some("v1".to_string()),
            date_agree_terms: Some(now),
            created_at: now,
            updated_at: now,
        }
    }
}
