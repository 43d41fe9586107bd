use core::str::FromStr;

use serde::{Deserialize, Serialize};

use userdir_core::DomainError;

/// Authorization role of a user.
///
/// The set is closed: nothing else in the system may invent roles, and the
/// wire representation is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Super,
    Team,
    Invite,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Super => "super",
            Role::Team => "team",
            Role::Invite => "invite",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "super" => Ok(Role::Super),
            "team" => Ok(Role::Team),
            "invite" => Ok(Role::Invite),
            other => Err(DomainError::validation(format!(
                "role must be one of user, super, team, invite; got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Super).unwrap(), "\"super\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"invite\"").unwrap(),
            Role::Invite
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("admin".parse::<Role>().is_err());
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn round_trips_through_as_str() {
        for role in [Role::User, Role::Super, Role::Team, Role::Invite] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
