//! Caller roles as claimed by the external identity provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of an authenticated caller.
///
/// Wire names follow the identity provider (`student`, `faculty`, `admin`,
/// `verifier`); the generic names are accepted as aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submits achievements and edits them while they are mutable.
    #[serde(rename = "student", alias = "member")]
    Member,
    /// Reviews pending submissions.
    #[serde(rename = "faculty", alias = "reviewer")]
    Reviewer,
    /// Certifies approved submissions (mints certificates).
    #[serde(rename = "admin", alias = "issuer")]
    Issuer,
    /// Third-party verifier; no workflow privileges.
    Verifier,
}

impl Role {
    /// Parse a role claim, accepting both wire names and aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "member" => Some(Self::Member),
            "faculty" | "reviewer" => Some(Self::Reviewer),
            "admin" | "issuer" => Some(Self::Issuer),
            "verifier" => Some(Self::Verifier),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "student",
            Self::Reviewer => "faculty",
            Self::Issuer => "admin",
            Self::Verifier => "verifier",
        }
    }

    /// Reviewers and issuers may read any activity.
    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Reviewer | Self::Issuer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(Role::parse("student"), Some(Role::Member));
        assert_eq!(Role::parse("Member"), Some(Role::Member));
        assert_eq!(Role::parse("faculty"), Some(Role::Reviewer));
        assert_eq!(Role::parse("ADMIN"), Some(Role::Issuer));
        assert_eq!(Role::parse("issuer"), Some(Role::Issuer));
        assert_eq!(Role::parse("verifier"), Some(Role::Verifier));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn staff_roles() {
        assert!(Role::Reviewer.is_staff());
        assert!(Role::Issuer.is_staff());
        assert!(!Role::Member.is_staff());
        assert!(!Role::Verifier.is_staff());
    }
}
