//! The authenticated caller as asserted by the identity provider.

use accredit_types::{MemberRef, Role, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub id: UserId,
    pub role: Role,
    pub display_name: String,
}

impl Caller {
    pub fn new(id: UserId, role: Role, display_name: impl Into<String>) -> Self {
        Self {
            id,
            role,
            display_name: display_name.into(),
        }
    }

    /// Owner reference recorded on activities this caller submits. Falls back
    /// to the user id when the provider supplied no display name.
    pub fn as_member(&self) -> MemberRef {
        let name = self.display_name.trim();
        MemberRef {
            id: self.id.clone(),
            display_name: if name.is_empty() {
                self.id.to_string()
            } else {
                name.to_string()
            },
        }
    }
}
