//! Activity storage trait.

use crate::StoreError;
use accredit_types::{Activity, ActivityId, ActivityStatus, UserId};

/// Selects activities for listing. Empty fields match everything.
#[derive(Clone, Debug, Default)]
pub struct ActivityFilter {
    pub owner: Option<UserId>,
    pub status: Option<ActivityStatus>,
}

impl ActivityFilter {
    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            status: None,
        }
    }

    pub fn with_status(status: ActivityStatus) -> Self {
        Self {
            owner: None,
            status: Some(status),
        }
    }

    pub fn matches(&self, activity: &Activity) -> bool {
        self.owner.as_ref().map_or(true, |o| activity.is_owned_by(o))
            && self.status.map_or(true, |s| activity.status == s)
    }
}

/// The precondition shared by every conditional activity write: `stored` must
/// still hold `expected` at `revision`.
pub fn check_current(
    stored: &Activity,
    expected: ActivityStatus,
    revision: u64,
) -> Result<(), StoreError> {
    if stored.status != expected {
        return Err(StoreError::Conflict(format!(
            "activity {} is {}, expected {}",
            stored.id, stored.status, expected
        )));
    }
    if stored.revision != revision {
        return Err(StoreError::Conflict(format!(
            "activity {} was rewritten (revision {}, expected {})",
            stored.id, stored.revision, revision
        )));
    }
    Ok(())
}

/// Trait for activity storage operations.
pub trait ActivityStore {
    /// Allocate the next identity for `year` and persist `build(id)` in one
    /// atomic step. The sequence is global and never reused, so concurrent
    /// creations always receive distinct identities.
    fn create_activity(
        &self,
        year: i32,
        build: &dyn Fn(ActivityId) -> Activity,
    ) -> Result<Activity, StoreError>;

    /// Retrieve an activity by identity.
    fn get_activity(&self, id: &ActivityId) -> Result<Activity, StoreError>;

    /// Overwrite an activity if its stored status still equals `expected`
    /// and its stored revision still equals `activity.revision`.
    ///
    /// Returns the record as written, with the revision advanced. Fails with
    /// [`StoreError::Conflict`] when another writer got there first, even one
    /// that left the status unchanged. Refuses to write a `certified` status;
    /// that only happens inside [`crate::CertificateStore::append_certificate`].
    fn update_activity(&self, expected: ActivityStatus, activity: &Activity)
        -> Result<Activity, StoreError>;

    /// All activities matching `filter`, in identity order.
    fn list_activities(&self, filter: &ActivityFilter) -> Result<Vec<Activity>, StoreError>;

    /// Total number of activities ever created.
    fn activity_count(&self) -> Result<u64, StoreError>;
}
