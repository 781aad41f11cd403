//! Activity workflow states and the central transition table.
//!
//! Every status change in the system goes through [`ActivityStatus::apply`];
//! no call site compares status strings or hand-rolls an edge.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TypesError;
use crate::role::Role;

/// The workflow state of an activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    /// Saved by the owner but not yet submitted. Never auto-transitions.
    Draft,
    /// Submitted and waiting for a reviewer.
    Pending,
    /// A reviewer asked the owner for more information.
    InfoRequested,
    /// A reviewer approved it; waiting for an issuer to certify.
    Approved,
    /// A certificate was minted. Terminal.
    Certified,
    /// A reviewer rejected it. Terminal.
    Rejected,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::InfoRequested => "info_requested",
            Self::Approved => "approved",
            Self::Certified => "certified",
            Self::Rejected => "rejected",
        }
    }

    /// No transition leaves a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Certified | Self::Rejected)
    }

    /// States in which the owner may still edit the record.
    pub fn is_owner_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::InfoRequested)
    }

    /// Look up the edge `(self, action)` in the transition table.
    pub fn apply(self, action: Action) -> Result<ActivityStatus, TypesError> {
        TRANSITIONS
            .iter()
            .find(|(from, a, _)| *from == self && *a == action)
            .map(|(_, _, to)| *to)
            .ok_or(TypesError::InvalidTransition { from: self, action })
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something an actor asks the workflow to do to an activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Submit,
    RequestInfo,
    Resubmit,
    Approve,
    Reject,
    Certify,
}

/// Input an action must carry before the edge may be taken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Nothing,
    /// A non-empty reason (rejection or info request).
    Reason,
    /// A non-empty review comment.
    Comment,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::RequestInfo => "request info for",
            Self::Resubmit => "resubmit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Certify => "certify",
        }
    }

    /// The only role allowed to perform this action.
    ///
    /// Owner-only actions additionally require the caller to own the activity.
    pub fn required_role(&self) -> Role {
        match self {
            Self::Submit | Self::Resubmit => Role::Member,
            Self::RequestInfo | Self::Approve | Self::Reject => Role::Reviewer,
            Self::Certify => Role::Issuer,
        }
    }

    pub fn requirement(&self) -> Requirement {
        match self {
            Self::RequestInfo | Self::Reject => Requirement::Reason,
            Self::Approve => Requirement::Comment,
            Self::Submit | Self::Resubmit | Self::Certify => Requirement::Nothing,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every legal `(from, action, to)` edge.
pub const TRANSITIONS: &[(ActivityStatus, Action, ActivityStatus)] = &[
    (ActivityStatus::Draft, Action::Submit, ActivityStatus::Pending),
    (ActivityStatus::Pending, Action::RequestInfo, ActivityStatus::InfoRequested),
    (ActivityStatus::InfoRequested, Action::Resubmit, ActivityStatus::Pending),
    (ActivityStatus::Pending, Action::Approve, ActivityStatus::Approved),
    (ActivityStatus::Pending, Action::Reject, ActivityStatus::Rejected),
    (ActivityStatus::Approved, Action::Certify, ActivityStatus::Certified),
];

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [ActivityStatus; 6] = [
        ActivityStatus::Draft,
        ActivityStatus::Pending,
        ActivityStatus::InfoRequested,
        ActivityStatus::Approved,
        ActivityStatus::Certified,
        ActivityStatus::Rejected,
    ];

    const ALL_ACTIONS: [Action; 6] = [
        Action::Submit,
        Action::RequestInfo,
        Action::Resubmit,
        Action::Approve,
        Action::Reject,
        Action::Certify,
    ];

    #[test]
    fn happy_path() {
        let s = ActivityStatus::Pending;
        let s = s.apply(Action::Approve).unwrap();
        assert_eq!(s, ActivityStatus::Approved);
        assert_eq!(s.apply(Action::Certify).unwrap(), ActivityStatus::Certified);
    }

    #[test]
    fn info_request_cycle() {
        let s = ActivityStatus::Pending.apply(Action::RequestInfo).unwrap();
        assert_eq!(s, ActivityStatus::InfoRequested);
        assert_eq!(s.apply(Action::Resubmit).unwrap(), ActivityStatus::Pending);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for state in ALL_STATES.iter().filter(|s| s.is_terminal()) {
            for action in ALL_ACTIONS {
                assert!(state.apply(action).is_err(), "{state} -> {action}");
            }
        }
    }

    #[test]
    fn approval_skipping_is_rejected() {
        assert!(ActivityStatus::Pending.apply(Action::Certify).is_err());
        assert!(ActivityStatus::Draft.apply(Action::Approve).is_err());
        assert!(ActivityStatus::InfoRequested.apply(Action::Approve).is_err());
    }

    #[test]
    fn role_and_requirement_per_action() {
        assert_eq!(Action::Approve.required_role(), Role::Reviewer);
        assert_eq!(Action::Certify.required_role(), Role::Issuer);
        assert_eq!(Action::Resubmit.required_role(), Role::Member);
        assert_eq!(Action::Approve.requirement(), Requirement::Comment);
        assert_eq!(Action::Reject.requirement(), Requirement::Reason);
        assert_eq!(Action::Certify.requirement(), Requirement::Nothing);
    }

    #[test]
    fn wire_names() {
        assert_eq!(ActivityStatus::InfoRequested.as_str(), "info_requested");
    }
}
