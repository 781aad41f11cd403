//! The review engine.

use std::sync::Arc;

use accredit_fraud::{Artifact, FraudGate};
use accredit_ledger::CertificateLedger;
use accredit_store::{ActivityFilter, ActivityStore, StoreError};
use accredit_types::{
    Action, Activity, ActivityForm, ActivityId, ActivityStatus, ActivityUpdate, Certificate,
    Clock, FraudAssessment, Role, TypesError,
};

use crate::{Caller, EventBus, WorkflowError, WorkflowEvent};

/// Drives activities through review.
///
/// Every mutating operation checks the caller's role before touching the
/// store, applies the transition table to a fresh copy, and writes it back
/// with a compare-and-swap on the status and revision it observed. Two
/// racing writes on one activity therefore never both succeed: the loser
/// gets a conflict.
pub struct ReviewEngine {
    activities: Arc<dyn ActivityStore + Send + Sync>,
    ledger: Arc<CertificateLedger>,
    gate: Arc<FraudGate>,
    clock: Arc<dyn Clock>,
    events: EventBus,
}

impl ReviewEngine {
    pub fn new(
        activities: Arc<dyn ActivityStore + Send + Sync>,
        ledger: Arc<CertificateLedger>,
        gate: Arc<FraudGate>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            activities,
            ledger,
            gate,
            clock,
            events: EventBus::new(),
        }
    }

    /// Register listeners before the engine is shared.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn ledger(&self) -> &Arc<CertificateLedger> {
        &self.ledger
    }

    // ── Member operations ───────────────────────────────────────────────

    /// Persist a new activity as `pending`, or as `draft` when `as_draft`.
    pub fn create(
        &self,
        caller: &Caller,
        form: ActivityForm,
        as_draft: bool,
    ) -> Result<Activity, WorkflowError> {
        require(caller, Role::Member, "submit activities")?;
        let now = self.clock.now();
        let form = form.normalize(now.date())?;
        let owner = caller.as_member();

        let activity = self.activities.create_activity(now.year(), &|id| {
            Activity::create(id, owner.clone(), form.clone(), as_draft, now)
        })?;

        tracing::info!(
            activity = %activity.id,
            owner = %caller.id,
            status = %activity.status,
            "activity created"
        );
        if !as_draft {
            self.events.emit(&WorkflowEvent::Submitted {
                activity: activity.id.clone(),
                owner: activity.owner.clone(),
                title: activity.title.clone(),
            });
        }
        Ok(activity)
    }

    /// `draft → pending`.
    pub fn submit_draft(&self, caller: &Caller, id: &ActivityId) -> Result<Activity, WorkflowError> {
        let activity = self.transition(caller, id, Action::Submit, None, |_| Ok(()))?;
        self.events.emit(&WorkflowEvent::Submitted {
            activity: activity.id.clone(),
            owner: activity.owner.clone(),
            title: activity.title.clone(),
        });
        Ok(activity)
    }

    /// Owner edit while `draft` or `info_requested`. Identity never changes.
    pub fn edit(
        &self,
        caller: &Caller,
        id: &ActivityId,
        update: ActivityUpdate,
    ) -> Result<Activity, WorkflowError> {
        require(caller, Role::Member, "edit activities")?;
        let mut activity = self.load_owned(caller, id)?;
        let observed = activity.status;
        let now = self.clock.now();
        activity.apply_edit(update, now.date(), now)?;
        let activity = self.activities.update_activity(observed, &activity)?;
        tracing::info!(activity = %id, "activity edited");
        Ok(activity)
    }

    /// `info_requested → pending`, applying an optional edit in the same write.
    pub fn resubmit(
        &self,
        caller: &Caller,
        id: &ActivityId,
        update: Option<ActivityUpdate>,
    ) -> Result<Activity, WorkflowError> {
        let now = self.clock.now();
        let activity = self.transition(caller, id, Action::Resubmit, None, |activity| {
            match update {
                Some(update) if !update.is_empty() => activity.apply_edit(update, now.date(), now),
                _ => Ok(()),
            }
        })?;
        self.events.emit(&WorkflowEvent::Submitted {
            activity: activity.id.clone(),
            owner: activity.owner.clone(),
            title: activity.title.clone(),
        });
        Ok(activity)
    }

    // ── Reviewer operations ─────────────────────────────────────────────

    /// `pending → info_requested`.
    pub fn request_info(
        &self,
        caller: &Caller,
        id: &ActivityId,
        reason: &str,
    ) -> Result<Activity, WorkflowError> {
        let activity = self.transition(caller, id, Action::RequestInfo, Some(reason), |_| Ok(()))?;
        self.events.emit(&WorkflowEvent::InfoRequested {
            activity: activity.id.clone(),
            owner: activity.owner.clone(),
            reason: activity.info_request.clone().unwrap_or_default(),
        });
        Ok(activity)
    }

    /// `pending → approved`. The fraud recommendation plays no part.
    pub fn approve(
        &self,
        caller: &Caller,
        id: &ActivityId,
        comment: &str,
    ) -> Result<Activity, WorkflowError> {
        let activity = self.transition(caller, id, Action::Approve, Some(comment), |_| Ok(()))?;
        self.events.emit(&WorkflowEvent::Approved {
            activity: activity.id.clone(),
            owner: activity.owner.clone(),
            title: activity.title.clone(),
        });
        Ok(activity)
    }

    /// `pending → rejected`.
    pub fn reject(
        &self,
        caller: &Caller,
        id: &ActivityId,
        reason: &str,
    ) -> Result<Activity, WorkflowError> {
        let activity = self.transition(caller, id, Action::Reject, Some(reason), |_| Ok(()))?;
        self.events.emit(&WorkflowEvent::Rejected {
            activity: activity.id.clone(),
            owner: activity.owner.clone(),
            reason: activity.rejection_reason.clone().unwrap_or_default(),
        });
        Ok(activity)
    }

    // ── Issuer operations ───────────────────────────────────────────────

    /// `approved → certified`, minting the certificate in the same write.
    pub fn certify(&self, caller: &Caller, id: &ActivityId) -> Result<Certificate, WorkflowError> {
        require(caller, Action::Certify.required_role(), "certify activities")?;
        let certificate = self.ledger.issue(&caller.id, id)?;

        match self.activities.get_activity(id) {
            Ok(activity) => self.events.emit(&WorkflowEvent::CertificateIssued {
                activity: activity.id,
                owner: activity.owner,
                title: activity.title,
                certificate: certificate.id.clone(),
                hash: certificate.hash,
                block_number: certificate.block_number,
            }),
            Err(e) => {
                tracing::warn!(activity = %id, error = %e, "certificate issued but event not sent");
            }
        }
        Ok(certificate)
    }

    // ── Fraud advice ────────────────────────────────────────────────────

    /// Run the fraud gate on `artifact` and attach the result for audit.
    ///
    /// The owner may assess while the activity is still theirs to change
    /// (`draft`, `pending`, `info_requested`); reviewers may assess any
    /// non-terminal activity. The attach is a compare-and-swap against the
    /// status observed before classification, so a transition that lands
    /// while the classifier runs wins and this call reports a conflict.
    ///
    /// Async callers that must keep store access off their executor threads
    /// can drive the three steps themselves: [`Self::assessment_target`],
    /// [`Self::classify`] and [`Self::attach_assessment`].
    pub async fn assess(
        &self,
        caller: &Caller,
        id: &ActivityId,
        artifact: &Artifact,
    ) -> Result<Activity, WorkflowError> {
        let observed = self.assessment_target(caller, id)?;
        let assessment = self.classify(artifact).await;
        self.attach_assessment(id, observed, assessment)
    }

    /// Check that `caller` may assess `id` and return the status the attach
    /// will be conditioned on. Reads the store.
    pub fn assessment_target(
        &self,
        caller: &Caller,
        id: &ActivityId,
    ) -> Result<ActivityStatus, WorkflowError> {
        let activity = match caller.role {
            Role::Member => {
                let activity = self.load_owned(caller, id)?;
                if !matches!(
                    activity.status,
                    ActivityStatus::Draft | ActivityStatus::Pending | ActivityStatus::InfoRequested
                ) {
                    return Err(TypesError::NotEditable {
                        status: activity.status,
                    }
                    .into());
                }
                activity
            }
            Role::Reviewer => {
                let activity = self.load(id)?;
                if activity.status.is_terminal() {
                    return Err(TypesError::NotEditable {
                        status: activity.status,
                    }
                    .into());
                }
                activity
            }
            role => {
                return Err(WorkflowError::Unauthorized {
                    role,
                    operation: "request fraud assessments",
                })
            }
        };
        Ok(activity.status)
    }

    /// Classify `artifact`. Never touches the store and never fails; a
    /// classifier outage yields a degraded assessment.
    pub async fn classify(&self, artifact: &Artifact) -> FraudAssessment {
        self.gate.assess(artifact).await
    }

    /// Attach `assessment` if the activity is still in `observed`. Reads and
    /// writes the store.
    pub fn attach_assessment(
        &self,
        id: &ActivityId,
        observed: ActivityStatus,
        assessment: FraudAssessment,
    ) -> Result<Activity, WorkflowError> {
        let degraded = assessment.is_degraded();

        let mut activity = self.load(id)?;
        if activity.status != observed {
            return Err(StoreError::Conflict(format!(
                "activity {} moved to {} during assessment",
                id, activity.status
            ))
            .into());
        }
        activity.attach_assessment(assessment);
        let activity = self.activities.update_activity(observed, &activity)?;

        tracing::info!(activity = %id, degraded, "fraud assessment attached");
        self.events.emit(&WorkflowEvent::Assessed {
            activity: id.clone(),
            degraded,
        });
        Ok(activity)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    /// The caller's own activities, in identity order.
    pub fn my_activities(&self, caller: &Caller) -> Result<Vec<Activity>, WorkflowError> {
        require(caller, Role::Member, "list their activities")?;
        Ok(self
            .activities
            .list_activities(&ActivityFilter::owned_by(caller.id.clone()))?)
    }

    /// `pending` activities, oldest submission first.
    pub fn pending_review(&self, caller: &Caller) -> Result<Vec<Activity>, WorkflowError> {
        require(caller, Role::Reviewer, "review activities")?;
        let mut pending = self
            .activities
            .list_activities(&ActivityFilter::with_status(ActivityStatus::Pending))?;
        pending.sort_by_key(|a| (a.submitted_at, a.id.sequence()));
        Ok(pending)
    }

    /// `approved` activities waiting for a certificate.
    pub fn awaiting_certification(&self, caller: &Caller) -> Result<Vec<Activity>, WorkflowError> {
        require(caller, Role::Issuer, "certify activities")?;
        Ok(self
            .activities
            .list_activities(&ActivityFilter::with_status(ActivityStatus::Approved))?)
    }

    /// One activity, visible to its owner and to staff. Everyone else gets
    /// not-found, whether or not it exists.
    pub fn get(&self, caller: &Caller, id: &ActivityId) -> Result<Activity, WorkflowError> {
        if caller.role.is_staff() {
            return self.load(id);
        }
        if caller.role == Role::Member {
            return self.load_owned(caller, id);
        }
        Err(WorkflowError::NotFound(id.clone()))
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn load(&self, id: &ActivityId) -> Result<Activity, WorkflowError> {
        match self.activities.get_activity(id) {
            Ok(activity) => Ok(activity),
            Err(StoreError::NotFound(_)) => Err(WorkflowError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    fn load_owned(&self, caller: &Caller, id: &ActivityId) -> Result<Activity, WorkflowError> {
        let activity = self.load(id)?;
        if !activity.is_owned_by(&caller.id) {
            return Err(WorkflowError::NotFound(id.clone()));
        }
        Ok(activity)
    }

    /// Role check, load, `prepare`, table transition, compare-and-swap write.
    fn transition<F>(
        &self,
        caller: &Caller,
        id: &ActivityId,
        action: Action,
        detail: Option<&str>,
        prepare: F,
    ) -> Result<Activity, WorkflowError>
    where
        F: FnOnce(&mut Activity) -> Result<(), TypesError>,
    {
        let role = action.required_role();
        require(caller, role, action.as_str())?;
        let mut activity = if role == Role::Member {
            self.load_owned(caller, id)?
        } else {
            self.load(id)?
        };

        let observed = activity.status;
        let now = self.clock.now();
        prepare(&mut activity)?;
        activity.transition(action, &caller.id, detail, now)?;
        let activity = self.activities.update_activity(observed, &activity)?;

        tracing::info!(
            activity = %id,
            from = %observed,
            to = %activity.status,
            actor = %caller.id,
            "activity transitioned"
        );
        Ok(activity)
    }
}

fn require(caller: &Caller, role: Role, operation: &'static str) -> Result<(), WorkflowError> {
    if caller.role != role {
        return Err(WorkflowError::Unauthorized {
            role: caller.role,
            operation,
        });
    }
    Ok(())
}
