//! The activity record: an achievement submission moving through review.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::category::{AchievementLevel, Category};
use crate::certificate::Certificate;
use crate::error::TypesError;
use crate::fraud::FraudAssessment;
use crate::hash::CertificateHash;
use crate::ids::{ActivityId, UserId};
use crate::state::{Action, ActivityStatus, Requirement};
use crate::time::Timestamp;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 5000;
pub const MAX_REASON_LEN: usize = 2000;
pub const MAX_SKILLS: usize = 50;
pub const MAX_SKILL_LEN: usize = 64;

/// The submitting member, as identified by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: UserId,
    pub display_name: String,
}

/// Pointer to an externally stored proof file. The core never holds file bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofDocument {
    pub filename: String,
    pub url: String,
    pub uploaded_at: Timestamp,
}

/// Who reviewed the activity, when, and what they said on approval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer: UserId,
    pub comment: Option<String>,
    pub reviewed_at: Timestamp,
}

/// Back-reference to the certificate minted for this activity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationRecord {
    pub certified_by: UserId,
    pub certified_at: Timestamp,
    pub certificate_hash: CertificateHash,
    pub block_number: u64,
}

/// Member-supplied content of a submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityForm {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub level: AchievementLevel,
    pub organizing_body: Option<String>,
    pub event_date: NaiveDate,
    pub duration_days: Option<u32>,
    #[serde(default)]
    pub proof_documents: Vec<ProofDocument>,
    pub skills: Vec<String>,
}

impl ActivityForm {
    /// Trim, de-duplicate, and check every field. `today` bounds the event date.
    pub fn normalize(mut self, today: NaiveDate) -> Result<Self, TypesError> {
        self.title = required("title", &self.title, MAX_TITLE_LEN)?;
        self.description = required("description", &self.description, MAX_DESCRIPTION_LEN)?;
        self.organizing_body = self
            .organizing_body
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if self.event_date > today {
            return Err(TypesError::InvalidField {
                field: "event_date",
                reason: "must not be in the future".into(),
            });
        }
        if self.duration_days == Some(0) {
            return Err(TypesError::InvalidField {
                field: "duration_days",
                reason: "must be at least one day".into(),
            });
        }
        for doc in &self.proof_documents {
            if doc.url.trim().is_empty() || doc.filename.trim().is_empty() {
                return Err(TypesError::MissingField {
                    field: "proof_documents",
                });
            }
        }
        self.skills = normalize_skills(self.skills)?;
        Ok(self)
    }
}

/// Partial edit applied by the owner while the activity is mutable.
///
/// `None` leaves a field alone. The optional form fields take
/// `Some(None)` (JSON `null`) to clear them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub level: Option<AchievementLevel>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub organizing_body: Option<Option<String>>,
    pub event_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration_days: Option<Option<u32>>,
    pub proof_documents: Option<Vec<ProofDocument>>,
    pub skills: Option<Vec<String>>,
}

impl ActivityUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A field that is present in the input, possibly as `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// An achievement submission and its workflow state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub owner: MemberRef,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub level: AchievementLevel,
    pub organizing_body: Option<String>,
    pub event_date: NaiveDate,
    pub duration_days: Option<u32>,
    pub proof_documents: Vec<ProofDocument>,
    pub skills: Vec<String>,
    pub fraud_assessment: Option<FraudAssessment>,
    pub status: ActivityStatus,
    pub review: Option<Review>,
    /// Set on rejection. Never present together with an approval.
    pub rejection_reason: Option<String>,
    /// Set while an info request is outstanding.
    pub info_request: Option<String>,
    pub certification: Option<CertificationRecord>,
    pub submitted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Write counter, advanced by the store on every successful write.
    /// Conditional writes compare it so that two writers holding the same
    /// status cannot overwrite each other.
    pub revision: u64,
}

impl Activity {
    /// Build a freshly persisted activity. `form` must already be normalised.
    pub fn create(
        id: ActivityId,
        owner: MemberRef,
        form: ActivityForm,
        as_draft: bool,
        now: Timestamp,
    ) -> Self {
        let (status, submitted_at) = if as_draft {
            (ActivityStatus::Draft, None)
        } else {
            (ActivityStatus::Pending, Some(now))
        };
        Self {
            id,
            owner,
            title: form.title,
            description: form.description,
            category: form.category,
            level: form.level,
            organizing_body: form.organizing_body,
            event_date: form.event_date,
            duration_days: form.duration_days,
            proof_documents: form.proof_documents,
            skills: form.skills,
            fraud_assessment: None,
            status,
            review: None,
            rejection_reason: None,
            info_request: None,
            certification: None,
            submitted_at,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner.id == user
    }

    /// Content as the owner last submitted it.
    pub fn form(&self) -> ActivityForm {
        ActivityForm {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            level: self.level,
            organizing_body: self.organizing_body.clone(),
            event_date: self.event_date,
            duration_days: self.duration_days,
            proof_documents: self.proof_documents.clone(),
            skills: self.skills.clone(),
        }
    }

    /// Apply an owner edit. Identity and workflow fields are untouched.
    pub fn apply_edit(
        &mut self,
        update: ActivityUpdate,
        today: NaiveDate,
        now: Timestamp,
    ) -> Result<(), TypesError> {
        if !self.status.is_owner_editable() {
            return Err(TypesError::NotEditable {
                status: self.status,
            });
        }
        let mut form = self.form();
        if let Some(v) = update.title {
            form.title = v;
        }
        if let Some(v) = update.description {
            form.description = v;
        }
        if let Some(v) = update.category {
            form.category = v;
        }
        if let Some(v) = update.level {
            form.level = v;
        }
        if let Some(v) = update.organizing_body {
            form.organizing_body = v;
        }
        if let Some(v) = update.event_date {
            form.event_date = v;
        }
        if let Some(v) = update.duration_days {
            form.duration_days = v;
        }
        if let Some(v) = update.proof_documents {
            form.proof_documents = v;
        }
        if let Some(v) = update.skills {
            form.skills = v;
        }
        let form = form.normalize(today)?;

        self.title = form.title;
        self.description = form.description;
        self.category = form.category;
        self.level = form.level;
        self.organizing_body = form.organizing_body;
        self.event_date = form.event_date;
        self.duration_days = form.duration_days;
        self.proof_documents = form.proof_documents;
        self.skills = form.skills;
        self.updated_at = now;
        Ok(())
    }

    /// Take the edge `(status, action)` and record its side fields.
    ///
    /// Returns the status observed before the transition, which callers pass
    /// to the store as the compare-and-swap precondition. Certification goes
    /// through [`Activity::mark_certified`] instead.
    pub fn transition(
        &mut self,
        action: Action,
        actor: &UserId,
        detail: Option<&str>,
        now: Timestamp,
    ) -> Result<ActivityStatus, TypesError> {
        let previous = self.status;
        let next = previous.apply(action)?;
        let detail = match action.requirement() {
            Requirement::Nothing => None,
            Requirement::Reason => Some(required("reason", detail.unwrap_or(""), MAX_REASON_LEN)?),
            Requirement::Comment => Some(required("comment", detail.unwrap_or(""), MAX_REASON_LEN)?),
        };

        match action {
            Action::Submit => {
                self.submitted_at = Some(now);
            }
            Action::Resubmit => {
                self.info_request = None;
                self.submitted_at = Some(now);
            }
            Action::RequestInfo => {
                self.info_request = detail;
                self.review = Some(Review {
                    reviewer: actor.clone(),
                    comment: None,
                    reviewed_at: now,
                });
            }
            Action::Approve => {
                self.rejection_reason = None;
                self.info_request = None;
                self.review = Some(Review {
                    reviewer: actor.clone(),
                    comment: detail,
                    reviewed_at: now,
                });
            }
            Action::Reject => {
                self.info_request = None;
                self.rejection_reason = detail;
                self.review = Some(Review {
                    reviewer: actor.clone(),
                    comment: None,
                    reviewed_at: now,
                });
            }
            Action::Certify => {
                return Err(TypesError::InvalidTransition {
                    from: previous,
                    action,
                });
            }
        }

        self.status = next;
        self.updated_at = now;
        Ok(previous)
    }

    /// Flip to `certified` and link the minted certificate.
    pub fn mark_certified(&mut self, certificate: &Certificate) -> Result<ActivityStatus, TypesError> {
        let previous = self.status;
        self.status = previous.apply(Action::Certify)?;
        self.certification = Some(CertificationRecord {
            certified_by: certificate.issuer.clone(),
            certified_at: certificate.issued_at,
            certificate_hash: certificate.hash,
            block_number: certificate.block_number,
        });
        self.updated_at = certificate.issued_at;
        Ok(previous)
    }

    /// Attach a fraud assessment for audit. Status is untouched.
    pub fn attach_assessment(&mut self, assessment: FraudAssessment) {
        self.updated_at = assessment.assessed_at;
        self.fraud_assessment = Some(assessment);
    }
}

fn required(field: &'static str, value: &str, max: usize) -> Result<String, TypesError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypesError::MissingField { field });
    }
    if trimmed.chars().count() > max {
        return Err(TypesError::TooLong { field, max });
    }
    Ok(trimmed.to_string())
}

/// Trim, drop empties, and de-duplicate case-insensitively keeping first spelling.
fn normalize_skills(skills: Vec<String>) -> Result<Vec<String>, TypesError> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() {
            continue;
        }
        if skill.chars().count() > MAX_SKILL_LEN {
            return Err(TypesError::TooLong {
                field: "skills",
                max: MAX_SKILL_LEN,
            });
        }
        if seen.insert(skill.to_lowercase()) {
            out.push(skill.to_string());
        }
    }
    if out.is_empty() {
        return Err(TypesError::MissingField { field: "skills" });
    }
    if out.len() > MAX_SKILLS {
        return Err(TypesError::InvalidField {
            field: "skills",
            reason: format!("at most {MAX_SKILLS} skills"),
        });
    }
    Ok(out)
}
