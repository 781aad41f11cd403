//! HTTP request handlers.

use accredit_fraud::Artifact;
use accredit_ledger::ChainReport;
use accredit_types::{Activity, ActivityForm, ActivityId, ActivityUpdate, Certificate, Role};
use accredit_verification::VerificationOutcome;
use accredit_workflow::{ReviewEngine, WorkflowError};
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::Authenticated;
use crate::envelope::Envelope;
use crate::error::{ApiError, ErrorResponse};
use crate::server::AppState;

type ApiResult<T> = Result<Envelope<T>, ErrorResponse>;

// ── Request bodies ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitActivityRequest {
    #[serde(flatten)]
    pub form: ActivityForm,
    /// Save without submitting for review.
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chain_length: Option<u64>,
}

// ── Helpers ──────────────────────────────────────────────────────────────

/// Run a synchronous engine call off the async workers.
async fn run<T, F>(state: &AppState, f: F) -> Result<T, ErrorResponse>
where
    F: FnOnce(&ReviewEngine) -> Result<T, WorkflowError> + Send + 'static,
    T: Send + 'static,
{
    let engine = state.engine.clone();
    match tokio::task::spawn_blocking(move || f(&engine)).await {
        Ok(result) => result.map_err(|e| state.fail(e)),
        Err(e) => Err(state.fail(ApiError::Internal(e.to_string()))),
    }
}

fn activity_id(state: &AppState, raw: &str) -> Result<ActivityId, ErrorResponse> {
    ActivityId::parse(raw).map_err(|e| state.fail(WorkflowError::from(e)))
}

fn json_body<T>(state: &AppState, body: Result<Json<T>, JsonRejection>) -> Result<T, ErrorResponse> {
    body.map(|Json(v)| v)
        .map_err(|e| state.fail(ApiError::BadRequest(e.body_text())))
}

// ── Public ───────────────────────────────────────────────────────────────

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let chain_length = state.engine.ledger().chain_tail().ok().map(|t| t.length());
    Json(HealthResponse {
        status: if chain_length.is_some() { "ok" } else { "degraded" },
        chain_length,
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(metrics) = &state.metrics else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match metrics.encode() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => state.fail(ApiError::Internal(e.to_string())).into_response(),
    }
}

/// GET /api/verify/:hash
pub async fn verify(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<VerificationOutcome>, ErrorResponse> {
    let service = state.verification.clone();
    let outcome = match tokio::task::spawn_blocking(move || service.verify(&hash)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return Err(state.fail(e)),
        Err(e) => return Err(state.fail(ApiError::Internal(e.to_string()))),
    };
    if let Some(m) = &state.metrics {
        let label = if outcome.verified { "hit" } else { "miss" };
        m.verifications.with_label_values(&[label]).inc();
    }
    Ok(Json(outcome))
}

// ── Member ───────────────────────────────────────────────────────────────

/// POST /api/activities/submit
pub async fn submit_activity(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    body: Result<Json<SubmitActivityRequest>, JsonRejection>,
) -> Result<(StatusCode, Envelope<Activity>), ErrorResponse> {
    let req = json_body(&state, body)?;
    let draft = req.draft;
    let activity = run(&state, move |e| e.create(&caller, req.form, draft)).await?;
    let message = if draft {
        "Draft saved"
    } else {
        "Activity submitted successfully"
    };
    Ok((StatusCode::CREATED, Envelope::ok(message, activity)))
}

/// GET /api/activities/my-activities
pub async fn my_activities(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Vec<Activity>> {
    let list = run(&state, move |e| e.my_activities(&caller)).await?;
    Ok(Envelope::ok("Activities retrieved", list))
}

/// GET /api/activities/:id
pub async fn get_activity(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let activity = run(&state, move |e| e.get(&caller, &id)).await?;
    Ok(Envelope::ok("Activity retrieved", activity))
}

/// PUT /api/activities/:id
pub async fn edit_activity(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<ActivityUpdate>, JsonRejection>,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let update = json_body(&state, body)?;
    let activity = run(&state, move |e| e.edit(&caller, &id, update)).await?;
    Ok(Envelope::ok("Activity updated", activity))
}

/// PUT /api/activities/:id/submit
pub async fn submit_draft(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let activity = run(&state, move |e| e.submit_draft(&caller, &id)).await?;
    Ok(Envelope::ok("Activity submitted successfully", activity))
}

/// PUT /api/activities/:id/resubmit
///
/// The body is optional: an empty body resubmits unchanged.
pub async fn resubmit(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let update = optional_json::<ActivityUpdate>(&body)
        .map_err(|e| state.fail(ApiError::BadRequest(e.to_string())))?;
    let activity = run(&state, move |e| e.resubmit(&caller, &id, update)).await?;
    Ok(Envelope::ok("Activity resubmitted for review", activity))
}

fn optional_json<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some)
}

/// POST /api/activities/:id/assess
///
/// The body is the raw proof artifact; `content-type` names its media type.
pub async fn assess(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    if body.is_empty() {
        return Err(state.fail(ApiError::BadRequest("artifact body is empty".into())));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let artifact = Artifact::new(body.to_vec(), content_type);
    let target = id.clone();
    let observed = run(&state, move |e| e.assessment_target(&caller, &target)).await?;
    let assessment = state.engine.classify(&artifact).await;
    let activity = run(&state, move |e| e.attach_assessment(&id, observed, assessment)).await?;
    Ok(Envelope::ok("Fraud assessment attached", activity))
}

// ── Reviewer ─────────────────────────────────────────────────────────────

/// GET /api/activities/faculty/pending
pub async fn pending_review(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Vec<Activity>> {
    let list = run(&state, move |e| e.pending_review(&caller)).await?;
    Ok(Envelope::ok("Pending activities retrieved", list))
}

/// PUT /api/activities/:id/request-info
pub async fn request_info(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<ReasonRequest>, JsonRejection>,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let req = json_body(&state, body)?;
    let activity = run(&state, move |e| e.request_info(&caller, &id, &req.reason)).await?;
    Ok(Envelope::ok("More information requested", activity))
}

/// PUT /api/activities/:id/approve
pub async fn approve(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let req = json_body(&state, body)?;
    let activity = run(&state, move |e| e.approve(&caller, &id, &req.comment)).await?;
    Ok(Envelope::ok("Activity approved", activity))
}

/// PUT /api/activities/:id/reject
pub async fn reject(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(id): Path<String>,
    body: Result<Json<ReasonRequest>, JsonRejection>,
) -> ApiResult<Activity> {
    let id = activity_id(&state, &id)?;
    let req = json_body(&state, body)?;
    let activity = run(&state, move |e| e.reject(&caller, &id, &req.reason)).await?;
    Ok(Envelope::ok("Activity rejected", activity))
}

// ── Issuer ───────────────────────────────────────────────────────────────

/// GET /api/activities/admin/approved
pub async fn awaiting_certification(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Vec<Activity>> {
    let list = run(&state, move |e| e.awaiting_certification(&caller)).await?;
    Ok(Envelope::ok("Approved activities retrieved", list))
}

/// POST /api/certificates/generate/:activity_id
pub async fn generate_certificate(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Envelope<Certificate>), ErrorResponse> {
    let id = activity_id(&state, &raw)?;
    let certificate = run(&state, move |e| e.certify(&caller, &id)).await?;
    Ok((
        StatusCode::CREATED,
        Envelope::ok("Certificate generated successfully", certificate),
    ))
}

/// GET /api/certificates/chain
pub async fn chain_report(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<ChainReport> {
    if caller.role != Role::Issuer {
        return Err(state.fail(WorkflowError::Unauthorized {
            role: caller.role,
            operation: "inspect the certificate chain",
        }));
    }
    let service = state.verification.clone();
    let report = match tokio::task::spawn_blocking(move || service.check_chain()).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => return Err(state.fail(e)),
        Err(e) => return Err(state.fail(ApiError::Internal(e.to_string()))),
    };
    let message = if report.is_intact() {
        "Certificate chain is intact"
    } else {
        "Certificate chain has integrity issues"
    };
    Ok(Envelope::ok(message, report))
}
