//! Axum router and server lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use accredit_verification::VerificationService;
use accredit_workflow::ReviewEngine;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ErrorResponse};
use crate::handlers;
use crate::metrics::ApiMetrics;

/// Largest proof artifact accepted for fraud assessment.
pub const MAX_ARTIFACT_BYTES: usize = 10 * 1024 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReviewEngine>,
    pub verification: Arc<VerificationService>,
    pub metrics: Option<Arc<ApiMetrics>>,
    /// Include underlying error text in responses (non-production only).
    pub expose_errors: bool,
}

impl AppState {
    pub fn new(engine: Arc<ReviewEngine>, verification: Arc<VerificationService>) -> Self {
        Self {
            engine,
            verification,
            metrics: None,
            expose_errors: true,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<ApiMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_error_exposure(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    /// Bind `error` to this deployment's exposure policy.
    pub fn fail(&self, error: impl Into<ApiError>) -> ErrorResponse {
        let error = error.into();
        if let Some(m) = &self.metrics {
            m.errors
                .with_label_values(&[kind_label(&error)])
                .inc();
        }
        ErrorResponse {
            error,
            expose: self.expose_errors,
        }
    }
}

fn kind_label(error: &ApiError) -> &'static str {
    use accredit_types::ErrorKind;
    match error.kind() {
        ErrorKind::Validation => "validation",
        ErrorKind::Conflict => "conflict",
        ErrorKind::Unauthorized => "unauthorized",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Storage => "storage",
    }
}

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let activities = Router::new()
        .route("/submit", post(handlers::submit_activity))
        .route("/my-activities", get(handlers::my_activities))
        .route("/faculty/pending", get(handlers::pending_review))
        .route("/admin/approved", get(handlers::awaiting_certification))
        .route(
            "/:id",
            get(handlers::get_activity).put(handlers::edit_activity),
        )
        .route("/:id/submit", put(handlers::submit_draft))
        .route("/:id/resubmit", put(handlers::resubmit))
        .route("/:id/request-info", put(handlers::request_info))
        .route("/:id/approve", put(handlers::approve))
        .route("/:id/reject", put(handlers::reject))
        .route(
            "/:id/assess",
            post(handlers::assess).layer(DefaultBodyLimit::max(MAX_ARTIFACT_BYTES)),
        );

    let certificates = Router::new()
        .route("/generate/:activity_id", post(handlers::generate_certificate))
        .route("/chain", get(handlers::chain_report));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/verify/:hash", get(handlers::verify))
        .nest("/api/activities", activities)
        .nest("/api/certificates", certificates)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub addr: SocketAddr,
}

impl RpcServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    /// Bind and serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn serve<F>(&self, state: AppState, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "HTTP API listening");
        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
