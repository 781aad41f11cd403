//! Node wiring: storage, engines, event listeners and the HTTP server.

use std::sync::Arc;

use accredit_fraud::{Classifier, DisabledClassifier, FraudGate, HttpClassifier, HttpClassifierConfig};
use accredit_ledger::{CertificateLedger, ChainReport};
use accredit_rpc::{ApiMetrics, AppState, RpcServer};
use accredit_store_lmdb::environment::DATABASE_COUNT;
use accredit_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment, Migrator};
use accredit_types::{Clock, SystemClock};
use accredit_verification::VerificationService;
use accredit_workflow::{ReviewEngine, WorkflowEvent};
use prometheus::Registry;
use tokio::runtime::Handle;

use crate::config::{ClassifierConfig, NodeConfig};
use crate::metrics::WorkflowMetrics;
use crate::notifications::{LogNotifier, NotificationDispatcher, Notifier, WebhookNotifier};
use crate::shutdown::ShutdownController;
use crate::NodeError;

/// A fully wired certification node.
pub struct AccreditNode {
    pub config: NodeConfig,
    pub engine: Arc<ReviewEngine>,
    pub verification: Arc<VerificationService>,
    pub ledger: Arc<CertificateLedger>,
    pub shutdown: Arc<ShutdownController>,
    api_metrics: Option<Arc<ApiMetrics>>,
    _lmdb: LmdbEnvironment,
}

impl AccreditNode {
    /// Open storage, migrate, check integrity and wire every engine.
    ///
    /// Must be called inside a Tokio runtime: notification delivery is
    /// spawned onto the current one.
    pub fn open(config: NodeConfig) -> Result<Self, NodeError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let lmdb = open_storage(&config, clock.as_ref())?;
        let activities = Arc::new(lmdb.activity_store());
        let certificates = Arc::new(lmdb.certificate_store());

        let ledger = Arc::new(CertificateLedger::new(
            activities.clone(),
            certificates.clone(),
            clock.clone(),
        ));
        let gate = Arc::new(FraudGate::new(
            build_classifier(&config.classifier)?,
            config.classifier.timeout(),
            clock.clone(),
        ));
        let mut engine = ReviewEngine::new(activities.clone(), ledger.clone(), gate, clock.clone());

        let api_metrics = if config.enable_metrics {
            let registry = Registry::new();
            let workflow_metrics = WorkflowMetrics::register(&registry)?;
            workflow_metrics
                .chain_length
                .set(i64::try_from(ledger.chain_tail()?.length()).unwrap_or(i64::MAX));
            engine
                .events_mut()
                .subscribe(Box::new(move |event: &WorkflowEvent| {
                    workflow_metrics.observe(event)
                }));
            Some(Arc::new(ApiMetrics::new(registry)?))
        } else {
            None
        };

        let notifier = build_notifier(&config)?;
        tracing::info!(notifier = notifier.name(), "workflow notifications enabled");
        engine
            .events_mut()
            .subscribe(NotificationDispatcher::new(notifier, Handle::current()).into_listener());

        let verification = Arc::new(VerificationService::new(
            activities,
            certificates,
            ledger.clone(),
            clock,
        ));

        Ok(Self {
            config,
            engine: Arc::new(engine),
            verification,
            ledger,
            shutdown: Arc::new(ShutdownController::new()),
            api_metrics,
            _lmdb: lmdb,
        })
    }

    pub fn app_state(&self) -> AppState {
        let state = AppState::new(self.engine.clone(), self.verification.clone())
            .with_error_exposure(self.config.environment.exposes_errors());
        match &self.api_metrics {
            Some(m) => state.with_metrics(m.clone()),
            None => state,
        }
    }

    /// Serve HTTP until SIGINT/SIGTERM or a programmatic shutdown.
    pub async fn run(self) -> Result<(), NodeError> {
        let addr = self.config.http_addr();
        tracing::info!(
            %addr,
            environment = ?self.config.environment,
            data_dir = %self.config.data_dir.display(),
            chain_length = self.ledger.chain_tail()?.length(),
            "starting certification node"
        );

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move { shutdown.wait_for_signal().await });

        let signalled = self.shutdown.signalled();
        RpcServer::new(addr)
            .serve(self.app_state(), async move {
                signalled.await;
            })
            .await?;
        tracing::info!(reason = ?self.shutdown.reason(), "certification node stopped");
        Ok(())
    }
}

/// Open the data directory without starting the service and walk the chain.
pub fn verify_chain_offline(config: &NodeConfig) -> Result<ChainReport, NodeError> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let lmdb = open_storage(config, clock.as_ref())?;
    let ledger = CertificateLedger::new(
        Arc::new(lmdb.activity_store()),
        Arc::new(lmdb.certificate_store()),
        clock,
    );
    Ok(ledger.verify_chain()?)
}

fn open_storage(config: &NodeConfig, clock: &dyn Clock) -> Result<LmdbEnvironment, NodeError> {
    check_data_dir(&config.data_dir).map_err(NodeError::Integrity)?;
    let lmdb = LmdbEnvironment::open(
        &config.data_dir,
        DATABASE_COUNT,
        config.lmdb_map_size,
    )?;
    let manifest = Migrator::run(&lmdb.meta_store(), clock.now())?;

    let report = check_integrity(&lmdb)?;
    if !report.is_healthy() {
        for e in &report.errors {
            tracing::error!(error = %e, "integrity check failed");
        }
        return Err(NodeError::Integrity(report.errors.join("; ")));
    }
    tracing::info!(
        activities = report.activities(),
        certificates = report.certificates(),
        schema = manifest.schema_version,
        created_at = %manifest.created_at.to_rfc3339(),
        "storage integrity check passed"
    );
    Ok(lmdb)
}

fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn Classifier>, NodeError> {
    if !config.enabled {
        tracing::warn!("fraud classifier disabled, assessments will be degraded");
        return Ok(Arc::new(DisabledClassifier));
    }
    let api_key = config.api_key();
    if api_key.is_none() {
        tracing::warn!(var = %config.api_key_env, "classifier API key not set");
    }
    let classifier = HttpClassifier::new(HttpClassifierConfig {
        endpoint: config.endpoint.clone(),
        model: config.model.clone(),
        api_key,
        request_timeout: config.timeout(),
    })?;
    tracing::info!(endpoint = %config.endpoint, model = %config.model, "fraud classifier configured");
    Ok(Arc::new(classifier))
}

fn build_notifier(config: &NodeConfig) -> Result<Arc<dyn Notifier>, NodeError> {
    match &config.notifications.webhook_url {
        Some(url) => {
            let notifier = WebhookNotifier::new(url.clone(), config.notifications.timeout())
                .map_err(|e| NodeError::Config(e.to_string()))?;
            Ok(Arc::new(notifier))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}
