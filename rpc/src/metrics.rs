//! Prometheus metrics for the HTTP API.
//!
//! [`ApiMetrics`] registers its collectors into a caller-supplied
//! [`Registry`]; the node adds its own workflow counters to the same
//! registry and `/metrics` encodes all of them.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct ApiMetrics {
    registry: Registry,
    /// Verification lookups by result (`hit` / `miss`).
    pub verifications: IntCounterVec,
    /// Failed requests by error kind.
    pub errors: IntCounterVec,
}

impl ApiMetrics {
    pub fn new(registry: Registry) -> Result<Self, prometheus::Error> {
        let verifications = IntCounterVec::new(
            Opts::new(
                "accredit_verifications_total",
                "Public verification lookups by result"
            ),
            &["result"],
        )?;
        registry.register(Box::new(verifications.clone()))?;

        let errors = IntCounterVec::new(
            Opts::new("accredit_api_errors_total", "Failed API requests by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            registry,
            verifications,
            errors,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Prometheus text exposition of every collector in the registry.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_appear_in_exposition() {
        let metrics = ApiMetrics::new(Registry::new()).unwrap();
        metrics.verifications.with_label_values(&["hit"]).inc();
        metrics.verifications.with_label_values(&["miss"]).inc_by(2);

        let text = metrics.encode().unwrap();
        assert!(text.contains("accredit_verifications_total{result=\"hit\"} 1"));
        assert!(text.contains("accredit_verifications_total{result=\"miss\"} 2"));
    }

    #[test]
    fn double_registration_fails() {
        let registry = Registry::new();
        ApiMetrics::new(registry.clone()).unwrap();
        assert!(ApiMetrics::new(registry).is_err());
    }
}
