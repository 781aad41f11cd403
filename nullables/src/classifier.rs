//! Nullable classifier: scripted fraud classification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use accredit_fraud::{Artifact, Classifier, ClassifierError, RawAssessment};
use async_trait::async_trait;

/// One scripted classifier behaviour.
#[derive(Clone, Debug)]
pub enum Scripted {
    Reply(RawAssessment),
    /// Reply only after sleeping; used to trip the gate's timeout.
    Slow(Duration, RawAssessment),
    /// Fail with a network error carrying this message.
    Fail(String),
}

/// A deterministic classifier for testing.
///
/// Plays the script in order and repeats the last entry once exhausted.
pub struct NullClassifier {
    script: Mutex<Vec<Scripted>>,
    index: AtomicUsize,
    calls: AtomicUsize,
}

impl NullClassifier {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script),
            index: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always reply with `authentic` / `auto_approve`.
    pub fn authentic() -> Self {
        Self::new(vec![Scripted::Reply(RawAssessment {
            fraud_score: 4.0,
            verdict: "authentic".into(),
            concerns: Vec::new(),
            confidence: 96.0,
            recommendation: "auto_approve".into(),
        })])
    }

    /// Always reply with `forged` / `auto_reject`.
    pub fn forged() -> Self {
        Self::new(vec![Scripted::Reply(RawAssessment {
            fraud_score: 97.0,
            verdict: "forged".into(),
            concerns: vec!["pixelated seal".into()],
            confidence: 90.0,
            recommendation: "auto_reject".into(),
        })])
    }

    /// Always fail.
    pub fn failing(reason: &str) -> Self {
        Self::new(vec![Scripted::Fail(reason.to_string())])
    }

    /// Number of classify calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next(&self) -> Option<Scripted> {
        let script = self.script.lock().unwrap();
        if script.is_empty() {
            return None;
        }
        let i = self.index.fetch_add(1, Ordering::SeqCst).min(script.len() - 1);
        Some(script[i].clone())
    }
}

#[async_trait]
impl Classifier for NullClassifier {
    fn id(&self) -> &str {
        "null"
    }

    async fn classify(&self, _artifact: &Artifact) -> Result<RawAssessment, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next() {
            Some(Scripted::Reply(raw)) => Ok(raw),
            Some(Scripted::Slow(delay, raw)) => {
                tokio::time::sleep(delay).await;
                Ok(raw)
            }
            Some(Scripted::Fail(msg)) => Err(ClassifierError::Network(msg)),
            None => Err(ClassifierError::Disabled),
        }
    }
}
