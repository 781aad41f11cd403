//! End-to-end tests over a real LMDB data directory:
//! submit → approve → certify → reopen → verify.
//!
//! These tests wire the node exactly as the daemon does, so they cover the
//! storage backend, migrations, integrity check and engines together.

use accredit_node::{verify_chain_offline, AccreditNode, NodeConfig};
use accredit_types::{
    AchievementLevel, ActivityForm, ActivityStatus, Category, ErrorKind, Role, UserId,
};
use accredit_workflow::Caller;
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn config(dir: &tempfile::TempDir) -> NodeConfig {
    NodeConfig {
        data_dir: dir.path().join("data"),
        lmdb_map_size: 64 * 1024 * 1024,
        enable_metrics: true,
        ..NodeConfig::default()
    }
}

fn member() -> Caller {
    Caller::new(UserId::new("student-1").unwrap(), Role::Member, "Asha Verma")
}

fn reviewer() -> Caller {
    Caller::new(UserId::new("faculty-1").unwrap(), Role::Reviewer, "Dr. Rao")
}

fn issuer() -> Caller {
    Caller::new(UserId::new("admin-1").unwrap(), Role::Issuer, "Registrar")
}

fn form(title: &str) -> ActivityForm {
    ActivityForm {
        title: title.into(),
        description: "First place".into(),
        category: Category::Technical,
        level: AchievementLevel::National,
        organizing_body: None,
        event_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        duration_days: None,
        proof_documents: vec![],
        skills: vec!["Rust".into()],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn certificates_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let (first_hash, second_hash) = {
        let node = AccreditNode::open(config(&dir)).unwrap();
        let a = node.engine.create(&member(), form("Hackathon winner"), false).unwrap();
        node.engine.approve(&reviewer(), &a.id, "verified certificate").unwrap();
        let c1 = node.engine.certify(&issuer(), &a.id).unwrap();

        let b = node.engine.create(&member(), form("Robotics finalist"), false).unwrap();
        node.engine.approve(&reviewer(), &b.id, "ok").unwrap();
        let c2 = node.engine.certify(&issuer(), &b.id).unwrap();
        assert_eq!(c2.previous_hash, c1.hash);
        (c1.hash, c2.hash)
    };

    let node = AccreditNode::open(config(&dir)).unwrap();
    let tail = node.ledger.chain_tail().unwrap();
    assert_eq!(tail.length(), 2);
    assert_eq!(tail.head, second_hash);

    let outcome = node.verification.verify(&first_hash.to_string()).unwrap();
    assert!(outcome.verified);
    assert_eq!(outcome.certificate.unwrap().student, "Asha Verma");

    // Identities keep counting after a restart.
    let c = node.engine.create(&member(), form("Debate finalist"), false).unwrap();
    assert_eq!(c.id.sequence(), 3);
    assert_eq!(c.status, ActivityStatus::Pending);
}

#[tokio::test]
async fn offline_chain_walk_reports_intact_chain() {
    let dir = tempfile::tempdir().unwrap();
    {
        let node = AccreditNode::open(config(&dir)).unwrap();
        let a = node.engine.create(&member(), form("Hackathon winner"), false).unwrap();
        node.engine.approve(&reviewer(), &a.id, "ok").unwrap();
        node.engine.certify(&issuer(), &a.id).unwrap();
    }

    let report = verify_chain_offline(&config(&dir)).unwrap();
    assert!(report.is_intact());
    assert_eq!(report.length, 1);
}

#[tokio::test]
async fn disabled_classifier_degrades_assessments() {
    let dir = tempfile::tempdir().unwrap();
    let node = AccreditNode::open(config(&dir)).unwrap();
    let a = node.engine.create(&member(), form("Hackathon winner"), false).unwrap();

    let artifact = accredit_fraud::Artifact::new(vec![1, 2, 3], "image/png");
    let assessed = node.engine.assess(&reviewer(), &a.id, &artifact).await.unwrap();
    assert!(assessed.fraud_assessment.unwrap().is_degraded());

    // Degradation never blocks the reviewer.
    node.engine.approve(&reviewer(), &a.id, "manual check").unwrap();
}

#[tokio::test]
async fn duplicate_issuance_conflicts_on_lmdb() {
    let dir = tempfile::tempdir().unwrap();
    let node = AccreditNode::open(config(&dir)).unwrap();
    let a = node.engine.create(&member(), form("Hackathon winner"), false).unwrap();
    node.engine.approve(&reviewer(), &a.id, "ok").unwrap();
    node.engine.certify(&issuer(), &a.id).unwrap();
    let err = node.engine.certify(&issuer(), &a.id).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}
