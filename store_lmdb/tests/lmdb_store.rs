//! Exercises the LMDB backend against real on-disk environments.

use std::sync::Arc;

use accredit_crypto::{hash_certificate, CertificateFields};
use accredit_store::{
    ActivityFilter, ActivityStore, CertificateStore, MetaStore, StoreError, StoreManifest,
};
use accredit_store_lmdb::{check_integrity, LmdbEnvironment, Migrator, CURRENT_SCHEMA_VERSION};
use accredit_types::{
    AchievementLevel, Action, Activity, ActivityForm, ActivityId, ActivityStatus, Category,
    Certificate, CertificateId, ChainTail, MemberRef, Timestamp, UserId,
};
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_env() -> (tempfile::TempDir, LmdbEnvironment) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), 8, 16 * 1024 * 1024).expect("open env");
    (dir, env)
}

fn member(id: &str) -> MemberRef {
    MemberRef {
        id: UserId::new(id).unwrap(),
        display_name: id.to_uppercase(),
    }
}

fn form() -> ActivityForm {
    ActivityForm {
        title: "Robotics finalist".into(),
        description: "National robotics championship".into(),
        category: Category::Technical,
        level: AchievementLevel::National,
        organizing_body: None,
        event_date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        duration_days: Some(3),
        proof_documents: vec![],
        skills: vec!["Robotics".into()],
    }
}

fn create(store: &dyn ActivityStore, owner: &str) -> Activity {
    let owner = member(owner);
    let form = form();
    store
        .create_activity(2026, &|id| {
            Activity::create(id, owner.clone(), form.clone(), false, Timestamp::new(100))
        })
        .unwrap()
}

fn approve(store: &dyn ActivityStore, mut activity: Activity) -> Activity {
    let reviewer = UserId::new("faculty-1").unwrap();
    let prev = activity
        .transition(Action::Approve, &reviewer, Some("looks genuine"), Timestamp::new(200))
        .unwrap();
    store.update_activity(prev, &activity).unwrap()
}

fn mint(tail: &ChainTail, activity: &Activity) -> Certificate {
    let issuer = UserId::new("admin-1").unwrap();
    let issued_at = Timestamp::new(300 + tail.next_block);
    let hash = hash_certificate(&CertificateFields {
        activity_id: &activity.id,
        owner: &activity.owner.id,
        issuer: &issuer,
        issued_at,
        previous_hash: &tail.head,
        block_number: tail.next_block,
    });
    Certificate {
        id: CertificateId::new(2026, tail.next_block),
        activity_id: activity.id.clone(),
        owner: activity.owner.id.clone(),
        issuer,
        issued_at,
        previous_hash: tail.head,
        block_number: tail.next_block,
        hash,
    }
}

fn certify(env: &LmdbEnvironment, activity: &Activity) -> Result<Certificate, StoreError> {
    let certs = env.certificate_store();
    let tail = certs.chain_tail()?;
    let cert = mint(&tail, activity);
    let mut certified = activity.clone();
    certified.mark_certified(&cert).unwrap();
    certs.append_certificate(&tail, &cert, &certified)?;
    Ok(cert)
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

#[test]
fn identities_are_sequential_and_persisted() {
    let (_dir, env) = temp_env();
    let store = env.activity_store();

    let a = create(&store, "student-1");
    let b = create(&store, "student-2");
    assert_eq!(a.id, ActivityId::new(2026, 1));
    assert_eq!(b.id, ActivityId::new(2026, 2));
    assert_eq!(store.get_activity(&a.id).unwrap(), a);
    assert_eq!(store.activity_count().unwrap(), 2);
}

#[test]
fn sequence_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let env = LmdbEnvironment::open(dir.path(), 8, 16 * 1024 * 1024).unwrap();
        create(&env.activity_store(), "student-1");
    }
    let env = LmdbEnvironment::open(dir.path(), 8, 16 * 1024 * 1024).unwrap();
    let next = create(&env.activity_store(), "student-1");
    assert_eq!(next.id.sequence(), 2);
}

#[test]
fn wrong_year_prefix_is_not_found() {
    let (_dir, env) = temp_env();
    let store = env.activity_store();
    create(&store, "student-1");
    let err = store.get_activity(&ActivityId::new(2025, 1)).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn update_is_compare_and_swap() {
    let (_dir, env) = temp_env();
    let store = env.activity_store();
    let activity = create(&store, "student-1");

    let reviewer = UserId::new("faculty-1").unwrap();
    let mut approved = activity.clone();
    approved
        .transition(Action::Approve, &reviewer, Some("ok"), Timestamp::new(5))
        .unwrap();
    let mut rejected = activity.clone();
    rejected
        .transition(Action::Reject, &reviewer, Some("blurry"), Timestamp::new(5))
        .unwrap();

    store.update_activity(ActivityStatus::Pending, &approved).unwrap();
    let err = store
        .update_activity(ActivityStatus::Pending, &rejected)
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(
        store.get_activity(&activity.id).unwrap().status,
        ActivityStatus::Approved
    );
}

#[test]
fn concurrent_creates_get_distinct_contiguous_sequences() {
    const WRITERS: usize = 8;
    const PER_WRITER: usize = 5;

    let (_dir, env) = temp_env();
    let store = env.activity_store();
    let mut sequences: Vec<u64> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|w| {
                let store = &store;
                s.spawn(move || {
                    (0..PER_WRITER)
                        .map(|_| create(store, &format!("student-{w}")).id.sequence())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    sequences.sort_unstable();
    let expected: Vec<u64> = (1..=(WRITERS * PER_WRITER) as u64).collect();
    assert_eq!(sequences, expected);
    assert_eq!(store.activity_count().unwrap(), expected.len() as u64);
}

#[test]
fn same_status_update_with_stale_revision_conflicts() {
    let (_dir, env) = temp_env();
    let store = env.activity_store();
    let activity = create(&store, "student-1");

    let mut first = activity.clone();
    first.description = "first writer".into();
    let mut second = activity.clone();
    second.description = "second writer".into();

    let written = store.update_activity(ActivityStatus::Pending, &first).unwrap();
    assert_eq!(written.revision, activity.revision + 1);
    assert_eq!(store.get_activity(&activity.id).unwrap(), written);

    let err = store
        .update_activity(ActivityStatus::Pending, &second)
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(
        store.get_activity(&activity.id).unwrap().description,
        "first writer"
    );
}

#[test]
fn update_refuses_certified_status() {
    let (_dir, env) = temp_env();
    let store = env.activity_store();
    let mut activity = create(&store, "student-1");
    activity.status = ActivityStatus::Certified;
    let err = store
        .update_activity(ActivityStatus::Pending, &activity)
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn list_filters_by_owner_and_status() {
    let (_dir, env) = temp_env();
    let store = env.activity_store();
    let a = create(&store, "student-1");
    create(&store, "student-2");
    approve(&store, a.clone());

    let mine = store
        .list_activities(&ActivityFilter::owned_by(UserId::new("student-1").unwrap()))
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, a.id);

    let pending = store
        .list_activities(&ActivityFilter::with_status(ActivityStatus::Pending))
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].owner.id.as_str(), "student-2");
}

// ---------------------------------------------------------------------------
// Certificate chain
// ---------------------------------------------------------------------------

#[test]
fn append_links_blocks_and_flips_activity() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let certs = env.certificate_store();

    let first = approve(&activities, create(&activities, "student-1"));
    let second = approve(&activities, create(&activities, "student-2"));
    let c1 = certify(&env, &first).unwrap();
    let c2 = certify(&env, &second).unwrap();

    assert_eq!(c1.block_number, 1);
    assert!(c1.previous_hash.is_zero());
    assert_eq!(c2.block_number, 2);
    assert_eq!(c2.previous_hash, c1.hash);

    let tail = certs.chain_tail().unwrap();
    assert_eq!(tail.head, c2.hash);
    assert_eq!(tail.next_block, 3);
    assert_eq!(certs.certificate_count().unwrap(), 2);

    assert_eq!(certs.get_certificate(&c1.hash).unwrap(), Some(c1.clone()));
    assert_eq!(certs.certificate_for_activity(&second.id).unwrap(), Some(c2.clone()));
    assert_eq!(certs.certificate_at(1).unwrap(), Some(c1.clone()));
    assert_eq!(certs.iter_certificates().unwrap(), vec![c1.clone(), c2]);
    assert_eq!(certs.certificates_from(2, 10).unwrap().len(), 1);

    let stored = activities.get_activity(&first.id).unwrap();
    assert_eq!(stored.status, ActivityStatus::Certified);
    assert_eq!(stored.certification.unwrap().certificate_hash, c1.hash);
}

#[test]
fn append_against_stale_tail_is_rejected() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let certs = env.certificate_store();

    let a = approve(&activities, create(&activities, "student-1"));
    let b = approve(&activities, create(&activities, "student-2"));

    let stale = certs.chain_tail().unwrap();
    certify(&env, &a).unwrap();

    let cert = mint(&stale, &b);
    let mut certified = b.clone();
    certified.mark_certified(&cert).unwrap();
    let err = certs
        .append_certificate(&stale, &cert, &certified)
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(certs.certificate_count().unwrap(), 1);
    assert_eq!(
        activities.get_activity(&b.id).unwrap().status,
        ActivityStatus::Approved
    );
}

#[test]
fn second_certificate_for_activity_is_duplicate() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let a = approve(&activities, create(&activities, "student-1"));
    certify(&env, &a).unwrap();

    let err = certify(&env, &a).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));
    assert_eq!(env.certificate_store().certificate_count().unwrap(), 1);
}

#[test]
fn append_over_a_newer_write_is_rejected() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let certs = env.certificate_store();
    let stale = approve(&activities, create(&activities, "student-1"));

    let mut assessed = stale.clone();
    assessed.attach_assessment(accredit_types::FraudAssessment::degraded(
        "classifier timed out",
        Timestamp::new(250),
    ));
    activities
        .update_activity(ActivityStatus::Approved, &assessed)
        .unwrap();

    let err = certify(&env, &stale).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(certs.chain_tail().unwrap().is_genesis());

    let fresh = activities.get_activity(&stale.id).unwrap();
    certify(&env, &fresh).unwrap();
    let certified = activities.get_activity(&stale.id).unwrap();
    assert_eq!(certified.status, ActivityStatus::Certified);
    assert!(certified.fraud_assessment.is_some());
}

#[test]
fn unapproved_activity_cannot_be_appended() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let certs = env.certificate_store();
    let pending = create(&activities, "student-1");

    let tail = certs.chain_tail().unwrap();
    let cert = mint(&tail, &pending);
    let mut forged = pending.clone();
    forged.status = ActivityStatus::Certified;
    let err = certs.append_certificate(&tail, &cert, &forged).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(certs.chain_tail().unwrap().is_genesis());
}

#[test]
fn verification_counter_is_separate_from_certificate() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let certs = env.certificate_store();
    let a = approve(&activities, create(&activities, "student-1"));
    let cert = certify(&env, &a).unwrap();

    assert_eq!(certs.verification_stats(&cert.hash).unwrap().count, 0);
    certs.record_verification(&cert.hash, Timestamp::new(900)).unwrap();
    let stats = certs.record_verification(&cert.hash, Timestamp::new(901)).unwrap();
    assert_eq!(stats.count, 2);
    assert_eq!(stats.last_verified_at, Some(Timestamp::new(901)));
    assert_eq!(certs.get_certificate(&cert.hash).unwrap(), Some(cert));

    let missing = accredit_types::CertificateHash::new([7u8; 32]);
    assert!(matches!(
        certs.record_verification(&missing, Timestamp::new(1)),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn concurrent_appends_never_fork_the_chain() {
    let (_dir, env) = temp_env();
    let activities = env.activity_store();
    let ids: Vec<Activity> = (0..8)
        .map(|i| approve(&activities, create(&activities, &format!("student-{i}"))))
        .collect();

    let env = Arc::new(env);
    let handles: Vec<_> = ids
        .into_iter()
        .map(|activity| {
            let env = Arc::clone(&env);
            std::thread::spawn(move || loop {
                match certify(&env, &activity) {
                    Ok(cert) => return cert,
                    Err(StoreError::Conflict(_)) => continue,
                    Err(e) => panic!("unexpected error: {e}"),
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let chain = env.certificate_store().iter_certificates().unwrap();
    assert_eq!(chain.len(), 8);
    let mut prev = accredit_types::CertificateHash::ZERO;
    for (i, cert) in chain.iter().enumerate() {
        assert_eq!(cert.block_number, i as u64 + 1);
        assert_eq!(cert.previous_hash, prev);
        prev = cert.hash;
    }
    assert!(check_integrity(&env).unwrap().is_healthy());
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

#[test]
fn migrator_stamps_fresh_database() {
    let (_dir, env) = temp_env();
    let meta = env.meta_store();
    assert!(meta.manifest().unwrap().is_none());

    let first = Migrator::run(&meta, Timestamp::new(100)).unwrap();
    assert_eq!(first.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(first.created_at, Timestamp::new(100));

    // Reopening later keeps the original creation time.
    let again = Migrator::run(&meta, Timestamp::new(200)).unwrap();
    assert_eq!(again, first);
    assert_eq!(meta.manifest().unwrap(), Some(first));
}

#[test]
fn migrator_refuses_newer_schema() {
    let (_dir, env) = temp_env();
    let meta = env.meta_store();
    meta.write_manifest(&StoreManifest::fresh(CURRENT_SCHEMA_VERSION + 1, Timestamp::new(1)))
        .unwrap();
    assert!(Migrator::run(&meta, Timestamp::new(2)).is_err());
}

#[test]
fn migrator_refuses_unknown_older_schema() {
    let (_dir, env) = temp_env();
    let meta = env.meta_store();
    meta.write_manifest(&StoreManifest::fresh(0, Timestamp::new(1))).unwrap();
    assert!(Migrator::run(&meta, Timestamp::new(2)).is_err());
}
