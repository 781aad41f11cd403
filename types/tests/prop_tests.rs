use proptest::prelude::*;

use accredit_types::state::TRANSITIONS;
use accredit_types::{Action, ActivityId, ActivityStatus, CertificateHash, Score, Timestamp};

fn any_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Submit),
        Just(Action::RequestInfo),
        Just(Action::Resubmit),
        Just(Action::Approve),
        Just(Action::Reject),
        Just(Action::Certify),
    ]
}

fn any_status() -> impl Strategy<Value = ActivityStatus> {
    prop_oneof![
        Just(ActivityStatus::Draft),
        Just(ActivityStatus::Pending),
        Just(ActivityStatus::InfoRequested),
        Just(ActivityStatus::Approved),
        Just(ActivityStatus::Certified),
        Just(ActivityStatus::Rejected),
    ]
}

proptest! {
    /// Every accepted step is an edge of the transition table.
    #[test]
    fn only_table_edges_are_taken(
        start in any_status(),
        actions in prop::collection::vec(any_action(), 0..32),
    ) {
        let mut status = start;
        for action in actions {
            match status.apply(action) {
                Ok(next) => {
                    prop_assert!(TRANSITIONS.contains(&(status, action, next)));
                    status = next;
                }
                Err(_) => {
                    prop_assert!(!TRANSITIONS.iter().any(|(f, a, _)| *f == status && *a == action));
                }
            }
        }
    }

    /// Once terminal, always terminal.
    #[test]
    fn terminal_states_absorb(actions in prop::collection::vec(any_action(), 0..32)) {
        let mut status = ActivityStatus::Pending;
        let mut reached_terminal = None;
        for action in actions {
            if let Ok(next) = status.apply(action) {
                status = next;
            }
            if let Some(t) = reached_terminal {
                prop_assert_eq!(status, t);
            } else if status.is_terminal() {
                reached_terminal = Some(status);
            }
        }
    }

    /// Hex rendering parses back to the same hash.
    #[test]
    fn certificate_hash_hex_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = CertificateHash::new(bytes);
        prop_assert_eq!(CertificateHash::from_hex(&hash.to_string()), Some(hash));
    }

    /// Arbitrary strings never panic the hex parser.
    #[test]
    fn certificate_hash_parse_total(s in ".{0,80}") {
        let _ = CertificateHash::from_hex(&s);
    }

    /// CertificateHash bincode serialization roundtrip.
    #[test]
    fn certificate_hash_bincode_roundtrip(bytes in prop::array::uniform32(0u8..)) {
        let hash = CertificateHash::new(bytes);
        let encoded = bincode::serialize(&hash).unwrap();
        let decoded: CertificateHash = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, hash);
    }

    /// Generated activity ids always parse and keep their sequence.
    #[test]
    fn activity_id_parse_roundtrip(year in 1970i32..=9999, seq in 0u64..10_000_000) {
        let id = ActivityId::new(year, seq);
        let parsed = ActivityId::parse(id.as_str()).unwrap();
        prop_assert_eq!(parsed.sequence(), seq);
        prop_assert_eq!(parsed, id);
    }

    /// Activity ids sort by sequence within a year.
    #[test]
    fn activity_id_ordering(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let ia = ActivityId::new(2026, a);
        let ib = ActivityId::new(2026, b);
        prop_assert_eq!(ia < ib, a < b);
    }

    /// Scores are always within 0..=100.
    #[test]
    fn score_is_bounded(v in any::<i64>(), f in any::<f64>()) {
        prop_assert!(Score::new(v).get() <= 100);
        prop_assert!(Score::from_f64(f).get() <= 100);
    }

    /// Timestamp ordering: new(a) <= new(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::new(a);
        let tb = Timestamp::new(b);
        prop_assert_eq!(ta <= tb, a <= b);
    }
}
