#![no_main]

use libfuzzer_sys::fuzz_target;

use accredit_fraud::{http::parse_reply, normalize};
use accredit_types::{Timestamp, Verdict};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    // Whatever the classifier says, the normalized assessment stays inside
    // the closed vocabulary and the score range.
    if let Ok(raw) = parse_reply(content) {
        let assessment = normalize(raw, Timestamp::new(0));
        assert!(assessment.fraud_score.get() <= 100);
        assert!(assessment.confidence.get() <= 100);
        assert_ne!(assessment.verdict, Verdict::ManualReviewRequired);
        assert!(!assessment.is_degraded());
    }
});
