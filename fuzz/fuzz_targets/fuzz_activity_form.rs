#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

use accredit_types::{ActivityForm, ActivityUpdate};

fuzz_target!(|data: &[u8]| {
    let Some(today) = NaiveDate::from_ymd_opt(2026, 3, 1) else {
        return;
    };

    if let Ok(form) = serde_json::from_slice::<ActivityForm>(data) {
        if let Ok(normalized) = form.normalize(today) {
            // Normalization is idempotent.
            let again = normalized.clone().normalize(today).expect("normalized form stays valid");
            assert_eq!(again, normalized);
        }
    }

    let _ = serde_json::from_slice::<ActivityUpdate>(data);
});
