#![no_main]

use libfuzzer_sys::fuzz_target;

use accredit_types::{ActivityId, CertificateHash, Role, UserId};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(hash) = CertificateHash::from_hex(s) {
        // Parsing is case-insensitive; rendering is always lowercase.
        assert_eq!(hash.to_string(), s.to_ascii_lowercase());
    }

    if let Ok(id) = ActivityId::parse(s) {
        let reparsed = ActivityId::parse(id.as_str()).expect("rendered id parses");
        assert_eq!(reparsed, id);
    }

    let _ = UserId::new(s);
    let _ = Role::parse(s);
});
