#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Stored records come back from LMDB as bincode; corrupt bytes must
    // surface as an error, never a panic.
    let _ = bincode::deserialize::<accredit_types::Activity>(data);
    let _ = bincode::deserialize::<accredit_types::Certificate>(data);
    let _ = bincode::deserialize::<accredit_types::ChainTail>(data);
    let _ = bincode::deserialize::<accredit_types::CertificateHash>(data);

    if let Ok(cert) = bincode::deserialize::<accredit_types::Certificate>(data) {
        let encoded = bincode::serialize(&cert).expect("decoded certificate re-encodes");
        let again: accredit_types::Certificate =
            bincode::deserialize(&encoded).expect("re-encoded certificate decodes");
        assert_eq!(again, cert);
    }
});
