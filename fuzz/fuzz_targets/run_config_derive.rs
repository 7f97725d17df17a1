//! Fuzz harness for `IdentityConfig::from_toml` followed by derivation.
//!
//! Arbitrary byte sequences are converted to UTF-8 strings and loaded as run
//! configurations. Loading and deriving must never panic, and a batch that
//! derives must derive to the same identities a second time.

#![no_main]
use colid_core::IdentityConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = IdentityConfig::from_toml(input) else {
        return;
    };

    match config.derive() {
        Ok(columns) => {
            assert_eq!(columns.len(), config.raw_columns.len());
            let again = config.derive().expect("derivation is deterministic");
            // Payloads may hold NaN, so compare identities rather than records.
            for ((name, a), (_, b)) in columns.iter().zip(again.iter()) {
                assert_eq!(a.base_id, b.base_id, "{name}");
                assert_eq!(a.id_with_tags, b.id_with_tags, "{name}");
            }
        },
        Err(err) => {
            let again = config.derive().expect_err("rejection is deterministic");
            assert_eq!(err, again);
        },
    }
});
