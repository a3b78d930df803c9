#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(res) = oneshot_h1::http11::parse_response(data) {
        // a parsed response always has a resolvable status.
        assert_eq!(
            oneshot_h1::status_text(res.status()).ok(),
            Some(res.status_text())
        );
    }
});
