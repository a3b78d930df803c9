#![no_main]
use libfuzzer_sys::fuzz_target;

use oneshot_h1::chunked::ChunkedDecoder;

fuzz_target!(|data: &[u8]| {
    let mut dec = ChunkedDecoder::new();
    if let Ok(out) = dec.decode(data) {
        assert!(out.len() <= data.len());
    }
});
