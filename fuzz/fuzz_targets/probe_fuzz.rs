#![no_main]
use libfuzzer_sys::fuzz_target;

use deltapatch::description::{self, Probe};

fuzz_target!(|data: &[u8]| {
    // Malformed headers must come back as absent, never as errors.
    let probe = description::probe(&mut &data[..]).expect("in-memory probe cannot fail");
    if let Probe::Described(text) = probe {
        assert!(!text.contains('\r'));
    }
    let mut out = Vec::new();
    let _ = deltapatch::vcdiff::header::rewrite_app_header(&mut &data[..], &mut out, b"^*");
});
