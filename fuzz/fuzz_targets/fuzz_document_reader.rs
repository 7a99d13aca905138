#![no_main]

use libfuzzer_sys::fuzz_target;
use srmdoc::reader::DocumentReader;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must load or fail with an error, never panic
    if let Ok(document) = DocumentReader::new().read(data) {
        let _ = document.counts();
    }
});
