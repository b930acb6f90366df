//! Fuzz target for numerics.json configuration parsing.

#![no_main]

use es_config::validate::validate_numerics;
use es_config::Numerics;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(numerics) = serde_json::from_slice::<Numerics>(data) {
        let _ = validate_numerics(&numerics);
    }
});
