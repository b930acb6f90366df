//! Fuzz target for priors.json configuration parsing.
//!
//! Parsing and semantic validation must reject arbitrary input with an
//! error, never a panic.

#![no_main]

use es_config::validate::validate_priors;
use es_config::SpinPriors;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(priors) = serde_json::from_slice::<SpinPriors>(data) {
        let _ = validate_priors(&priors);
    }
});
