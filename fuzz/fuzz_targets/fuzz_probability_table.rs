//! Fuzz target for cached probability tables and cache keys.
//!
//! Tables come from files on disk; missing or ragged columns and malformed
//! keys must surface as errors.

#![no_main]

use es_core::cache::{CacheKey, ProbabilityTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(table) = serde_json::from_slice::<ProbabilityTable>(data) {
        let target = table.xeff().first().copied().unwrap_or(0.0);
        let _ = table.interpolant_at(target, 1e-6);
    }

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(key) = text.parse::<CacheKey>() {
            // A parsed key must print back to something that parses.
            assert!(key.to_string().parse::<CacheKey>().is_ok());
        }
    }
});
