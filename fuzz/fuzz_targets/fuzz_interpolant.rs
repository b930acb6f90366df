//! Fuzz target for interpolant construction and evaluation.
//!
//! Arbitrary knots must either be rejected at construction or evaluate
//! without panicking; bounded interpolants never return NaN off-grid. The
//! same holds for interpolants decoded from arbitrary JSON.

#![no_main]

use arbitrary::Arbitrary;
use es_math::{LinearInterpolant, OutOfRange};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    xs: Vec<f64>,
    ys: Vec<f64>,
    queries: Vec<f64>,
    bounded: bool,
    json: Vec<u8>,
}

fuzz_target!(|input: Input| {
    if let Ok(decoded) = serde_json::from_slice::<LinearInterpolant>(&input.json) {
        let _ = decoded.support();
        for &q in &input.queries {
            let _ = decoded.eval(q);
        }
    }

    let policy = if input.bounded {
        OutOfRange::Zero
    } else {
        OutOfRange::Nan
    };
    let Ok(f) = LinearInterpolant::new(input.xs, input.ys, policy) else {
        return;
    };
    let (lo, hi) = f.support();
    for &q in &input.queries {
        let v = f.eval(q);
        if input.bounded && !(lo..=hi).contains(&q) {
            assert_eq!(v, 0.0);
        }
    }
    let _ = f.integral();
});
