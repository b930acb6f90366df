//! Piecewise-linear interpolation of sampled densities.
//!
//! A [`LinearInterpolant`] stores a strictly increasing grid and the density
//! evaluated on it. Queries inside `[grid.min, grid.max]` interpolate between
//! the bracketing knots; queries outside (or NaN queries) follow the
//! [`OutOfRange`] policy chosen at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::is_strictly_increasing;

/// What an interpolant returns for a query outside its grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutOfRange {
    /// Undefined: return NaN.
    #[default]
    Nan,
    /// Bounds-safe: return 0.
    Zero,
}

/// Errors raised while building an interpolant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InterpolationError {
    #[error("grid and values differ in length ({grid} vs {values})")]
    LengthMismatch { grid: usize, values: usize },

    #[error("need at least 2 knots, got {0}")]
    TooFewPoints(usize),

    #[error("grid must be finite and strictly increasing")]
    NotIncreasing,
}

/// Piecewise-linear interpolant over a sampled grid.
///
/// Deserialising goes through [`LinearInterpolant::new`], so a decoded value
/// holds the same invariants as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawInterpolant")]
pub struct LinearInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    out_of_range: OutOfRange,
}

/// Unchecked wire form of [`LinearInterpolant`].
#[derive(Deserialize)]
struct RawInterpolant {
    xs: Vec<f64>,
    ys: Vec<f64>,
    #[serde(default)]
    out_of_range: OutOfRange,
}

impl TryFrom<RawInterpolant> for LinearInterpolant {
    type Error = InterpolationError;

    fn try_from(raw: RawInterpolant) -> Result<Self, Self::Error> {
        Self::new(raw.xs, raw.ys, raw.out_of_range)
    }
}

impl LinearInterpolant {
    /// Build an interpolant from matching grid/value vectors.
    pub fn new(
        xs: Vec<f64>,
        ys: Vec<f64>,
        out_of_range: OutOfRange,
    ) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::LengthMismatch {
                grid: xs.len(),
                values: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(InterpolationError::TooFewPoints(xs.len()));
        }
        if !is_strictly_increasing(&xs) {
            return Err(InterpolationError::NotIncreasing);
        }
        Ok(Self {
            xs,
            ys,
            out_of_range,
        })
    }

    /// Interpolant returning 0 outside its grid.
    pub fn bounded(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, InterpolationError> {
        Self::new(xs, ys, OutOfRange::Zero)
    }

    /// Evaluate at a single point.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let (lo, hi) = (self.xs[0], self.xs[n - 1]);
        // NaN fails both comparisons and falls through to the policy.
        if !(x >= lo && x <= hi) {
            return match self.out_of_range {
                OutOfRange::Nan => f64::NAN,
                OutOfRange::Zero => 0.0,
            };
        }
        let i = self.xs.partition_point(|&v| v <= x);
        if i >= n {
            return self.ys[n - 1];
        }
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        let t = (x - x0) / (x1 - x0);
        y0 + t * (y1 - y0)
    }

    /// Evaluate at every point of `xs`.
    pub fn eval_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.eval(x)).collect()
    }

    /// Closed interval covered by the grid.
    pub fn support(&self) -> (f64, f64) {
        (self.xs[0], self.xs[self.xs.len() - 1])
    }

    pub fn grid(&self) -> &[f64] {
        &self.xs
    }

    pub fn values(&self) -> &[f64] {
        &self.ys
    }

    pub fn out_of_range(&self) -> OutOfRange {
        self.out_of_range
    }

    /// Same knots with a different out-of-range policy.
    pub fn with_out_of_range(mut self, policy: OutOfRange) -> Self {
        self.out_of_range = policy;
        self
    }

    /// Trapezoid integral of the stored samples (non-finite knots count as 0).
    pub fn integral(&self) -> f64 {
        super::quadrature::trapezoid_finite(&self.ys, &self.xs)
    }
}
