//! Effective-spin math utilities.

pub mod math;

pub use math::density::{Density, FnDensity};
pub use math::grid::*;
pub use math::interp::{InterpolationError, LinearInterpolant, OutOfRange};
pub use math::quadrature::*;
pub use math::special::*;
