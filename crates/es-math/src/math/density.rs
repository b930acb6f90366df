//! The `Density` abstraction shared by analytic priors and interpolants.

use std::sync::Arc;

use super::interp::LinearInterpolant;

/// A real-valued probability density evaluable at any point.
///
/// Implementations return a non-negative value, or NaN where undefined;
/// callers that integrate over a density suppress NaN themselves.
pub trait Density {
    fn density(&self, x: f64) -> f64;

    /// Batch evaluation. Scalars are evaluated as length-1 slices.
    fn density_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.density(x)).collect()
    }
}

/// Adapter turning a closure into a [`Density`].
#[derive(Clone, Copy)]
pub struct FnDensity<F>(pub F);

impl<F> Density for FnDensity<F>
where
    F: Fn(f64) -> f64,
{
    fn density(&self, x: f64) -> f64 {
        (self.0)(x)
    }
}

impl<F> std::fmt::Debug for FnDensity<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FnDensity(..)")
    }
}

impl Density for LinearInterpolant {
    fn density(&self, x: f64) -> f64 {
        self.eval(x)
    }
}

impl<T: Density + ?Sized> Density for &T {
    fn density(&self, x: f64) -> f64 {
        (**self).density(x)
    }
}

impl<T: Density + ?Sized> Density for Box<T> {
    fn density(&self, x: f64) -> f64 {
        (**self).density(x)
    }
}

impl<T: Density + ?Sized> Density for Arc<T> {
    fn density(&self, x: f64) -> f64 {
        (**self).density(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::interp::OutOfRange;

    #[test]
    fn closure_adapter() {
        let d = FnDensity(|x: f64| 2.0 * x);
        assert_eq!(d.density(0.25), 0.5);
        assert_eq!(d.density_many(&[0.0, 0.5]), vec![0.0, 1.0]);
    }

    #[test]
    fn interpolant_is_a_density() {
        let f = LinearInterpolant::new(vec![0.0, 1.0], vec![1.0, 1.0], OutOfRange::Zero)
            .expect("valid interpolant");
        let boxed: Box<dyn Density> = Box::new(f);
        assert_eq!(boxed.density(0.5), 1.0);
        assert_eq!(boxed.density(3.0), 0.0);
        let shared: Arc<dyn Density> = Arc::from(boxed);
        assert_eq!((&shared).density(0.1), 1.0);
    }
}
