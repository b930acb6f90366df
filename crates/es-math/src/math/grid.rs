//! Uniform coordinate grids.

/// `count` evenly spaced values from `low` to `high`, both ends included.
///
/// Returns an empty grid for `count == 0` and `[low]` for `count == 1`.
/// The last element is exactly `high` so that support boundaries survive
/// floating point accumulation.
pub fn make_grid(low: f64, high: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (count - 1) as f64;
            let mut grid: Vec<f64> = (0..count).map(|i| low + step * i as f64).collect();
            grid[count - 1] = high;
            grid
        }
    }
}

/// Grid spanning the interval between `a` and `b` in increasing order.
pub fn make_grid_between(a: f64, b: f64, count: usize) -> Vec<f64> {
    if a <= b {
        make_grid(a, b, count)
    } else {
        make_grid(b, a, count)
    }
}

/// Spacing of a uniform grid, or `None` if fewer than two points.
pub fn grid_step(grid: &[f64]) -> Option<f64> {
    if grid.len() < 2 {
        return None;
    }
    Some((grid[grid.len() - 1] - grid[0]) / (grid.len() - 1) as f64)
}

/// Copy of `grid` without the nodes whose magnitude is at most `tolerance`.
pub fn drop_near_zero(grid: &[f64], tolerance: f64) -> Vec<f64> {
    grid.iter().copied().filter(|v| v.abs() > tolerance).collect()
}

/// True if every consecutive pair is strictly increasing and finite.
pub fn is_strictly_increasing(grid: &[f64]) -> bool {
    grid.iter().all(|v| v.is_finite()) && grid.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_includes_both_ends() {
        let g = make_grid(-1.0, 1.0, 5);
        assert_eq!(g, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn grid_degenerate_counts() {
        assert!(make_grid(0.0, 1.0, 0).is_empty());
        assert_eq!(make_grid(0.3, 1.0, 1), vec![0.3]);
    }

    #[test]
    fn last_point_is_exact() {
        let g = make_grid(0.1, 0.7, 1001);
        assert_eq!(g.len(), 1001);
        assert_eq!(*g.last().unwrap(), 0.7);
    }

    #[test]
    fn between_orders_endpoints() {
        let g = make_grid_between(0.4, -0.2, 4);
        assert_eq!(g[0], -0.2);
        assert_eq!(g[3], 0.4);
        assert!(is_strictly_increasing(&g));
    }

    #[test]
    fn step_and_zero_removal() {
        let g = make_grid(-1.0, 1.0, 21);
        let step = grid_step(&g).unwrap();
        assert!((step - 0.1).abs() < 1e-12);
        let trimmed = drop_near_zero(&g, 1e-12);
        assert_eq!(trimmed.len(), 20);
        assert!(trimmed.iter().all(|v| v.abs() > 1e-12));
        assert!(grid_step(&[1.0]).is_none());
    }

    #[test]
    fn increasing_check_rejects_nan_and_ties() {
        assert!(!is_strictly_increasing(&[0.0, 0.0, 1.0]));
        assert!(!is_strictly_increasing(&[0.0, f64::NAN]));
        assert!(is_strictly_increasing(&[0.0, 0.5]));
    }
}
