//! Radial kernel weighting applied to window offsets.
//!
//! The same weights scale the rows of the design matrix and the residual
//! sums of squares, so a single vector is built per width and shared.

/// Weight for a squared radius `u` (in normalized window coordinates).
#[inline]
pub fn kernel_weight(u: f64) -> f64 {
    (-2.0 * u).exp()
}

/// Kernel weights for every offset of a window given flattened coordinates.
pub fn kernel_weights(x: &[f64], y: &[f64]) -> Vec<f64> {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| kernel_weight(xi * xi + yi * yi))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_is_one_at_center_and_decreasing() {
        assert_eq!(kernel_weight(0.0), 1.0);
        let mut prev = kernel_weight(0.0);
        for k in 1..20 {
            let w = kernel_weight(k as f64 * 0.1);
            assert!(w < prev && w > 0.0);
            prev = w;
        }
        assert!((kernel_weight(1.0) - (-2.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn weights_depend_on_radius_only() {
        let x = [1.0, 0.0, -1.0, 0.0];
        let y = [0.0, 1.0, 0.0, -1.0];
        let w = kernel_weights(&x, &y);
        assert!(w.iter().all(|&v| (v - w[0]).abs() < 1e-15));
    }
}
