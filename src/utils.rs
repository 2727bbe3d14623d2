//! Utility functions for the engine

/// Clamp a value into `[0, 1]`, mapping NaN to 0
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Linear map of `value` from `[floor, ceiling]` onto `[0, 1]`, clamped
pub fn linear_scale(value: f64, floor: f64, ceiling: f64) -> f64 {
    clamp01((value - floor) / (ceiling - floor))
}

/// Fraction of `target` reached by `signal`, saturating at 1
pub fn saturation(signal: f64, target: f64) -> f64 {
    clamp01(signal / target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01() {
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(0.25), 0.25);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_linear_scale() {
        assert_eq!(linear_scale(1500.0, 1000.0, 2000.0), 0.5);
        assert_eq!(linear_scale(800.0, 1000.0, 2000.0), 0.0);
        assert_eq!(linear_scale(2400.0, 1000.0, 2000.0), 1.0);
    }

    #[test]
    fn test_saturation() {
        assert_eq!(saturation(3.0, 6.0), 0.5);
        assert_eq!(saturation(12.0, 6.0), 1.0);
        assert_eq!(saturation(0.0, 6.0), 0.0);
    }
}
