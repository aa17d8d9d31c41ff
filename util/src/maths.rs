//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Convert an angle in degrees to radians.
pub fn deg_to_rad<T>(deg: T) -> T
where
    T: Float
{
    deg.to_radians()
}

/// Clamp a value into `[min, max]`, mapping NaN onto `min`.
pub fn clamp_finite<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    if value.is_nan() {
        min
    }
    else if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 180f64), (500f64, 2500f64), 90f64), 1500f64);
        assert_eq!(lin_map((0f64, 180f64), (500f64, 2500f64), 0f64), 500f64);
        assert_eq!(lin_map((-1f64, 1f64), (0f64, 10f64), 1f64), 10f64);
    }

    #[test]
    fn test_clamp_finite() {
        assert_eq!(clamp_finite(200f64, 0f64, 180f64), 180f64);
        assert_eq!(clamp_finite(-3f64, 0f64, 180f64), 0f64);
        assert_eq!(clamp_finite(f64::NAN, 0f64, 180f64), 0f64);
        assert_eq!(clamp_finite(45f64, 0f64, 180f64), 45f64);
    }

    #[test]
    fn test_deg_to_rad() {
        assert!((deg_to_rad(180f64) - std::f64::consts::PI).abs() < 1e-12);
    }
}
