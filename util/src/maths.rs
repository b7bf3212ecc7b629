//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0f64, 1f64), (0f64, 10f64), 0.5f64), 5f64);
        assert_eq!(lin_map((0f64, 0.3f64), (0f64, 0.306f64), 0.3f64), 0.306f64);
        assert_eq!(lin_map((0f64, 0.3f64), (0f64, 0.306f64), 0f64), 0f64);

        // Negative values map to negative outputs when both ranges start at
        // zero
        assert!(lin_map((0f64, 0.3f64), (0f64, 0.306f64), -0.15f64) < 0f64);
    }
}
