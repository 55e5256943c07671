//! Arithmetic primitives.
//!
//! All rule thresholds are i64 fixed-point (SCALE = 10_000).
//! No float. No f64. No f32.

/// Fixed-point scale factor. All "real" fractions are stored as `real * SCALE`.
pub const SCALE: i64 = 10_000;

/// Checked integer addition. Panics on i64 overflow.
pub fn checked_add(a: i64, b: i64) -> i64 {
    match a.checked_add(b) {
        Some(result) => result,
        None => panic!("Overflow: {} + {} overflows i64", a, b),
    }
}

/// Checked integer multiplication. Panics on i64 overflow.
pub fn checked_mul(a: i64, b: i64) -> i64 {
    match a.checked_mul(b) {
        Some(result) => result,
        None => panic!("Overflow: {} * {} overflows i64", a, b),
    }
}

/// Exact test for `count > frac * total`, where `frac` is fixed-point.
pub fn exceeds_fraction(count: i64, total: i64, frac: i64) -> bool {
    checked_mul(count, SCALE) > checked_mul(frac, total)
}

/// Exact test for `count >= frac * total`, where `frac` is fixed-point.
pub fn reaches_fraction(count: i64, total: i64, frac: i64) -> bool {
    checked_mul(count, SCALE) >= checked_mul(frac, total)
}

/// Exact test for `count < frac * total`, where `frac` is fixed-point.
pub fn below_fraction(count: i64, total: i64, frac: i64) -> bool {
    checked_mul(count, SCALE) < checked_mul(frac, total)
}

/// Validate that a vertex ID matches `[a-zA-Z0-9_-]+`. Panics on mismatch.
pub fn validate_vertex_id(vertex_id: &str) {
    if vertex_id.is_empty() {
        panic!("Invalid vertex ID {:?}: must match [a-zA-Z0-9_-]+", vertex_id);
    }
    for ch in vertex_id.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '_' && ch != '-' {
            panic!("Invalid vertex ID {:?}: must match [a-zA-Z0-9_-]+", vertex_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_add_ok() {
        assert_eq!(checked_add(3, 4), 7);
        assert_eq!(checked_add(-10, 5), -5);
    }

    #[test]
    #[should_panic(expected = "Overflow")]
    fn test_checked_add_overflow() {
        checked_add(i64::MAX, 1);
    }

    #[test]
    fn test_checked_mul_ok() {
        assert_eq!(checked_mul(3, 4), 12);
    }

    #[test]
    #[should_panic(expected = "Overflow")]
    fn test_checked_mul_overflow() {
        checked_mul(i64::MAX, 2);
    }

    #[test]
    fn test_fraction_comparisons() {
        // 3 of 5 neighbors is a strict majority (frac = 0.5)
        assert!(exceeds_fraction(3, 5, 5_000));
        // 2 of 4 is not
        assert!(!exceeds_fraction(2, 4, 5_000));
        assert!(reaches_fraction(1, 4, 2_500));
        assert!(below_fraction(0, 4, 2_500));
        // Empty neighborhoods never exceed or fall below anything
        assert!(!exceeds_fraction(0, 0, 5_000));
        assert!(!below_fraction(0, 0, 2_500));
    }

    #[test]
    fn test_validate_vertex_id_ok() {
        validate_vertex_id("v_1");
        validate_vertex_id("A-B_c-3");
    }

    #[test]
    #[should_panic(expected = "Invalid vertex ID")]
    fn test_validate_vertex_id_bad() {
        validate_vertex_id("vertex with spaces");
    }
}
