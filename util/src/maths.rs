//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Clamp a value between a minimum and maximum.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

/// Wrap an angle into the range [0, 2pi).
pub fn wrap_to_tau<T>(angle: T) -> T
where
    T: Float
{
    rem_euclid(angle, T::from(std::f64::consts::TAU).unwrap())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &-1f64, &1f64), 1f64);
        assert_eq!(clamp(&-2f64, &-1f64, &1f64), -1f64);
        assert_eq!(clamp(&0.5f64, &-1f64, &1f64), 0.5f64);
    }

    #[test]
    fn test_wrap_to_tau() {
        const TAU: f64 = std::f64::consts::TAU;

        assert_eq!(wrap_to_tau(0f64), 0f64);
        assert_eq!(wrap_to_tau(TAU), 0f64);
        assert!((wrap_to_tau(-1f64) - (TAU - 1f64)).abs() < 1e-12);
        assert!((wrap_to_tau(TAU + 1f64) - 1f64).abs() < 1e-12);
    }
}
