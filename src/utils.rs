//! Utility functions and types used accross the library
use crate::Scalar;

/// Restrict value to a certain interval
#[inline]
pub fn clamp<T>(val: T, min: T, max: T) -> T
where
    T: PartialOrd,
{
    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// Stable sort of edge indices by a key extracted from each index
///
/// Equal keys keep their relative order, which keeps the sweep deterministic.
pub(crate) fn sort_indices_by_key<F>(indices: &mut [u32], key: F)
where
    F: Fn(u32) -> Scalar,
{
    indices.sort_by(|a, b| key(*a).total_cmp(&key(*b)));
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[macro_export]
    macro_rules! assert_approx_eq {
        ( $v0:expr, $v1: expr ) => {{
            assert!(($v0 - $v1).abs() < $crate::EPSILON, "{} != {}", $v0, $v1);
        }};
        ( $v0:expr, $v1: expr, $e: expr ) => {{
            assert!(($v0 - $v1).abs() < $e, "{} != {}", $v0, $v1);
        }};
    }

    /// Compare two crossing lists with a tolerance
    pub(crate) fn assert_slice_approx_eq(actual: &[Scalar], expected: &[Scalar], eps: Scalar) {
        assert_eq!(
            actual.len(),
            expected.len(),
            "length mismatch: {:?} != {:?}",
            actual,
            expected
        );
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < eps, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp(-0.1, 0.0, 1.0), 0.0);
        assert_eq!(clamp(3, 1, 5), 3);
    }

    #[test]
    fn test_sort_indices_stable() {
        let keys = [3.0, 1.0, 3.0, 0.0, 1.0];
        let mut indices = vec![0u32, 1, 2, 3, 4];
        sort_indices_by_key(&mut indices, |i| keys[i as usize]);
        assert_eq!(indices, vec![3, 1, 4, 0, 2]);
    }
}
