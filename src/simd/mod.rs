//! Rounding of vertex coordinates to the sub-pixel grid
//!
//! Vectorized implementation is selected at runtime and produces results
//! bit-identical to the scalar fallback.
use crate::Scalar;

pub mod fallback;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
mod x86;

/// Snap every value to the closest multiple of `1 / ratio`
///
/// Uses `round_half_away_from_zero(value * ratio) / ratio`.
pub fn round_to_subpixel_grid(values: &mut [Scalar], ratio: Scalar) {
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    if std::is_x86_feature_detected!("sse4.1") {
        // Safety: required target feature has just been detected
        unsafe { x86::round_to_subpixel_grid(values, ratio) };
        return;
    }
    fallback::round_to_subpixel_grid(values, ratio)
}
