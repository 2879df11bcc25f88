#![allow(non_camel_case_types, unused_unsafe)]

use bytemuck::{Pod, Zeroable};
use std::arch::x86_64::*;
use std::{
    fmt,
    ops::{Div, Mul},
};

#[repr(transparent)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct f64x2(__m128d);

impl f64x2 {
    #[inline(always)]
    pub fn new(x0: f64, x1: f64) -> Self {
        Self(unsafe { _mm_set_pd(x1, x0) })
    }

    #[inline(always)]
    pub fn splat(val: f64) -> Self {
        Self(unsafe { _mm_set1_pd(val) })
    }

    #[inline(always)]
    pub fn to_array(self) -> [f64; 2] {
        self.into()
    }

    pub fn fallback(self) -> super::fallback::f64x2 {
        let this: [f64; 2] = self.into();
        this.into()
    }

    /// Round to the nearest integer, ties are rounded away from zero
    ///
    /// SSE rounding modes only offer ties-to-even, so the value is truncated
    /// and the carry is restored from the fractional part.
    #[inline]
    #[target_feature(enable = "sse4.1")]
    pub unsafe fn round_half_away(self) -> Self {
        unsafe {
            let sign_mask = _mm_set1_pd(-0.0);
            let trunc = _mm_round_pd::<{ _MM_FROUND_TO_ZERO | _MM_FROUND_NO_EXC }>(self.0);
            let frac = _mm_andnot_pd(sign_mask, _mm_sub_pd(self.0, trunc));
            let carry = _mm_and_pd(_mm_cmpge_pd(frac, _mm_set1_pd(0.5)), _mm_set1_pd(1.0));
            let carry = _mm_or_pd(carry, _mm_and_pd(self.0, sign_mask));
            Self(_mm_add_pd(trunc, carry))
        }
    }
}

impl fmt::Debug for f64x2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x0, x1] = self.to_array();
        f.debug_tuple("f64x2").field(&x0).field(&x1).finish()
    }
}

impl Mul for f64x2 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, other: Self) -> Self::Output {
        Self(unsafe { _mm_mul_pd(self.0, other.0) })
    }
}

impl Div for f64x2 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self::Output {
        Self(unsafe { _mm_div_pd(self.0, rhs.0) })
    }
}

impl From<[f64; 2]> for f64x2 {
    #[inline(always)]
    fn from(arr: [f64; 2]) -> Self {
        bytemuck::cast(arr)
    }
}

impl From<f64x2> for [f64; 2] {
    #[inline(always)]
    fn from(val: f64x2) -> Self {
        bytemuck::cast(val)
    }
}

/// Vectorized version of [`super::fallback::round_to_subpixel_grid`]
///
/// # Safety
/// CPU must support `sse4.1`
#[target_feature(enable = "sse4.1")]
pub unsafe fn round_to_subpixel_grid(values: &mut [f64], ratio: f64) {
    let ratio_x2 = f64x2::splat(ratio);
    let mut chunks = values.chunks_exact_mut(2);
    for chunk in &mut chunks {
        let value = f64x2::new(chunk[0], chunk[1]);
        let rounded = unsafe { (value * ratio_x2).round_half_away() } / ratio_x2;
        chunk.copy_from_slice(&rounded.to_array());
    }
    for value in chunks.into_remainder() {
        *value = (*value * ratio).round() / ratio;
    }
}
