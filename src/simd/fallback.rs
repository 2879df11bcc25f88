#![allow(non_camel_case_types)]
use std::{
    fmt,
    ops::{Div, Mul},
};

#[derive(Copy, Clone, PartialEq)]
#[repr(transparent)]
pub struct f64x2([f64; 2]);

impl f64x2 {
    #[inline]
    pub fn new(x0: f64, x1: f64) -> Self {
        Self([x0, x1])
    }

    #[inline]
    pub fn splat(val: f64) -> Self {
        Self([val, val])
    }

    pub fn to_array(self) -> [f64; 2] {
        self.into()
    }

    /// Round to the nearest integer, ties are rounded away from zero
    #[inline]
    pub fn round_half_away(self) -> Self {
        let Self([x0, x1]) = self;
        Self([x0.round(), x1.round()])
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

    #[inline]
    fn mul(self, other: Self) -> Self::Output {
        let Self([a0, a1]) = self;
        let Self([b0, b1]) = other;
        Self([a0 * b0, a1 * b1])
    }
}

impl Div for f64x2 {
    type Output = Self;

    #[inline]
    fn div(self, other: Self) -> Self::Output {
        let Self([a0, a1]) = self;
        let Self([b0, b1]) = other;
        Self([a0 / b0, a1 / b1])
    }
}

impl From<[f64; 2]> for f64x2 {
    fn from(arr: [f64; 2]) -> Self {
        Self(arr)
    }
}

impl From<f64x2> for [f64; 2] {
    fn from(val: f64x2) -> Self {
        val.0
    }
}

pub fn round_to_subpixel_grid(values: &mut [f64], ratio: f64) {
    let ratio_x2 = f64x2::splat(ratio);
    let mut chunks = values.chunks_exact_mut(2);
    for chunk in &mut chunks {
        let value = f64x2::new(chunk[0], chunk[1]);
        let rounded = (value * ratio_x2).round_half_away() / ratio_x2;
        chunk.copy_from_slice(&rounded.to_array());
    }
    for value in chunks.into_remainder() {
        *value = (*value * ratio).round() / ratio;
    }
}
