//! Scanline polygon rasterizer with sub-pixel coverage accumulation.
//!
//! Main features:
//!  - SVG path parsing and generation (straight line commands)
//!  - Even-odd and non-zero fill rules
//!  - Robust handling of vertices on scanlines and nearly horizontal edges
//!  - Anti-aliased rendering into coverage masks
//!
#![deny(warnings)]

mod active;
mod coverage;
mod edge;
mod fill;
mod geometry;
mod image;
mod path;
mod ring;
mod scanner;
pub mod simd;
mod svg;
mod utils;

pub use active::{
    ActiveEdgeList, ActiveEdgeSlot, CrossingType, EdgeState, NON_ZERO_EPSILON,
    apply_non_zero_rule,
};
pub use coverage::accumulate_subpixel_line;
pub use edge::{ScanEdge, ScanEdgeCollection};
pub use fill::{DEFAULT_SUBPIXEL_DEPTH, FillOptions, MINIMUM_SUBPIXEL_COUNT, fill_mask};
pub use geometry::{BBox, EPSILON, Point, Scalar, Transform, scalar_fmt};
pub use image::{Image, ImageIter, ImageMut, ImageMutIter, ImageMutRef, ImageOwned, Shape};
pub use path::{FillRule, Path, PathBuilder, SubPath};
pub use ring::{Multipolygon, Ring, RingType, signed_area};
pub use scanner::PolygonScanner;
pub use svg::{SvgParserError, SvgPathCmd, SvgPathParser};
