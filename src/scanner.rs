//! Scanline sweep over pixel rows and sub-pixel lines
//!
//! Usage pattern:
//! ```
//! # use polyscan::{FillRule, Path, PolygonScanner};
//! let path: Path = "M1,1 L9,1 L5,9 Z".parse().unwrap();
//! let mut scanner = PolygonScanner::from_path(&path, 0, 10, 4, FillRule::EvenOdd);
//! while scanner.move_to_next_pixel_line() {
//!     while scanner.move_to_next_subpixel_line() {
//!         let crossings = scanner.scan_current_line();
//!         assert!(crossings.len() % 2 == 0);
//!     }
//! }
//! ```
use crate::{
    ActiveEdgeList, CrossingType, FillRule, Multipolygon, Path, Scalar, ScanEdge,
    ScanEdgeCollection, coverage::accumulate_subpixel_line, utils::sort_indices_by_key,
};
use std::borrow::Cow;

/// Polygon scanner producing fill rule resolved crossings for each sub-pixel line
///
/// Scanner only visits rows in the range `min_y..max_y`, edges located above
/// `min_y` are fast-forwarded during construction.
pub struct PolygonScanner<'a> {
    edges: Cow<'a, [ScanEdge]>,
    fill_rule: FillRule,
    min_y: i32,
    max_y: i32,
    subsampling: usize,
    subpixel_distance: Scalar,
    subpixel_area: Scalar,
    // edge indices ordered by `y0` and `y1`
    sorted0: Vec<u32>,
    sorted1: Vec<u32>,
    // next edge to enter and to leave
    idx0: usize,
    idx1: usize,
    active: ActiveEdgeList,
    crossings: Vec<Scalar>,
    markers: Vec<(Scalar, CrossingType)>,
    pixel_line_y: i32,
    sub_index: usize,
    sub_y: Scalar,
}

impl<'a> PolygonScanner<'a> {
    /// Create scanner over already constructed edges
    ///
    /// `subsampling` must match the one used to build `edges`, `max_intersections`
    /// is the expected upper bound on the number of crossings of a single line.
    ///
    /// # Panics
    /// If `subsampling` is zero.
    pub fn new(
        edges: impl Into<Cow<'a, [ScanEdge]>>,
        max_intersections: usize,
        min_y: i32,
        max_y: i32,
        subsampling: usize,
        fill_rule: FillRule,
    ) -> Self {
        assert!(subsampling > 0, "subsampling must be positive");
        let edges = edges.into();
        let edge_count = edges.len();
        tracing::trace!(
            edges = edge_count,
            max_intersections,
            min_y,
            max_y,
            subsampling,
            "scanner allocated"
        );

        let mut sorted0: Vec<u32> = (0..edge_count as u32).collect();
        let mut sorted1 = sorted0.clone();
        sort_indices_by_key(&mut sorted0, |index| edges[index as usize].y0);
        sort_indices_by_key(&mut sorted1, |index| edges[index as usize].y1);

        let markers = match fill_rule {
            FillRule::NonZero => Vec::with_capacity(max_intersections),
            FillRule::EvenOdd => Vec::new(),
        };
        let subpixel_distance = 1.0 / subsampling as Scalar;
        let mut scanner = Self {
            edges,
            fill_rule,
            min_y,
            max_y,
            subsampling,
            subpixel_distance,
            subpixel_area: subpixel_distance / subsampling as Scalar,
            sorted0,
            sorted1,
            idx0: 0,
            idx1: 0,
            active: ActiveEdgeList::with_capacity(edge_count),
            crossings: Vec::with_capacity(max_intersections),
            markers,
            pixel_line_y: min_y - 1,
            sub_index: 0,
            sub_y: 0.0,
        };
        scanner.skip_edges_before_min_y();
        scanner
    }

    /// Create scanner sharing edge collection, scanners over disjoint row
    /// ranges of the same collection can run concurrently
    pub fn with_edges(
        edges: &'a ScanEdgeCollection,
        min_y: i32,
        max_y: i32,
        fill_rule: FillRule,
    ) -> Self {
        Self::new(
            edges.edges(),
            edges.max_intersections(),
            min_y,
            max_y,
            edges.subsampling(),
            fill_rule,
        )
    }

    /// Create scanner owning edges of the multipolygon
    pub fn from_multipolygon(
        multipolygon: &Multipolygon,
        min_y: i32,
        max_y: i32,
        subsampling: usize,
        fill_rule: FillRule,
    ) -> PolygonScanner<'static> {
        let edges = ScanEdgeCollection::build(multipolygon, subsampling);
        let max_intersections = edges.max_intersections();
        PolygonScanner::new(
            edges.into_edges(),
            max_intersections,
            min_y,
            max_y,
            subsampling,
            fill_rule,
        )
    }

    /// Create scanner owning edges of the path, all sub-paths are treated as closed
    pub fn from_path(
        path: &Path,
        min_y: i32,
        max_y: i32,
        subsampling: usize,
        fill_rule: FillRule,
    ) -> PolygonScanner<'static> {
        Self::from_multipolygon(
            &Multipolygon::from_path(path),
            min_y,
            max_y,
            subsampling,
            fill_rule,
        )
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn subsampling(&self) -> usize {
        self.subsampling
    }

    /// Vertical distance between two sub-pixel lines
    pub fn subpixel_distance(&self) -> Scalar {
        self.subpixel_distance
    }

    /// Area of a pixel fraction covered by a single sub-pixel line sample
    pub fn subpixel_area(&self) -> Scalar {
        self.subpixel_area
    }

    /// Current pixel row
    pub fn pixel_line_y(&self) -> i32 {
        self.pixel_line_y
    }

    /// Vertical position of the current sub-pixel line
    pub fn sub_y(&self) -> Scalar {
        self.sub_y
    }

    /// Process all edge events located above `min_y` without computing crossings
    fn skip_edges_before_min_y(&mut self) {
        let Some(first) = self.sorted0.first() else {
            return;
        };
        self.sub_y = self.edges[*first as usize].y0;

        // merge walk over start and end events
        let mut i0 = 1;
        let mut i1 = 0;
        while self.sub_y < self.min_y as Scalar {
            self.enter_edges();
            self.leave_edges();
            self.active.remove_leaving_edges();

            let y0 = self.sorted0.get(i0).map(|index| self.edges[*index as usize].y0);
            let y1 = self.sorted1.get(i1).map(|index| self.edges[*index as usize].y1);
            match (y0, y1) {
                (None, None) => {
                    // whole polygon is above the scanned region
                    break;
                }
                (Some(y0), y1) if y0 < y1.unwrap_or(Scalar::INFINITY) => {
                    self.sub_y = y0;
                    i0 += 1;
                }
                (_, Some(y1)) => {
                    self.sub_y = y1;
                    i1 += 1;
                }
                (Some(y0), None) => {
                    self.sub_y = y0;
                    i0 += 1;
                }
            }
        }
        tracing::trace!(
            active = self.active.len(),
            entered = self.idx0,
            left = self.idx1,
            "skipped edges before min_y"
        );
    }

    /// Move to the next pixel row, returns `false` once all rows are visited
    pub fn move_to_next_pixel_line(&mut self) -> bool {
        self.pixel_line_y += 1;
        self.sub_index = 0;
        self.sub_y = self.pixel_line_y as Scalar - self.subpixel_distance;
        self.pixel_line_y < self.max_y
    }

    /// Alias of [`PolygonScanner::move_to_next_pixel_line`]
    pub fn advance_row(&mut self) -> bool {
        self.move_to_next_pixel_line()
    }

    /// Move to the next sub-pixel line of the current row, returns `false` once
    /// the row is exhausted
    ///
    /// Line positions are computed from the row and line index, so they land
    /// exactly on the grid edges were rounded to.
    pub fn move_to_next_subpixel_line(&mut self) -> bool {
        let subsampling = self.subsampling as Scalar;
        self.sub_y =
            (self.pixel_line_y as Scalar * subsampling + self.sub_index as Scalar) / subsampling;
        self.sub_index += 1;
        self.enter_edges();
        self.leave_edges();
        self.sub_index <= self.subsampling
    }

    /// Crossings of the current sub-pixel line resolved with the fill rule
    ///
    /// Result is sorted and has even length for well formed polygons.
    pub fn scan_current_line(&mut self) -> &[Scalar] {
        match self.fill_rule {
            FillRule::EvenOdd => {
                self.active
                    .scan_even_odd(self.sub_y, &self.edges, &mut self.crossings)
            }
            FillRule::NonZero => self.active.scan_non_zero(
                self.sub_y,
                &self.edges,
                &mut self.crossings,
                &mut self.markers,
            ),
        }
        &self.crossings
    }

    /// Scan all sub-pixel lines of the current row and accumulate their coverage
    ///
    /// `row[0]` corresponds to the pixel column `min_x`. Returns `true` if
    /// anything was written.
    pub fn fill_row_coverage(&mut self, row: &mut [Scalar], min_x: Scalar, x_offset: Scalar) -> bool {
        let distance = self.subpixel_distance;
        let area = self.subpixel_area;
        let mut dirty = false;
        while self.move_to_next_subpixel_line() {
            let crossings = self.scan_current_line();
            dirty |= accumulate_subpixel_line(crossings, min_x, x_offset, distance, area, row);
        }
        dirty
    }

    fn enter_edges(&mut self) {
        while let Some(index) = self.sorted0.get(self.idx0) {
            if self.edges[*index as usize].y0 > self.sub_y {
                break;
            }
            self.active.enter_edge(*index);
            self.idx0 += 1;
        }
    }

    fn leave_edges(&mut self) {
        while let Some(index) = self.sorted1.get(self.idx1) {
            if self.edges[*index as usize].y1 > self.sub_y {
                break;
            }
            self.active.leave_edge(*index);
            self.idx1 += 1;
        }
    }
}

impl std::fmt::Debug for PolygonScanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonScanner")
            .field("fill_rule", &self.fill_rule)
            .field("rows", &(self.min_y..self.max_y))
            .field("subsampling", &self.subsampling)
            .field("edges", &self.edges.len())
            .field("active", &self.active.len())
            .field("pixel_line_y", &self.pixel_line_y)
            .field("sub_y", &self.sub_y)
            .finish()
    }
}
