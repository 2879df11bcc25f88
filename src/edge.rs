//! Edge table construction
//!
//! Every non-horizontal edge of every ring is converted into a [`ScanEdge`]
//! directed downwards. Intersections of a scanline with ring vertices need
//! special care, each vertex is reported zero, one or two times depending on
//! the directions of the adjacent edges. Horizontal edges are never scanned
//! but they still decide how their neighbours emit shared vertices.
use crate::{Multipolygon, Path, Point, Scalar, simd::round_to_subpixel_grid};
use std::fmt;

/// Non-horizontal polygon edge prepared for scanning
///
/// The edge is stored in the reciprocal slope form `x = p * y + q`
/// with `y0 < y1`.
#[derive(Clone, Copy, PartialEq)]
pub struct ScanEdge {
    pub y0: Scalar,
    pub y1: Scalar,
    p: Scalar,
    q: Scalar,
    edge_up: bool,
    emit_v0: u8,
    emit_v1: u8,
}

impl fmt::Debug for ScanEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanEdge(y0={} y1={} e0={} e1={} {} p={} q={})",
            self.y0,
            self.y1,
            self.emit_v0,
            self.emit_v1,
            if self.edge_up { "up" } else { "down" },
            self.p,
            self.q,
        )
    }
}

impl ScanEdge {
    /// Create edge between `p0` and `p1`, `p0` must be above `p1`
    pub fn new(p0: Point, p1: Point, edge_up: bool, emit_v0: u8, emit_v1: u8) -> Self {
        let dy = p1.y() - p0.y();
        debug_assert!(dy > 0.0, "scan edge must be directed downwards");

        // center edge around zero before computing coefficients
        let center = 0.5 * (p0 + p1);
        let Point([x0, y0]) = p0 - center;
        let Point([x1, y1]) = p1 - center;
        let p = (x1 - x0) / dy;
        let q = (x0 * y1 - x1 * y0) / dy;

        Self {
            y0: p0.y(),
            y1: p1.y(),
            p,
            q: q + center.x() - p * center.y(),
            edge_up,
            emit_v0,
            emit_v1,
        }
    }

    /// Whether edge goes upwards on screen in the original vertex order
    #[inline]
    pub fn edge_up(&self) -> bool {
        self.edge_up
    }

    /// Number of times an intersection at `y0` is reported
    #[inline]
    pub fn emit_v0(&self) -> u8 {
        self.emit_v0
    }

    /// Number of times an intersection at `y1` is reported
    #[inline]
    pub fn emit_v1(&self) -> u8 {
        self.emit_v1
    }

    /// Horizontal coordinate of the edge at `y`
    #[inline]
    pub fn x_at(&self, y: Scalar) -> Scalar {
        self.p * y + self.q
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeCategory {
    Up,
    Down,
    Left,
    Right,
}

/// Polygon edge tracked while walking the ring
#[derive(Debug, Clone, Copy)]
struct EdgeData {
    category: EdgeCategory,
    start: Point,
    end: Point,
    emit_start: u8,
    emit_end: u8,
}

impl EdgeData {
    /// Edge starting at vertex `index` with y coordinates already on the sub-pixel grid
    fn new(vertices: &[Point], rounded_y: &[Scalar], index: usize) -> Self {
        let start = Point::new(vertices[index].x(), rounded_y[index]);
        let end = Point::new(vertices[index + 1].x(), rounded_y[index + 1]);
        let category = if start.y() == end.y() {
            if start.x() < end.x() {
                EdgeCategory::Right
            } else {
                EdgeCategory::Left
            }
        } else if start.y() < end.y() {
            EdgeCategory::Down
        } else {
            EdgeCategory::Up
        };
        Self {
            category,
            start,
            end,
            emit_start: 0,
            emit_end: 0,
        }
    }

    fn is_horizontal(&self) -> bool {
        matches!(self.category, EdgeCategory::Left | EdgeCategory::Right)
    }

    /// Decide how many times the vertex shared by `from` and `to` is reported
    ///
    /// Collinear horizontal pairs never emit, corners with a horizontal
    /// neighbour or a concave turn emit twice, everything else emits once.
    fn apply_vertex_category(from: &mut EdgeData, to: &mut EdgeData) {
        use EdgeCategory::*;
        match (from.category, to.category) {
            (Up, Up) => to.emit_start = 1,
            (Up, Down) => {
                from.emit_end = 1;
                to.emit_start = 1;
            }
            (Up, Left) => from.emit_end = 2,
            (Up, Right) => from.emit_end = 1,
            (Down, Up) => {
                from.emit_end = 1;
                to.emit_start = 1;
            }
            (Down, Down) => to.emit_start = 1,
            (Down, Left) => from.emit_end = 1,
            (Down, Right) => from.emit_end = 2,
            (Left, Up) => to.emit_start = 1,
            (Left, Down) => to.emit_start = 2,
            (Right, Up) => to.emit_start = 2,
            (Right, Down) => to.emit_start = 1,
            (Left | Right, Left | Right) => {}
        }
    }

    fn to_scan_edge(self) -> ScanEdge {
        if self.category == EdgeCategory::Up {
            ScanEdge::new(self.end, self.start, true, self.emit_end, self.emit_start)
        } else {
            ScanEdge::new(self.start, self.end, false, self.emit_start, self.emit_end)
        }
    }
}

/// Sliding window of three consecutive ring edges
struct RingWalker<'a> {
    output: &'a mut Vec<ScanEdge>,
    prev: EdgeData,
    current: EdgeData,
    next: EdgeData,
}

impl RingWalker<'_> {
    /// Resolve both vertices of the current edge, optionally emit previous edge and shift window
    fn advance(&mut self, emit_prev: bool) {
        EdgeData::apply_vertex_category(&mut self.prev, &mut self.current);
        EdgeData::apply_vertex_category(&mut self.current, &mut self.next);
        if emit_prev && !self.prev.is_horizontal() {
            self.output.push(self.prev.to_scan_edge());
        }
        self.prev = self.current;
        self.current = self.next;
    }
}

/// Packed edge table of a multipolygon
#[derive(Debug, Clone, Default)]
pub struct ScanEdgeCollection {
    edges: Vec<ScanEdge>,
    total_vertex_count: usize,
    subsampling: usize,
}

impl ScanEdgeCollection {
    /// Build edge table, `subsampling` is the number of sub-pixel lines per pixel
    pub fn build(multipolygon: &Multipolygon, subsampling: usize) -> Self {
        let _span = tracing::debug_span!(
            "[edge_table]",
            rings = multipolygon.len(),
            vertices = multipolygon.total_vertex_count()
        )
        .entered();

        let ratio = subsampling as Scalar;
        let mut edges = Vec::with_capacity(multipolygon.total_vertex_count());
        let mut rounded_y: Vec<Scalar> = Vec::new();

        for ring in multipolygon {
            if ring.vertex_count() < 3 {
                continue;
            }
            let vertices = ring.vertices();
            rounded_y.clear();
            rounded_y.extend(vertices.iter().map(|p| p.y()));
            round_to_subpixel_grid(&mut rounded_y, ratio);

            let last = vertices.len() - 2;
            let mut walker = RingWalker {
                output: &mut edges,
                prev: EdgeData::new(vertices, &rounded_y, last),
                current: EdgeData::new(vertices, &rounded_y, 0),
                next: EdgeData::new(vertices, &rounded_y, 1),
            };
            walker.advance(false);
            for index in 1..last {
                walker.next = EdgeData::new(vertices, &rounded_y, index + 1);
                walker.advance(true);
            }
            // wrap around, emit the edge before last and the last edge
            walker.next = EdgeData::new(vertices, &rounded_y, 0);
            walker.advance(true);
            walker.next = EdgeData::new(vertices, &rounded_y, 1);
            walker.advance(true);
        }
        tracing::trace!(edges = edges.len(), "edge table built");

        Self {
            edges,
            total_vertex_count: multipolygon.total_vertex_count(),
            subsampling,
        }
    }

    /// Build edge table directly from the path
    pub fn from_path(path: &Path, subsampling: usize) -> Self {
        Self::build(&Multipolygon::from_path(path), subsampling)
    }

    pub fn edges(&self) -> &[ScanEdge] {
        &self.edges
    }

    pub fn into_edges(self) -> Vec<ScanEdge> {
        self.edges
    }

    /// Number of sub-pixel lines per pixel the edges were rounded to
    pub fn subsampling(&self) -> usize {
        self.subsampling
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Vertex count of the source multipolygon, bounds the number of crossings per scanline
    pub fn total_vertex_count(&self) -> usize {
        self.total_vertex_count
    }

    /// Upper bound of the number of crossings reported for a single scanline
    pub fn max_intersections(&self) -> usize {
        2 * self.total_vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ring, RingType, assert_approx_eq};

    fn ring_edges(coords: &[(Scalar, Scalar)], subsampling: usize) -> Vec<ScanEdge> {
        let poly = Multipolygon::from_rings([coords.iter().map(|p| Point::from(*p))]);
        ScanEdgeCollection::build(&poly, subsampling).edges().to_vec()
    }

    fn emits(edges: &[ScanEdge]) -> Vec<(Scalar, Scalar, u8, u8)> {
        edges
            .iter()
            .map(|e| (e.y0, e.y1, e.emit_v0(), e.emit_v1()))
            .collect()
    }

    #[test]
    fn test_scan_edge_equation() {
        let edge = ScanEdge::new(Point::new(1.0, 2.0), Point::new(5.0, 10.0), false, 1, 0);
        assert_approx_eq!(edge.x_at(2.0), 1.0);
        assert_approx_eq!(edge.x_at(6.0), 3.0);
        assert_approx_eq!(edge.x_at(10.0), 5.0);

        // large offsets keep their precision thanks to centering
        let edge = ScanEdge::new(
            Point::new(100002.0, 100002.5),
            Point::new(100011.0, 100003.25),
            false,
            0,
            0,
        );
        assert_approx_eq!(edge.x_at(100002.5), 100002.0, 1e-6);
        assert_approx_eq!(edge.x_at(100003.25), 100011.0, 1e-6);
    }

    #[test]
    fn test_triangle_emits() {
        // walk is (0,0) -> (4,4) -> (0,4), down then left then up
        let edges = ring_edges(&[(0.0, 0.0), (4.0, 4.0), (0.0, 4.0)], 1);
        assert_eq!(edges.len(), 2);
        let up = edges.iter().find(|e| e.edge_up()).unwrap();
        let down = edges.iter().find(|e| !e.edge_up()).unwrap();
        assert_eq!((up.y0, up.y1), (0.0, 4.0));
        // Up -> Down apex at (0,0) is emitted once by each edge
        assert_eq!(up.emit_v0(), 1);
        assert_eq!(down.emit_v0(), 1);
        // Down -> Left and Left -> Up emit once each
        assert_eq!(down.emit_v1(), 1);
        assert_eq!(up.emit_v1(), 1);
    }

    #[test]
    fn test_concave_corner_emits_twice() {
        // (4,4) -> (2,2) goes up and is followed by a horizontal edge going left
        let edges = ring_edges(
            &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (2.0, 2.0), (0.0, 2.0)],
            1,
        );
        assert_eq!(edges.len(), 3);
        let diagonal = edges.iter().find(|e| e.x_at(3.0) > 2.5 && e.x_at(3.0) < 3.5);
        let diagonal = diagonal.unwrap();
        assert!(diagonal.edge_up());
        assert_eq!(diagonal.emit_v0(), 2);
        assert_eq!(diagonal.emit_v1(), 1);
    }

    #[test]
    fn test_vertex_table() {
        // diamond without horizontal edges: every vertex is reported twice in total
        let edges = ring_edges(&[(2.0, 0.0), (4.0, 2.0), (2.0, 4.0), (0.0, 2.0)], 1);
        assert_eq!(edges.len(), 4);
        for y in [0.0, 2.0, 4.0] {
            let count: u8 = edges
                .iter()
                .map(|e| {
                    (if e.y0 == y { e.emit_v0() } else { 0 })
                        + (if e.y1 == y { e.emit_v1() } else { 0 })
                })
                .sum();
            assert_eq!(count, 2, "y = {}", y);
        }
    }

    #[test]
    fn test_horizontal_edges_skipped() {
        let edges = ring_edges(&[(0.0, 0.0), (3.0, 0.0), (3.0, 2.0), (0.0, 2.0)], 1);
        assert_eq!(edges.len(), 2);
        for edge in edges.iter() {
            assert!(edge.y0 < edge.y1);
        }
        assert_eq!(emits(&edges), vec![(0.0, 2.0, 1, 1), (0.0, 2.0, 1, 1)]);
    }

    #[test]
    fn test_rounding_creates_horizontal() {
        // 1.1 and 0.9 both round to 1.0 on the unit grid
        let edges = ring_edges(&[(0.0, 0.0), (2.0, 1.1), (4.0, 0.9), (4.0, 3.0)], 1);
        assert!(edges.iter().all(|e| e.y1 > e.y0));
        assert!(edges.iter().all(|e| e.y0.fract() == 0.0 && e.y1.fract() == 0.0));
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn test_degenerate_input() {
        let empty = ScanEdgeCollection::build(&Multipolygon::default(), 4);
        assert!(empty.is_empty());
        assert_eq!(empty.total_vertex_count(), 0);

        // zero height ring does not produce any edges
        let flat = Ring::new(
            [(0.0, 1.0), (5.0, 1.0), (3.0, 1.0)].map(Point::from),
            RingType::Contour,
        )
        .unwrap();
        let poly = Multipolygon::from_rings([flat.vertices().iter().copied()]);
        assert!(ScanEdgeCollection::build(&poly, 1).is_empty());
    }
}
