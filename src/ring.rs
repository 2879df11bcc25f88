//! Closed vertex rings with normalized orientation
use crate::{BBox, Path, Point, Scalar};

/// Tolerance used to decide the sign of a ring area
const ORIENTATION_EPSILON: Scalar = 1e-5;

/// Role of the ring inside of a multipolygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RingType {
    /// Outer boundary, oriented positively
    Contour,
    /// Hole, oriented negatively
    Hole,
}

/// Closed polyline, the first vertex is repeated at the end
#[derive(Clone, PartialEq)]
pub struct Ring {
    vertices: Vec<Point>,
    ring_type: RingType,
}

impl std::fmt::Debug for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ring")
            .field("type", &self.ring_type)
            .field("vertices", &self.vertices)
            .finish()
    }
}

impl Ring {
    /// Create ring from the polyline
    ///
    /// Consecutive duplicated vertices and trailing vertices equal to the first
    /// one are dropped. Returns `None` if fewer than three vertices remain.
    pub fn new(points: impl IntoIterator<Item = Point>, ring_type: RingType) -> Option<Self> {
        let mut vertices: Vec<Point> = Vec::new();
        for point in points {
            if vertices.last().is_some_and(|last| last.is_close_to(point)) {
                continue;
            }
            vertices.push(point);
        }
        while vertices.len() > 1
            && vertices
                .last()
                .is_some_and(|last| last.is_close_to(vertices[0]))
        {
            vertices.pop();
        }
        if vertices.len() < 3 {
            tracing::trace!(vertex_count = vertices.len(), "dropping degenerate ring");
            return None;
        }
        vertices.push(vertices[0]);

        let expected = match ring_type {
            RingType::Contour => 1,
            RingType::Hole => -1,
        };
        if orientation(&vertices) * expected < 0 {
            vertices.reverse();
        }
        Some(Self {
            vertices,
            ring_type,
        })
    }

    /// Vertices of the ring including repeated first vertex
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Number of distinct vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() - 1
    }

    pub fn ring_type(&self) -> RingType {
        self.ring_type
    }

    /// Signed area of the ring, positive for contours
    pub fn signed_area(&self) -> Scalar {
        signed_area(&self.vertices)
    }
}

/// Ordered collection of rings, first ring is the contour the rest are holes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multipolygon {
    rings: Vec<Ring>,
    total_vertex_count: usize,
}

impl Multipolygon {
    /// Build multipolygon from all sub-paths of the path
    ///
    /// Sub-paths are always treated as closed.
    pub fn from_path(path: &Path) -> Self {
        Self::from_rings(
            path.subpaths()
                .iter()
                .map(|subpath| subpath.points().iter().copied()),
        )
    }

    /// Build multipolygon from the sequence of polylines
    pub fn from_rings<R>(rings: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = Point>,
    {
        let mut result = Self::default();
        for points in rings {
            let ring_type = if result.rings.is_empty() {
                RingType::Contour
            } else {
                RingType::Hole
            };
            if let Some(ring) = Ring::new(points, ring_type) {
                result.total_vertex_count += ring.vertex_count();
                result.rings.push(ring);
            }
        }
        result
    }

    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Sum of vertex counts of all rings excluding repeated vertices
    pub fn total_vertex_count(&self) -> usize {
        self.total_vertex_count
    }

    /// Bounding box of all rings, degenerate box at the origin if empty
    pub fn bbox(&self) -> BBox {
        let mut points = self.rings.iter().flat_map(|ring| ring.vertices().iter());
        match points.next() {
            None => BBox::default(),
            Some(first) => points.fold(BBox::new(*first, *first), |bbox, p| bbox.extend(*p)),
        }
    }
}

impl<'a> IntoIterator for &'a Multipolygon {
    type Item = &'a Ring;
    type IntoIter = std::slice::Iter<'a, Ring>;

    fn into_iter(self) -> Self::IntoIter {
        self.rings.iter()
    }
}

/// Signed area of the closed polyline with repeated first vertex
pub fn signed_area(points: &[Point]) -> Scalar {
    points
        .windows(2)
        .map(|pair| pair[0].cross(pair[1]))
        .sum::<Scalar>()
        / 2.0
}

/// Orientation of the closed polyline: `1` positive, `-1` negative, `0` degenerate
fn orientation(points: &[Point]) -> i32 {
    let area = signed_area(points);
    if area > ORIENTATION_EPSILON {
        1
    } else if area < -ORIENTATION_EPSILON {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;

    fn points(coords: &[(Scalar, Scalar)]) -> Vec<Point> {
        coords.iter().map(|p| Point::from(*p)).collect()
    }

    #[test]
    fn test_ring_orientation() {
        // negative in screen space
        let square = points(&[(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)]);

        let contour = Ring::new(square.clone(), RingType::Contour).unwrap();
        assert_eq!(contour.vertex_count(), 4);
        assert_eq!(contour.vertices().len(), 5);
        assert_eq!(contour.vertices()[0], contour.vertices()[4]);
        assert_approx_eq!(contour.signed_area(), 4.0);

        let hole = Ring::new(square, RingType::Hole).unwrap();
        assert_approx_eq!(hole.signed_area(), -4.0);
        assert_eq!(hole.vertices()[0], Point::new(0.0, 0.0));
        assert_eq!(hole.vertices()[1], Point::new(0.0, 2.0));
    }

    #[test]
    fn test_ring_cleanup() {
        let ring = Ring::new(
            points(&[
                (0.0, 0.0),
                (3.0, 0.0),
                (3.0, 0.0),
                (3.0, 3.0),
                (0.0, 0.0),
                (0.0, 0.0),
            ]),
            RingType::Contour,
        )
        .unwrap();
        assert_eq!(ring.vertex_count(), 3);

        assert!(Ring::new(points(&[(0.0, 0.0), (1.0, 1.0)]), RingType::Contour).is_none());
        assert!(Ring::new(points(&[(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]), RingType::Hole).is_none());
    }

    #[test]
    fn test_zero_area_ring_kept_as_is() {
        let line = points(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let ring = Ring::new(line.clone(), RingType::Hole).unwrap();
        assert_eq!(&ring.vertices()[..3], line.as_slice());
    }

    #[test]
    fn test_multipolygon() {
        let path = Path::builder()
            .polygon([(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
            .polygon([(2.0, 2.0), (4.0, 2.0), (4.0, 4.0)])
            .move_to((20.0, 20.0))
            .line_to((21.0, 21.0))
            .close()
            .polygon([(5.0, 5.0), (5.0, 8.0), (8.0, 8.0)])
            .build();
        let poly = Multipolygon::from_path(&path);
        assert_eq!(poly.len(), 3);
        assert_eq!(poly.total_vertex_count(), 10);

        let types: Vec<_> = poly.rings().iter().map(|r| r.ring_type()).collect();
        assert_eq!(types, [RingType::Contour, RingType::Hole, RingType::Hole]);
        assert!(poly.rings()[0].signed_area() > 0.0);
        assert!(poly.rings()[1].signed_area() < 0.0);
        assert!(poly.rings()[2].signed_area() < 0.0);
        assert_eq!(poly.bbox(), BBox::new((0.0, 0.0), (10.0, 10.0)));
    }

    #[test]
    fn test_empty_multipolygon() {
        let poly = Multipolygon::from_path(&Path::empty());
        assert!(poly.is_empty());
        assert_eq!(poly.total_vertex_count(), 0);
        assert_eq!(poly.bbox(), BBox::default());
    }
}
