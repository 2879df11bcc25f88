use crate::{BBox, EPSILON, Point, SvgParserError, SvgPathCmd, SvgPathParser, Transform};
use std::{
    fmt,
    io::{Cursor, Read, Write},
    str::FromStr,
};

/// Polyline that forms one ring of the shape
///
/// When filled every sub-path is treated as closed, `closed` only affects
/// how the sub-path is written back as SVG.
#[derive(Clone, PartialEq)]
pub struct SubPath {
    /// Vertices of the sub-path, never empty
    points: Vec<Point>,
    /// Whether SubPath contains an implicit line segment connecting start and the end of it.
    closed: bool,
}

impl fmt::Debug for SubPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for point in self.points.iter() {
            writeln!(f, "{:?}", point)?;
        }
        if self.closed {
            writeln!(f, "Close")?;
        } else {
            writeln!(f, "End")?
        }
        Ok(())
    }
}

impl SubPath {
    pub fn new(points: Vec<Point>, closed: bool) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points, closed })
        }
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Apply transformation to the sub-path in place
    pub fn transform(&mut self, tr: Transform) {
        for point in self.points.iter_mut() {
            *point = tr.apply(*point);
        }
    }

    pub fn bbox(&self, init: Option<BBox>) -> BBox {
        let init = init.unwrap_or_else(|| BBox::new(self.start(), self.start()));
        self.points.iter().fold(init, |bbox, p| bbox.extend(*p))
    }

    pub fn reverse(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
            closed: self.closed,
        }
    }
}

/// Rule that decides which regions of a self-overlapping shape are inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FillRule {
    /// Inside when the winding number is not zero
    NonZero,
    /// Inside when a ray crosses the boundary an odd number of times
    #[default]
    EvenOdd,
}

impl FromStr for FillRule {
    type Err = SvgParserError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "nonzero" => Ok(FillRule::NonZero),
            "evenodd" => Ok(FillRule::EvenOdd),
            _ => Err(SvgParserError::InvalidFillRule),
        }
    }
}

impl fmt::Display for FillRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillRule::NonZero => write!(f, "nonzero"),
            FillRule::EvenOdd => write!(f, "evenodd"),
        }
    }
}

/// Collection of the SubPath treated as a single unit
#[derive(Clone, PartialEq, Default)]
pub struct Path {
    subpaths: Vec<SubPath>,
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subpaths.is_empty() {
            write!(f, "Empty")?;
        } else {
            for subpath in self.subpaths.iter() {
                subpath.fmt(f)?
            }
        }
        Ok(())
    }
}

impl Path {
    /// Create path from the list of subpaths
    pub fn new(subpaths: Vec<SubPath>) -> Self {
        Self { subpaths }
    }

    pub fn empty() -> Self {
        Self {
            subpaths: Default::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    /// Convenience method to create `PathBuilder`
    pub fn builder() -> PathBuilder {
        PathBuilder::new()
    }

    /// Apply transformation to the path in place
    pub fn transform(&mut self, tr: Transform) {
        for subpath in self.subpaths.iter_mut() {
            subpath.transform(tr);
        }
    }

    /// Number of vertices across all sub-paths
    pub fn points_count(&self) -> usize {
        self.subpaths
            .iter()
            .fold(0usize, |acc, subpath| acc + subpath.points().len())
    }

    /// Bounding box of the path
    ///
    /// Empty path has a degenerate bounding box at the origin.
    pub fn bbox(&self) -> BBox {
        self.subpaths
            .iter()
            .fold(None, |bbox, subpath| Some(subpath.bbox(bbox)))
            .unwrap_or_default()
    }

    /// Reverse order and direction of all sub-paths
    pub fn reverse(&self) -> Self {
        Self {
            subpaths: self.subpaths.iter().rev().map(|s| s.reverse()).collect(),
        }
    }

    /// Bounding box of the path if it is a single axis aligned rectangle
    pub fn try_as_axis_aligned_rect(&self) -> Option<BBox> {
        let [subpath] = self.subpaths.as_slice() else {
            return None;
        };
        let points = match subpath.points() {
            [first, rest @ ..] if rest.last().is_some_and(|last| last.is_close_to(*first)) => {
                &subpath.points()[..subpath.points().len() - 1]
            }
            points => points,
        };
        let [p0, p1, p2, p3] = points else {
            return None;
        };
        let aligned = |a: Point, b: Point| {
            (a.x() - b.x()).abs() < EPSILON || (a.y() - b.y()).abs() < EPSILON
        };
        let sides = [(*p0, *p1), (*p1, *p2), (*p2, *p3), (*p3, *p0)];
        if !sides.iter().all(|(a, b)| aligned(*a, *b)) {
            return None;
        }
        // sides must alternate between horizontal and vertical
        let horizontal = |a: Point, b: Point| (a.y() - b.y()).abs() < EPSILON;
        if horizontal(*p0, *p1) == horizontal(*p1, *p2)
            || horizontal(*p1, *p2) == horizontal(*p2, *p3)
        {
            return None;
        }
        let bbox = BBox::new(*p0, *p2);
        if bbox.width() < EPSILON || bbox.height() < EPSILON {
            return None;
        }
        Some(bbox)
    }

    /// Save path in SVG path format.
    pub fn write_svg_path(&self, mut out: impl Write) -> std::io::Result<()> {
        for subpath in self.subpaths.iter() {
            write!(&mut out, "M{:?} ", subpath.start())?;
            if subpath.points().len() > 1 {
                out.write_all(b"L")?;
                for point in subpath.points()[1..].iter() {
                    write!(&mut out, "{:?} ", point)?;
                }
            }
            if subpath.closed() {
                out.write_all(b"Z")?;
            }
        }
        Ok(())
    }

    /// Convert path to SVG path representation
    pub fn to_svg_path(&self) -> String {
        let mut output = Vec::new();
        // writes into a vector never fail and `Point` formats as ASCII
        let _ = self.write_svg_path(&mut output);
        String::from_utf8_lossy(&output).into_owned()
    }

    /// Load path from SVG path representation
    pub fn read_svg_path(input: impl Read) -> std::io::Result<Self> {
        let mut builder = PathBuilder::new();
        for cmd in SvgPathParser::new(input) {
            cmd?.apply(&mut builder);
        }
        Ok(builder.build())
    }
}

impl IntoIterator for Path {
    type Item = SubPath;
    type IntoIter = <Vec<SubPath> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.subpaths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a SubPath;
    type IntoIter = <&'a Vec<SubPath> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.subpaths.iter()
    }
}

impl Extend<SubPath> for Path {
    fn extend<T: IntoIterator<Item = SubPath>>(&mut self, iter: T) {
        self.subpaths.extend(iter)
    }
}

impl FromStr for Path {
    type Err = SvgParserError;

    fn from_str(text: &str) -> Result<Path, Self::Err> {
        let mut builder = PathBuilder::new();
        for cmd in SvgPathParser::new(Cursor::new(text)) {
            cmd?.apply(&mut builder);
        }
        Ok(builder.build())
    }
}

/// Path builder similar to Canvas/Cairo interface.
#[derive(Clone)]
pub struct PathBuilder {
    position: Point,
    subpath: Vec<Point>,
    subpaths: Vec<SubPath>,
}

impl Default for PathBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PathBuilder {
    pub fn new() -> Self {
        Self {
            position: Point::new(0.0, 0.0),
            subpath: Default::default(),
            subpaths: Default::default(),
        }
    }

    /// Build path
    pub fn build(&mut self) -> Path {
        let PathBuilder {
            subpath,
            mut subpaths,
            ..
        } = std::mem::take(self);
        subpaths.extend(SubPath::new(subpath, false));
        Path::new(subpaths)
    }

    /// Extend path from string, which is specified in the same format as SVGs path element.
    pub fn append_svg_path(&mut self, string: impl AsRef<[u8]>) -> Result<&mut Self, SvgParserError> {
        for cmd in SvgPathParser::new(Cursor::new(string)) {
            cmd?.apply(self);
        }
        Ok(self)
    }

    /// Move current position, ending current subpath
    pub fn move_to(&mut self, p: impl Into<Point>) -> &mut Self {
        let subpath = std::mem::take(&mut self.subpath);
        self.subpaths.extend(SubPath::new(subpath, false));
        self.position = p.into();
        self
    }

    /// Close current subpath
    pub fn close(&mut self) -> &mut Self {
        let subpath = std::mem::take(&mut self.subpath);
        if let Some(start) = subpath.first() {
            self.position = *start;
        }
        self.subpaths.extend(SubPath::new(subpath, true));
        self
    }

    /// Add line from the current position to the specified point
    pub fn line_to(&mut self, p: impl Into<Point>) -> &mut Self {
        let p = p.into();
        if self.subpath.is_empty() {
            self.subpath.push(self.position);
        }
        if !self.position.is_close_to(p) {
            self.position = p;
            self.subpath.push(p);
        }
        self
    }

    /// Add closed polygon passing through all `points`
    pub fn polygon<P: Into<Point>>(&mut self, points: impl IntoIterator<Item = P>) -> &mut Self {
        let mut points = points.into_iter();
        if let Some(first) = points.next() {
            self.move_to(first);
            for point in points {
                self.line_to(point);
            }
            self.close();
        }
        self
    }

    /// Add axis aligned rectangle with top-left corner at the current position
    pub fn rect(&mut self, size: impl Into<Point>) -> &mut Self {
        let Point([w, h]) = size.into();
        let Point([x, y]) = self.position;
        self.polygon([(x, y), (x + w, y), (x + w, y + h), (x, y + h)])
    }

    /// Current possition of the builder
    pub fn position(&self) -> Point {
        self.position
    }
}

impl SvgPathCmd {
    /// Apply SVG command to path builder
    pub fn apply(&self, builder: &mut PathBuilder) {
        use SvgPathCmd::*;
        match self {
            MoveTo(p) => builder.move_to(p),
            LineTo(p) => builder.line_to(p),
            Close(_) => builder.close(),
        };
    }
}
