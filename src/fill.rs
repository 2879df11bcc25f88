//! Rasterization of paths into coverage masks
use crate::{
    FillRule, ImageMut, ImageOwned, Path, PolygonScanner, Scalar, ScanEdgeCollection, Transform,
    utils::clamp,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Lowest number of sub-pixel lines per pixel used by the fill
pub const MINIMUM_SUBPIXEL_COUNT: usize = 8;
/// Default number of sub-pixel lines per pixel with antialiasing
pub const DEFAULT_SUBPIXEL_DEPTH: usize = 16;

/// Options controlling how a path is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FillOptions {
    pub fill_rule: FillRule,
    /// Produce fractional coverage, otherwise pixels are either filled or empty
    pub antialias: bool,
    /// Requested number of sub-pixel lines per pixel
    pub subpixel_depth: usize,
    /// Number of threads scanning disjoint bands of rows
    pub threads: usize,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            fill_rule: FillRule::default(),
            antialias: true,
            subpixel_depth: DEFAULT_SUBPIXEL_DEPTH,
            threads: 1,
        }
    }
}

impl FillOptions {
    pub fn with_fill_rule(self, fill_rule: FillRule) -> Self {
        Self { fill_rule, ..self }
    }

    pub fn with_antialias(self, antialias: bool) -> Self {
        Self { antialias, ..self }
    }

    pub fn with_subpixel_depth(self, subpixel_depth: usize) -> Self {
        Self {
            subpixel_depth,
            ..self
        }
    }

    pub fn with_threads(self, threads: usize) -> Self {
        Self { threads, ..self }
    }

    /// Effective number of sub-pixel lines per pixel
    pub fn subsampling(&self) -> usize {
        if self.antialias {
            self.subpixel_depth.max(MINIMUM_SUBPIXEL_COUNT)
        } else {
            MINIMUM_SUBPIXEL_COUNT
        }
    }

    /// Horizontal shift of pixel boundaries, without antialiasing pixel centers are sampled
    pub fn x_offset(&self) -> Scalar {
        if self.antialias { 0.0 } else { 0.5 }
    }

    /// Convert accumulated coverage into the mask value
    fn mask_value(&self, coverage: Scalar) -> Scalar {
        if self.antialias {
            clamp(coverage, 0.0, 1.0)
        } else if coverage >= 0.5 {
            1.0
        } else {
            0.0
        }
    }
}

/// Pixel rows and columns of the image touched by the path
fn pixel_region(path: &Path, width: usize, height: usize) -> Option<(Range<i32>, Range<i32>)> {
    let bbox = path.bbox().round_out();
    let clip = |min: Scalar, max: Scalar, size: usize| {
        let start = (min.max(0.0) as i64).min(size as i64) as i32;
        let end = (max.min(size as Scalar).max(0.0) as i64) as i32;
        (start < end).then_some(start..end)
    };
    let cols = clip(bbox.min().x(), bbox.max().x(), width)?;
    let rows = clip(bbox.min().y(), bbox.max().y(), height)?;
    Some((rows, cols))
}

/// Add mask values to the image row starting at column `col`
fn write_row<I>(image: &mut I, row: usize, col: usize, values: &[Scalar])
where
    I: ImageMut<Pixel = Scalar>,
{
    let blend = |dst: &mut Scalar, src: Scalar| *dst = (*dst + src).min(1.0);
    match image.row_mut(row) {
        Some(dst) => {
            for (dst, src) in dst[col..col + values.len()].iter_mut().zip(values) {
                blend(dst, *src)
            }
        }
        None => {
            for (index, src) in values.iter().enumerate() {
                if let Some(dst) = image.get_mut(row, col + index) {
                    blend(dst, *src)
                }
            }
        }
    }
}

/// Scan rows of the band, calling `emit` with mask values of each non empty row
fn scan_band(
    edges: &ScanEdgeCollection,
    options: &FillOptions,
    rows: Range<i32>,
    cols: Range<i32>,
    mut emit: impl FnMut(i32, &[Scalar]),
) {
    let _span = tracing::debug_span!("[scan_band]", rows = ?rows).entered();
    let mut scanner = PolygonScanner::with_edges(edges, rows.start, rows.end, options.fill_rule);
    let mut coverage = vec![0.0; cols.len()];
    let min_x = cols.start as Scalar;
    let x_offset = options.x_offset();
    while scanner.move_to_next_pixel_line() {
        coverage.fill(0.0);
        if scanner.fill_row_coverage(&mut coverage, min_x, x_offset) {
            for value in coverage.iter_mut() {
                *value = options.mask_value(*value);
            }
            emit(scanner.pixel_line_y(), &coverage);
        }
    }
}

/// Fill coverage mask of the path into the image
///
/// Only the part of the path inside of the image is rendered. Coverage is
/// added to the existing content and saturates at `1.0`, image is normally
/// expected to contain zeros.
pub fn fill_mask<I>(path: &Path, options: &FillOptions, mut image: I) -> I
where
    I: ImageMut<Pixel = Scalar>,
{
    let Some((rows, cols)) = pixel_region(path, image.width(), image.height()) else {
        return image;
    };
    let _span = tracing::debug_span!(
        "[fill]",
        rows = ?rows,
        cols = ?cols,
        fill_rule = ?options.fill_rule,
        threads = options.threads
    )
    .entered();

    if let Some(rect) = path.try_as_axis_aligned_rect() {
        if rect.is_pixel_aligned() {
            tracing::trace!(?rect, "axis aligned rectangle");
            let values = vec![1.0; cols.len()];
            for row in rows {
                write_row(&mut image, row as usize, cols.start as usize, &values);
            }
            return image;
        }
    }

    let edges = ScanEdgeCollection::from_path(path, options.subsampling());
    let threads = options.threads.clamp(1, rows.len());
    if threads == 1 {
        scan_band(&edges, options, rows, cols.clone(), |row, values| {
            write_row(&mut image, row as usize, cols.start as usize, values)
        });
        return image;
    }

    // contiguous bands of rows, each scanned into its own buffer
    let band_height = rows.len().div_ceil(threads) as i32;
    let bands: Vec<Range<i32>> = (rows.start..rows.end)
        .step_by(band_height as usize)
        .map(|start| start..(start + band_height).min(rows.end))
        .collect();
    let width = cols.len();
    std::thread::scope(|scope| {
        let handles: Vec<_> = bands
            .into_iter()
            .map(|band| {
                let edges = &edges;
                let cols = cols.clone();
                scope.spawn(move || {
                    let mut local = ImageOwned::new_default(band.len(), width);
                    scan_band(edges, options, band.clone(), cols, |row, values| {
                        write_row(&mut local, (row - band.start) as usize, 0, values)
                    });
                    (band, local)
                })
            })
            .collect();
        for handle in handles {
            let (band, local) = match handle.join() {
                Ok(result) => result,
                Err(payload) => std::panic::resume_unwind(payload),
            };
            let local = local.to_vec();
            for (index, values) in local.chunks(width.max(1)).enumerate() {
                let row = band.start as usize + index;
                write_row(&mut image, row, cols.start as usize, values);
            }
        }
    });
    image
}

impl Path {
    /// Allocate image covering bounding box of the path and fill its mask
    ///
    /// Path is shifted so the top-left corner of its pixel bounds becomes the origin.
    pub fn mask(&self, options: &FillOptions) -> ImageOwned<Scalar> {
        if self.is_empty() {
            return ImageOwned::new_default(0, 0);
        }
        let bbox = self.bbox().round_out();
        let width = bbox.width() as usize;
        let height = bbox.height() as usize;
        let mut path = self.clone();
        path.transform(Transform::new_translate(-bbox.x(), -bbox.y()));
        fill_mask(&path, options, ImageOwned::new_default(height, width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Image, assert_approx_eq, utils::tests::assert_slice_approx_eq};

    fn row_values(image: &ImageOwned<Scalar>, row: usize) -> Vec<Scalar> {
        (0..image.width())
            .map(|col| *image.get(row, col).unwrap())
            .collect()
    }

    #[test]
    fn test_subsampling() {
        let options = FillOptions::default();
        assert_eq!(options.subsampling(), DEFAULT_SUBPIXEL_DEPTH);
        assert_eq!(options.x_offset(), 0.0);
        assert_eq!(options.with_subpixel_depth(2).subsampling(), MINIMUM_SUBPIXEL_COUNT);
        let aliased = options.with_antialias(false).with_subpixel_depth(64);
        assert_eq!(aliased.subsampling(), MINIMUM_SUBPIXEL_COUNT);
        assert_eq!(aliased.x_offset(), 0.5);
    }

    #[test]
    fn test_fill_aligned_rect() {
        let path = Path::builder()
            .move_to((1.0, 1.0))
            .rect((2.0, 3.0))
            .build();
        assert!(path.try_as_axis_aligned_rect().is_some());
        let image = fill_mask(&path, &FillOptions::default(), ImageOwned::new_default(5, 5));
        for row in 0..5 {
            for col in 0..5 {
                let expected = if (1..4).contains(&row) && (1..3).contains(&col) {
                    1.0
                } else {
                    0.0
                };
                assert_eq!(*image.get(row, col).unwrap(), expected, "{} {}", row, col);
            }
        }
    }

    #[test]
    fn test_fill_partial_coverage() {
        let path = Path::builder()
            .move_to((1.2, 0.0))
            .rect((2.4, 2.0))
            .build();
        let image = fill_mask(&path, &FillOptions::default(), ImageOwned::new_default(3, 5));
        for row in 0..2 {
            assert_slice_approx_eq(&row_values(&image, row), &[0.0, 0.8, 1.0, 0.6, 0.0], 1e-9);
        }
        assert_slice_approx_eq(&row_values(&image, 2), &[0.0; 5], 1e-9);

        let options = FillOptions::default().with_antialias(false);
        let image = fill_mask(&path, &options, ImageOwned::new_default(3, 5));
        for row in 0..2 {
            assert_eq!(row_values(&image, row), [0.0, 1.0, 1.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn test_fill_aliased_adjacent_spans() {
        // span ending past the pixel center must not cancel coverage of the next span
        let path = Path::builder()
            .polygon([(0.0, 0.0), (2.5, 0.0), (2.5, 2.0), (0.0, 2.0)])
            .polygon([(3.49, 0.0), (6.0, 0.0), (6.0, 2.0), (3.49, 2.0)])
            .build();
        let options = FillOptions::default().with_antialias(false);
        let image = fill_mask(&path, &options, ImageOwned::new_default(2, 6));
        assert_eq!(row_values(&image, 1), [1.0; 6]);
    }

    #[test]
    fn test_fill_clipped() {
        let path = Path::builder()
            .polygon([(-5.0, -5.0), (2.5, -5.0), (2.5, 1.5), (-5.0, 1.5)])
            .build();
        let image = fill_mask(&path, &FillOptions::default(), ImageOwned::new_default(3, 3));
        assert_slice_approx_eq(&row_values(&image, 0), &[1.0, 1.0, 0.5], 1e-9);
        assert_slice_approx_eq(&row_values(&image, 1), &[0.5625, 0.5625, 0.28125], 1e-9);
        assert_slice_approx_eq(&row_values(&image, 2), &[0.0, 0.0, 0.0], 1e-9);

        // completely outside
        let path = Path::builder()
            .polygon([(10.0, 10.0), (12.0, 10.0), (11.0, 12.0)])
            .build();
        let image = fill_mask(&path, &FillOptions::default(), ImageOwned::new_default(3, 3));
        assert!(image.iter().all(|value| *value == 0.0));
    }

    #[test]
    fn test_fill_rule() {
        let star: Path = "M50,0 21,90 98,35 2,35 79,90z".parse().unwrap();
        let image = fill_mask(&star, &FillOptions::default(), ImageOwned::new_default(100, 100));
        assert_approx_eq!(*image.get(50, 50).unwrap(), 0.0);
        assert_approx_eq!(*image.get(20, 50).unwrap(), 1.0);

        let options = FillOptions::default().with_fill_rule(FillRule::NonZero);
        let image = fill_mask(&star, &options, ImageOwned::new_default(100, 100));
        assert_approx_eq!(*image.get(50, 50).unwrap(), 1.0);
        assert_approx_eq!(*image.get(20, 50).unwrap(), 1.0);
    }

    #[test]
    fn test_fill_threads() {
        let star: Path = "M50,0 21,90 98,35 2,35 79,90z".parse().unwrap();
        for fill_rule in [FillRule::EvenOdd, FillRule::NonZero] {
            let options = FillOptions::default().with_fill_rule(fill_rule);
            let single = fill_mask(&star, &options, ImageOwned::new_default(100, 100));
            for threads in [2, 3, 7, 200] {
                let multi = fill_mask(
                    &star,
                    &options.with_threads(threads),
                    ImageOwned::new_default(100, 100),
                );
                assert_eq!(single.data(), multi.data(), "threads = {}", threads);
            }
        }
    }

    #[test]
    fn test_path_mask() {
        let path = Path::builder()
            .polygon([(10.0, 20.0), (18.0, 20.0), (10.0, 28.0)])
            .build();
        let mask = path.mask(&FillOptions::default());
        assert_eq!(mask.width(), 8);
        assert_eq!(mask.height(), 8);
        let area: Scalar = mask.iter().sum();
        assert!((area - 32.0).abs() < 1.0, "area = {}", area);
        assert!(mask.iter().all(|value| (0.0..=1.0).contains(value)));

        let empty = Path::empty().mask(&FillOptions::default());
        assert_eq!(empty.width(), 0);
        assert_eq!(empty.height(), 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_options_serde() -> Result<(), Box<dyn std::error::Error>> {
        let options: FillOptions = serde_json::from_str(r#"{"fill_rule": "nonzero", "threads": 4}"#)?;
        assert_eq!(options.fill_rule, FillRule::NonZero);
        assert_eq!(options.threads, 4);
        assert!(options.antialias);
        assert_eq!(options.subpixel_depth, DEFAULT_SUBPIXEL_DEPTH);

        let json = serde_json::to_string(&options)?;
        let restored: FillOptions = serde_json::from_str(&json)?;
        assert_eq!(restored, options);
        Ok(())
    }
}
