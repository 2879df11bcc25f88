//! Conversion of crossing lists into per-pixel coverage
use crate::Scalar;

/// Accumulate coverage of a single sub-pixel scanline into the coverage row
///
/// `crossings` are paired into spans `[start, end)`, `min_x` is the horizontal
/// coordinate of the first element of `row`. Each sub-scanline contributes
/// `distance` to every fully covered pixel, partially covered pixels receive
/// a fraction of it proportional to the covered part. `x_offset` shifts pixel
/// boundaries, `0.5` is used to sample pixel centers without antialiasing.
/// Contributions are never negative, and a span starting and ending inside of
/// the same pixel contributes its own length only.
///
/// Returns `true` if anything was written into the row.
pub fn accumulate_subpixel_line(
    crossings: &[Scalar],
    min_x: Scalar,
    x_offset: Scalar,
    distance: Scalar,
    area: Scalar,
    row: &mut [Scalar],
) -> bool {
    let width = row.len() as isize;
    let mut dirty = false;
    let add_partial = |x: isize, covered: Scalar, row: &mut [Scalar]| {
        if covered > 0.0 && (0..width).contains(&x) {
            row[x as usize] += covered / distance * area;
            true
        } else {
            false
        }
    };
    for span in crossings.chunks_exact(2) {
        let start = span[0] - min_x;
        let end = span[1] - min_x;
        let start_x = (start + x_offset).floor() as isize;
        let end_x = (end + x_offset).floor() as isize;

        if start_x == end_x {
            dirty |= add_partial(start_x, end - start, row);
            continue;
        }
        dirty |= add_partial(start_x, start_x as Scalar + 1.0 - start, row);
        dirty |= add_partial(end_x, end - end_x as Scalar, row);

        let first = (start_x + 1).max(0);
        let last = end_x.min(width);
        if first < last {
            for value in &mut row[first as usize..last as usize] {
                *value += distance;
            }
            dirty = true;
        }
    }
    dirty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::tests::assert_slice_approx_eq;

    #[test]
    fn test_full_pixels() {
        let mut row = [0.0; 6];
        let dirty = accumulate_subpixel_line(&[1.0, 4.0], 0.0, 0.0, 0.25, 0.0625, &mut row);
        assert!(dirty);
        // start pixel receives a full sub-line, end pixel is not covered
        assert_slice_approx_eq(&row, &[0.0, 0.25, 0.25, 0.25, 0.0, 0.0], 1e-9);
    }

    #[test]
    fn test_partial_pixels() {
        let mut row = [0.0; 4];
        accumulate_subpixel_line(&[0.5, 2.25], 0.0, 0.0, 0.5, 0.25, &mut row);
        assert_slice_approx_eq(&row, &[0.25, 0.5, 0.125, 0.0], 1e-9);

        // span inside of a single pixel
        let mut row = [0.0; 2];
        accumulate_subpixel_line(&[0.25, 0.75], 0.0, 0.0, 1.0, 1.0, &mut row);
        assert_slice_approx_eq(&row, &[0.5, 0.0], 1e-9);

        let mut row = [0.0; 2];
        accumulate_subpixel_line(&[0.25, 0.5, 0.75, 0.875], 0.0, 0.0, 1.0, 1.0, &mut row);
        assert_slice_approx_eq(&row, &[0.375, 0.0], 1e-9);
    }

    #[test]
    fn test_min_x_and_clipping() {
        let mut row = [0.0; 3];
        let dirty = accumulate_subpixel_line(&[8.0, 20.0], 10.0, 0.0, 1.0, 1.0, &mut row);
        assert!(dirty);
        assert_slice_approx_eq(&row, &[1.0, 1.0, 1.0], 1e-9);

        let mut row = [0.0; 3];
        let dirty = accumulate_subpixel_line(&[20.0, 30.0], 10.0, 0.0, 1.0, 1.0, &mut row);
        assert!(!dirty);
        assert!(!accumulate_subpixel_line(&[], 0.0, 0.0, 1.0, 1.0, &mut row));
    }

    #[test]
    fn test_pixel_center_offset() {
        // without antialiasing a pixel is covered if its center is inside of the span
        let mut row = [0.0; 5];
        accumulate_subpixel_line(&[0.6, 3.4], 0.0, 0.5, 1.0, 1.0, &mut row);
        assert!(row[0] < 0.5);
        assert!(row[1] >= 0.5 && row[2] >= 0.5);
        assert!(row[3] < 0.5);
        assert!(row[4] < 0.5);
    }

    #[test]
    fn test_span_end_past_pixel_center() {
        let mut row = [0.0; 6];
        let dirty = accumulate_subpixel_line(&[0.2, 3.6], 0.0, 0.5, 1.0, 1.0, &mut row);
        assert!(dirty);
        assert_slice_approx_eq(&row, &[0.8, 1.0, 1.0, 1.0, 0.0, 0.0], 1e-9);
        assert!(row.iter().all(|value| *value >= 0.0));

        // abutting spans must not cancel each other
        let mut row = [0.0; 6];
        accumulate_subpixel_line(&[0.0, 2.5, 3.49, 6.0], 0.0, 0.5, 1.0, 1.0, &mut row);
        assert_slice_approx_eq(&row, &[1.0, 1.0, 1.0, 0.51, 1.0, 1.0], 1e-9);
        assert!(row[3] >= 0.5);
    }
}
