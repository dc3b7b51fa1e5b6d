//! Nearest qualifying pixel search.
//!
//! Heatmap tiles are mostly transparent, and a probe point rarely lands
//! exactly on a rendered cell, so the search grows square rings around the
//! query point until it finds a pixel that is opaque enough and not pure
//! black. Distance is Chebyshev (ring index), not Euclidean: the first hit in
//! the smallest ring wins, ties broken by scan order.
//!
//! An exhaustive Euclidean search over every opaque pixel would be more
//! accurate at large radii but costs O(tile pixels) per miss, so it is not
//! offered here.

use crate::raster::Raster;

/// Default maximum ring radius.
pub const DEFAULT_SEARCH_RADIUS: u32 = 15;

/// A pixel qualifies if its alpha reaches the threshold and it has color.
#[inline(always)]
fn qualifies(raster: &Raster, idx: usize, alpha_threshold: u8) -> bool {
    let [r, g, b, a] = raster.rgba_at(idx);
    a >= alpha_threshold && (r != 0 || g != 0 || b != 0)
}

/// Find the nearest qualifying pixel to (ox, oy) within `max_radius` rings.
///
/// Returns the pixel's byte offset in the raster. (ox, oy) must lie inside
/// the raster; wrap global coordinates with [`Raster::wrap`] first.
pub fn locate(
    raster: &Raster,
    ox: u32,
    oy: u32,
    max_radius: u32,
    alpha_threshold: u8,
) -> Option<usize> {
    if ox >= raster.width() || oy >= raster.height() {
        return None;
    }

    let direct = raster.index_of(ox, oy);
    if qualifies(raster, direct, alpha_threshold) {
        return Some(direct);
    }

    if max_radius == 0 {
        return None;
    }

    if let Some(idx) = scan_square(raster, ox, oy, 1, alpha_threshold) {
        return Some(idx);
    }

    (2..=max_radius).find_map(|k| scan_ring(raster, ox, oy, k, alpha_threshold))
}

/// Clamped bounds of the square of radius `r` around (ox, oy).
fn bounds(raster: &Raster, ox: u32, oy: u32, r: u32) -> (u32, u32, u32, u32) {
    let x0 = ox.saturating_sub(r);
    let y0 = oy.saturating_sub(r);
    let x1 = ox.saturating_add(r).min(raster.width() - 1);
    let y1 = oy.saturating_add(r).min(raster.height() - 1);
    (x0, y0, x1, y1)
}

/// Row-major scan of the whole square of radius `r`.
fn scan_square(raster: &Raster, ox: u32, oy: u32, r: u32, alpha_threshold: u8) -> Option<usize> {
    let (x0, y0, x1, y1) = bounds(raster, ox, oy, r);
    (y0..=y1).find_map(|y| scan_row(raster, y, x0, x1, alpha_threshold))
}

fn scan_row(raster: &Raster, y: u32, x0: u32, x1: u32, alpha_threshold: u8) -> Option<usize> {
    (x0..=x1)
        .map(|x| raster.index_of(x, y))
        .find(|&idx| qualifies(raster, idx, alpha_threshold))
}

/// Scan only the boundary of the square of radius `k`.
///
/// Top and bottom rows go first since they are contiguous in memory; the
/// left and right columns are walked row by row only if both rows miss.
fn scan_ring(raster: &Raster, ox: u32, oy: u32, k: u32, alpha_threshold: u8) -> Option<usize> {
    let (x0, y0, x1, y1) = bounds(raster, ox, oy, k);

    if let Some(idx) = scan_row(raster, y0, x0, x1, alpha_threshold) {
        return Some(idx);
    }
    if y1 != y0 {
        if let Some(idx) = scan_row(raster, y1, x0, x1, alpha_threshold) {
            return Some(idx);
        }
    }

    ((y0 + 1)..y1).find_map(|y| {
        [x0, x1]
            .into_iter()
            .map(|x| raster.index_of(x, y))
            .find(|&idx| qualifies(raster, idx, alpha_threshold))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::TileCoord;

    fn blank(w: u32, h: u32) -> Raster {
        Raster::from_rgba(w, h, vec![0; (w * h * 4) as usize], TileCoord::default()).unwrap()
    }

    fn with_pixels(w: u32, h: u32, pixels: &[(u32, u32, [u8; 4])]) -> Raster {
        let mut data = vec![0u8; (w * h * 4) as usize];
        for &(x, y, rgba) in pixels {
            let i = ((y * w + x) * 4) as usize;
            data[i..i + 4].copy_from_slice(&rgba);
        }
        Raster::from_rgba(w, h, data, TileCoord::default()).unwrap()
    }

    #[test]
    fn test_direct_hit() {
        let r = with_pixels(4, 4, &[(2, 2, [10, 0, 0, 255])]);
        assert_eq!(locate(&r, 2, 2, 15, 255), Some(r.index_of(2, 2)));
    }

    #[test]
    fn test_blank_tile_finds_nothing() {
        let r = blank(32, 32);
        assert_eq!(locate(&r, 16, 16, 15, 1), None);
    }

    #[test]
    fn test_black_opaque_pixel_is_background() {
        let r = with_pixels(4, 4, &[(1, 1, [0, 0, 0, 255])]);
        assert_eq!(locate(&r, 1, 1, 3, 1), None);
    }

    #[test]
    fn test_alpha_threshold_is_inclusive() {
        let r = with_pixels(4, 4, &[(1, 1, [5, 5, 5, 254])]);
        assert_eq!(locate(&r, 1, 1, 0, 255), None);
        assert_eq!(locate(&r, 1, 1, 0, 254), Some(r.index_of(1, 1)));
    }

    #[test]
    fn test_neighborhood_is_row_major() {
        let r = with_pixels(
            5,
            5,
            &[(3, 3, [1, 1, 1, 255]), (1, 2, [2, 2, 2, 255]), (3, 1, [3, 3, 3, 255])],
        );
        assert_eq!(locate(&r, 2, 2, 1, 255), Some(r.index_of(3, 1)));
    }

    #[test]
    fn test_ring_prefers_rows_over_columns() {
        // Column pixel at (5, 4) and bottom row pixel at (4, 6); both on ring 2 of (3, 4).
        let r = with_pixels(8, 8, &[(5, 4, [1, 1, 1, 255]), (4, 6, [2, 2, 2, 255])]);
        assert_eq!(locate(&r, 3, 4, 5, 255), Some(r.index_of(4, 6)));
    }

    #[test]
    fn test_column_scan_checks_left_before_right() {
        let r = with_pixels(9, 9, &[(6, 4, [1, 1, 1, 255]), (2, 4, [2, 2, 2, 255])]);
        assert_eq!(locate(&r, 4, 4, 2, 255), Some(r.index_of(2, 4)));
    }

    #[test]
    fn test_smaller_ring_wins() {
        let r = with_pixels(16, 16, &[(8, 2, [1, 1, 1, 255]), (11, 8, [2, 2, 2, 255])]);
        // (11, 8) is on ring 3, (8, 2) on ring 6.
        assert_eq!(locate(&r, 8, 8, 10, 255), Some(r.index_of(11, 8)));
    }

    #[test]
    fn test_radius_limit() {
        let r = with_pixels(32, 32, &[(10, 26, [1, 1, 1, 255])]);
        assert_eq!(locate(&r, 10, 10, 15, 255), None);
        assert_eq!(locate(&r, 10, 10, 16, 255), Some(r.index_of(10, 26)));
    }

    #[test]
    fn test_rings_clamped_at_edges() {
        // Query in the corner: only the clamped part of each ring exists.
        let r = with_pixels(16, 16, &[(4, 0, [1, 1, 1, 255])]);
        assert_eq!(locate(&r, 0, 0, 5, 255), Some(r.index_of(4, 0)));

        let r = with_pixels(16, 16, &[(0, 4, [1, 1, 1, 255])]);
        assert_eq!(locate(&r, 0, 0, 5, 255), Some(r.index_of(0, 4)));

        let r = with_pixels(16, 16, &[(15, 11, [1, 1, 1, 255])]);
        assert_eq!(locate(&r, 15, 15, 5, 255), Some(r.index_of(15, 11)));
    }

    #[test]
    fn test_out_of_bounds_origin() {
        let r = with_pixels(4, 4, &[(0, 0, [1, 1, 1, 255])]);
        assert_eq!(locate(&r, 4, 0, 15, 255), None);
    }

    #[test]
    fn test_respects_row_padding() {
        // 2x2 raster with 16-byte rows; pixel (1, 1) starts at byte 20.
        let mut data = vec![0u8; 24];
        data[20..24].copy_from_slice(&[9, 9, 9, 255]);
        let r = Raster::new(2, 2, 16, data, TileCoord::default()).unwrap();
        assert_eq!(locate(&r, 0, 0, 1, 255), Some(20));
    }
}
