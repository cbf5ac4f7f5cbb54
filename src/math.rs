//! Hex geometry: grid ↔ pixel projection for the offset-column tiling.
//!
//! All functions in this module are free of Bevy ECS dependencies and operate
//! on plain numeric / `Vec2` inputs, making them straightforward to unit-test.
//! Pixel space has its origin at the canvas top-left with `y` growing down.

use bevy::prelude::{Vec2, default};
use hexx::{HexLayout, HexOrientation};

use crate::grid::{GridSize, HexCoord};

/// Smallest radius a hex may have before zoom is applied.
pub const MIN_HEX_RADIUS: f32 = 15.0;
/// Fraction of the canvas kept free around the grid.
pub const CANVAS_MARGIN: f32 = 0.05;
/// Vertical breathing room reserved at both top and bottom, in pixels.
pub const VERTICAL_PADDING: f32 = 20.0;
/// Column spacing as a fraction of hex width.
pub const COLUMN_SPACING_RATIO: f32 = 0.75;

/// Width of a flat-top hex with circumradius `radius`.
pub fn hex_width(radius: f32) -> f32 {
    radius * 2.0
}

/// Height of a flat-top hex with circumradius `radius`.
pub fn hex_height(radius: f32) -> f32 {
    radius * 3f32.sqrt()
}

/// Horizontal distance between adjacent column centers.
pub fn horizontal_spacing(radius: f32) -> f32 {
    hex_width(radius) * COLUMN_SPACING_RATIO
}

/// Vertical distance between adjacent row centers.
pub fn vertical_spacing(radius: f32) -> f32 {
    hex_height(radius)
}

/// Pixel extent of the whole rendered grid (outer hex edges included).
pub fn grid_pixel_size(radius: f32, grid: GridSize) -> Vec2 {
    if grid.is_empty() {
        return Vec2::ZERO;
    }
    let w = grid.width as f32;
    let h = grid.height as f32;
    let offset_rows = if grid.width > 1 { 0.5 } else { 0.0 };
    Vec2::new(
        (w - 1.0) * horizontal_spacing(radius) + hex_width(radius),
        (h + offset_rows) * vertical_spacing(radius),
    )
}

/// Largest radius that fits the grid on the canvas, scaled by `zoom_level`.
///
/// Width-derived and height-derived radii are computed against the canvas
/// minus [`CANVAS_MARGIN`]. The smaller one wins, except when width is the
/// binding constraint and squeezes below `0.8 × MIN_HEX_RADIUS`: then the
/// height-derived radius is used so a side panel cannot shrink hexes to
/// nothing. The result is floored at [`MIN_HEX_RADIUS`] before zooming.
pub fn calculate_hex_radius(canvas_size: Vec2, grid: GridSize, zoom_level: f32) -> f32 {
    if grid.is_empty() {
        return MIN_HEX_RADIUS * zoom_level;
    }
    let available = canvas_size * (1.0 - CANVAS_MARGIN);
    let w = grid.width as f32;
    let h = grid.height as f32;
    let offset_rows = if grid.width > 1 { 0.5 } else { 0.0 };

    // width = r * (1.5 (w - 1) + 2), height = r * sqrt(3) * (h + offset)
    let from_width = available.x / (COLUMN_SPACING_RATIO * 2.0 * (w - 1.0) + 2.0);
    let from_height =
        (available.y - 2.0 * VERTICAL_PADDING).max(0.0) / (3f32.sqrt() * (h + offset_rows));

    let mut base = from_width.min(from_height);
    if from_width < from_height && from_width < MIN_HEX_RADIUS * 0.8 {
        base = from_height;
    }

    base.max(MIN_HEX_RADIUS) * zoom_level
}

/// Pixel center of one hex under the current pan/zoom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HexPosition {
    /// Center x in canvas pixels.
    pub x: f32,
    /// Center y in canvas pixels.
    pub y: f32,
    /// Row of the hex.
    pub row: i32,
    /// Column of the hex.
    pub col: i32,
}

impl HexPosition {
    /// The center as a vector.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// The hex this position belongs to.
    pub fn coord(&self) -> HexCoord {
        HexCoord::new(self.row, self.col)
    }
}

/// Row-major hex positions with O(1) lookup by coordinate.
#[derive(Clone, Debug, Default)]
pub struct HexPositions {
    grid: Option<GridSize>,
    positions: Vec<HexPosition>,
}

impl HexPositions {
    /// Position of `coord`, if inside the grid these positions were built for.
    pub fn get(&self, coord: HexCoord) -> Option<&HexPosition> {
        let grid = self.grid?;
        if !grid.contains(coord) {
            return None;
        }
        self.positions
            .get(coord.row as usize * grid.width as usize + coord.col as usize)
    }

    /// Center of `coord` as a vector.
    pub fn center_of(&self, coord: HexCoord) -> Option<Vec2> {
        self.get(coord).map(HexPosition::center)
    }

    /// All positions in row-major order.
    pub fn as_slice(&self) -> &[HexPosition] {
        &self.positions
    }

    /// Iterates positions in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, HexPosition> {
        self.positions.iter()
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// `true` when no grid has been laid out.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Lays out every hex of `grid`, centered on the canvas and shifted by `pan_offset`.
///
/// `x = start_x + col × h_spacing`, `y = start_y + row × v_spacing + (col mod 2) × v_spacing / 2`.
/// The start point centers the bounding box of the centers actually reached,
/// so a single-column grid is not offset by the odd-column shift.
pub fn calculate_hex_positions(
    radius: f32,
    grid: GridSize,
    canvas_size: Vec2,
    pan_offset: Vec2,
) -> HexPositions {
    let h_spacing = horizontal_spacing(radius);
    let v_spacing = vertical_spacing(radius);

    let local = |row: i32, col: i32| {
        Vec2::new(
            col as f32 * h_spacing,
            row as f32 * v_spacing + col.rem_euclid(2) as f32 * v_spacing * 0.5,
        )
    };

    if grid.is_empty() {
        return HexPositions::default();
    }
    let mut min = Vec2::splat(f32::INFINITY);
    let mut max = Vec2::splat(f32::NEG_INFINITY);
    for coord in grid.iter() {
        let p = local(coord.row, coord.col);
        min = min.min(p);
        max = max.max(p);
    }

    let start = canvas_size / 2.0 - (min + max) / 2.0 + pan_offset;
    let positions = grid
        .iter()
        .map(|coord| {
            let p = start + local(coord.row, coord.col);
            HexPosition {
                x: p.x,
                y: p.y,
                row: coord.row,
                col: coord.col,
            }
        })
        .collect();

    HexPositions {
        grid: Some(grid),
        positions,
    }
}

/// Nearest hex center to `(x, y)`, if it lies within `radius`.
///
/// A circular approximation of the hexagon, not a polygon test. O(n) over all
/// positions; ties go to the first position found.
pub fn hex_from_mouse_pos(x: f32, y: f32, positions: &HexPositions, radius: f32) -> Option<HexPosition> {
    let point = Vec2::new(x, y);
    let mut best: Option<(f32, &HexPosition)> = None;
    for pos in positions.iter() {
        let dist = point.distance(pos.center());
        if best.is_none_or(|(d, _)| dist < d) {
            best = Some((dist, pos));
        }
    }
    best.filter(|(d, _)| *d <= radius).map(|(_, p)| *p)
}

/// Corners of the flat-top hexagon centered at `center`.
pub fn hex_corners(center: Vec2, radius: f32) -> [Vec2; 6] {
    let layout = HexLayout {
        orientation: HexOrientation::Flat,
        scale: Vec2::splat(radius),
        ..default()
    };
    let corners = layout.center_aligned_hex_corners();
    std::array::from_fn(|i| center + corners[i])
}

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// # Examples
/// ```
/// # use hex_painter::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(map_noise_to_range( 1.0, 0.0, 10.0), 10.0);
/// assert_eq!(map_noise_to_range( 0.0, 2.0, 6.0),  4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CANVAS: Vec2 = Vec2::new(1200.0, 800.0);

    // ── calculate_hex_radius ────────────────────────────────────────

    #[test]
    fn radius_fits_grid_within_canvas() {
        let grid = GridSize::new(10, 8);
        let r = calculate_hex_radius(CANVAS, grid, 1.0);
        let size = grid_pixel_size(r, grid);
        assert!(size.x <= CANVAS.x + 1e-3, "grid too wide: {size:?}");
        assert!(size.y <= CANVAS.y + 1e-3, "grid too tall: {size:?}");
    }

    #[test]
    fn radius_respects_floor() {
        let r = calculate_hex_radius(Vec2::new(100.0, 100.0), GridSize::new(25, 25), 1.0);
        assert!(r >= MIN_HEX_RADIUS);
    }

    #[test]
    fn severe_width_constraint_prefers_height_radius() {
        // Narrow canvas: the width-derived radius is tiny, height is generous.
        let canvas = Vec2::new(150.0, 2000.0);
        let grid = GridSize::new(20, 5);
        let r = calculate_hex_radius(canvas, grid, 1.0);
        let from_height = (canvas.y * 0.95 - 2.0 * VERTICAL_PADDING) / (3f32.sqrt() * 5.5);
        assert!((r - from_height).abs() < 1e-3, "got {r}, expected {from_height}");
    }

    #[test]
    fn zoom_scales_radius_linearly() {
        let grid = GridSize::new(10, 10);
        let r1 = calculate_hex_radius(CANVAS, grid, 1.0);
        let r2 = calculate_hex_radius(CANVAS, grid, 2.0);
        assert!((r2 - 2.0 * r1).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn radius_strictly_increases_with_zoom(
            zoom in 0.5f32..4.0,
            step in 0.01f32..1.0,
            w in 1u32..26,
            h in 1u32..26,
        ) {
            let grid = GridSize::new(w, h);
            let a = calculate_hex_radius(CANVAS, grid, zoom);
            let b = calculate_hex_radius(CANVAS, grid, zoom + step);
            prop_assert!(b > a);
        }
    }

    // ── calculate_hex_positions ─────────────────────────────────────

    #[test]
    fn positions_follow_column_offset_rule() {
        let grid = GridSize::new(3, 3);
        let r = 20.0;
        let pos = calculate_hex_positions(r, grid, CANVAS, Vec2::ZERO);
        let origin = pos.center_of(HexCoord::new(0, 0)).unwrap();
        let odd = pos.center_of(HexCoord::new(0, 1)).unwrap();
        let below = pos.center_of(HexCoord::new(1, 0)).unwrap();

        assert!((odd.x - origin.x - horizontal_spacing(r)).abs() < 1e-4);
        assert!((odd.y - origin.y - vertical_spacing(r) * 0.5).abs() < 1e-4);
        assert!((below.y - origin.y - vertical_spacing(r)).abs() < 1e-4);
    }

    #[test]
    fn positions_are_centered_on_canvas() {
        let grid = GridSize::new(4, 3);
        let pos = calculate_hex_positions(25.0, grid, CANVAS, Vec2::ZERO);
        let (min, max) = pos.iter().fold(
            (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
            |(lo, hi), p| (lo.min(p.center()), hi.max(p.center())),
        );
        let mid = (min + max) / 2.0;
        assert!((mid - CANVAS / 2.0).length() < 1e-3, "mid = {mid:?}");
    }

    #[test]
    fn pan_offset_shifts_every_position() {
        let grid = GridSize::new(3, 3);
        let a = calculate_hex_positions(20.0, grid, CANVAS, Vec2::ZERO);
        let b = calculate_hex_positions(20.0, grid, CANVAS, Vec2::new(15.0, -7.0));
        for (pa, pb) in a.iter().zip(b.iter()) {
            assert!((pb.center() - pa.center() - Vec2::new(15.0, -7.0)).length() < 1e-4);
        }
    }

    #[test]
    fn lookup_outside_grid_is_none() {
        let pos = calculate_hex_positions(20.0, GridSize::new(2, 2), CANVAS, Vec2::ZERO);
        assert_eq!(pos.len(), 4);
        assert!(pos.get(HexCoord::new(2, 0)).is_none());
        assert!(pos.get(HexCoord::new(0, -1)).is_none());
    }

    // ── hex_from_mouse_pos ──────────────────────────────────────────

    #[test]
    fn mouse_on_center_hits_that_hex() {
        let pos = calculate_hex_positions(20.0, GridSize::new(5, 5), CANVAS, Vec2::ZERO);
        let target = *pos.get(HexCoord::new(2, 3)).unwrap();
        let hit = hex_from_mouse_pos(target.x + 3.0, target.y - 2.0, &pos, 20.0).unwrap();
        assert_eq!(hit.coord(), HexCoord::new(2, 3));
    }

    #[test]
    fn mouse_far_from_grid_misses() {
        let pos = calculate_hex_positions(20.0, GridSize::new(5, 5), CANVAS, Vec2::ZERO);
        assert!(hex_from_mouse_pos(-500.0, -500.0, &pos, 20.0).is_none());
    }

    #[test]
    fn empty_positions_miss() {
        assert!(hex_from_mouse_pos(0.0, 0.0, &HexPositions::default(), 20.0).is_none());
    }

    // ── hex_corners ─────────────────────────────────────────────────

    #[test]
    fn corners_lie_on_circumradius() {
        let center = Vec2::new(40.0, 60.0);
        for c in hex_corners(center, 12.0) {
            assert!((c.distance(center) - 12.0).abs() < 1e-3);
        }
    }

    #[test]
    fn flat_top_corners_span_full_width() {
        let corners = hex_corners(Vec2::ZERO, 10.0);
        let max_x = corners.iter().map(|c| c.x).fold(f32::MIN, f32::max);
        let max_y = corners.iter().map(|c| c.y).fold(f32::MIN, f32::max);
        assert!((max_x - 10.0).abs() < 1e-3);
        assert!((max_y - hex_height(10.0) / 2.0).abs() < 1e-3);
    }

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_works_with_negative_range() {
        let result = map_noise_to_range(0.0, -10.0, 10.0);
        assert!((result - 0.0).abs() < 1e-6);
    }
}
