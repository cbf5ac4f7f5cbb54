use bevy::prelude::*;

use crate::camera::ViewState;
use crate::edges::{EdgeKey, EdgeRenderMode, EdgeSegment, shared_edge_vertices};
use crate::grid::HexCoord;
use crate::math::{HexPositions, calculate_hex_positions, calculate_hex_radius};
use crate::terrain::MapBoard;

/// Mesh tile drawn for one hex.
#[derive(Component, Debug, Reflect)]
pub struct HexTile {
    /// Grid coordinate of the tile.
    pub coord: HexCoord,
}

/// Coalesces redraw requests into at most one geometry refresh per frame.
///
/// Pan, zoom, resize and board edits request a redraw; the refresh system
/// takes the pending flag once per frame. The refresh reads the view after
/// every input system has run, so it never writes geometry for a stale view.
#[derive(Resource, Debug)]
pub struct RedrawThrottle {
    pending: bool,
}

impl Default for RedrawThrottle {
    fn default() -> Self {
        Self { pending: true }
    }
}

impl RedrawThrottle {
    /// Marks a refresh as needed.
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Whether a refresh is pending.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Clears and returns the pending flag.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// A painted border resolved to canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderSegment {
    /// Edge identity.
    pub key: EdgeKey,
    /// Line in canvas pixels.
    pub segment: EdgeSegment,
    /// Line color.
    pub color: [u8; 3],
}

/// View-dependent geometry, recomputed only when a redraw is taken.
#[derive(Resource, Clone, Debug, Default)]
pub struct ViewGeometry {
    /// Canvas size in logical pixels.
    pub canvas_size: Vec2,
    /// Hex radius at the current zoom.
    pub radius: f32,
    /// Hex centers in canvas pixels.
    pub positions: HexPositions,
    /// Painted borders in canvas pixels, live rendering mode.
    pub borders: Vec<BorderSegment>,
}

impl ViewGeometry {
    /// Lays out `board` on a canvas of `canvas_size` under `view`.
    pub fn compute(canvas_size: Vec2, board: &MapBoard, view: &ViewState) -> Self {
        let grid = board.grid();
        let radius = calculate_hex_radius(canvas_size, grid, view.zoom_level);
        let positions = calculate_hex_positions(radius, grid, canvas_size, view.pan_offset);

        let mut borders: Vec<BorderSegment> = board
            .borders()
            .iter()
            .filter_map(|(key, edge)| {
                let segment =
                    shared_edge_vertices(edge.from, edge.to, radius, &positions, EdgeRenderMode::Live)?;
                Some(BorderSegment {
                    key: *key,
                    segment,
                    color: edge.color,
                })
            })
            .collect();
        borders.sort_unstable_by_key(|b| b.key);

        Self {
            canvas_size,
            radius,
            positions,
            borders,
        }
    }

    /// World-space position of a canvas pixel for the centered 2D camera.
    pub fn canvas_to_world(&self, point: Vec2) -> Vec2 {
        canvas_to_world(point, self.canvas_size)
    }
}

/// Canvas pixels (origin top-left, y down) to 2D world coordinates (origin
/// at the canvas center, y up).
///
/// # Examples
/// ```
/// # use bevy::math::Vec2;
/// # use hex_painter::visuals::canvas_to_world;
/// let canvas = Vec2::new(800.0, 600.0);
/// assert_eq!(canvas_to_world(Vec2::new(400.0, 300.0), canvas), Vec2::ZERO);
/// assert_eq!(canvas_to_world(Vec2::ZERO, canvas), Vec2::new(-400.0, 300.0));
/// ```
pub fn canvas_to_world(point: Vec2, canvas_size: Vec2) -> Vec2 {
    Vec2::new(point.x - canvas_size.x / 2.0, canvas_size.y / 2.0 - point.y)
}

/// Logical size of the window, which is the painter canvas.
pub fn window_canvas_size(window: &Window) -> Vec2 {
    Vec2::new(window.width(), window.height())
}
