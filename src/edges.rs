//! Borders between adjacent hexes: edge identity, shared-edge geometry, and
//! edge hit-testing.

use std::fmt;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::grid::{GridSize, HexCoord, are_adjacent};
use crate::math::{HexPositions, hex_corners};

/// Visible edge length as a fraction of the hex radius.
pub const EDGE_VISUAL_RATIO: f32 = 0.95;
/// Maximum distance from an edge midpoint that still counts as a click on it.
pub const EDGE_HIT_RATIO: f32 = 0.4;
/// How far export-path vertices are pulled toward the hex center.
pub const EXPORT_VERTEX_INSET: f32 = 0.15;

/// Order-independent identity of the edge between two hexes.
///
/// Built through [`EdgeKey::new`], which stores the row-major smaller hex
/// first, so `(a, b)` and `(b, a)` produce the same key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    first: HexCoord,
    second: HexCoord,
}

impl EdgeKey {
    /// Normalized key for the pair.
    pub fn new(a: HexCoord, b: HexCoord) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// The row-major smaller hex.
    pub fn first(&self) -> HexCoord {
        self.first
    }

    /// The row-major larger hex.
    pub fn second(&self) -> HexCoord {
        self.second
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.first, self.second)
    }
}

/// Shorthand for [`EdgeKey::new`].
pub fn create_edge_key(from: HexCoord, to: HexCoord) -> EdgeKey {
    EdgeKey::new(from, to)
}

/// A user-painted border line between two hexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BorderEdge {
    /// Hex the border was painted from.
    pub from: HexCoord,
    /// Hex on the other side.
    pub to: HexCoord,
    /// Line color.
    pub color: [u8; 3],
}

impl BorderEdge {
    /// Key under which this border is stored.
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.from, self.to)
    }
}

/// At most one border per unordered hex pair.
pub type BorderMap = HashMap<EdgeKey, BorderEdge>;

/// Which renderer is asking for edge geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRenderMode {
    /// Interactive canvas: ambiguous diagonals are skipped.
    Live,
    /// Image export: ambiguous diagonals get a vertex-based line.
    Export,
}

/// A line segment in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
    /// First endpoint.
    pub start: Vec2,
    /// Second endpoint.
    pub end: Vec2,
}

impl EdgeSegment {
    /// Midpoint of the segment.
    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) / 2.0
    }
}

/// The diagonal pairs whose center-to-center line reads ambiguously:
/// from an even column to `(row + 1, col + 1)`, or from an odd column to
/// `(row - 1, col - 1)`. The relation is symmetric.
pub fn is_ambiguous_diagonal(from: HexCoord, to: HexCoord) -> bool {
    let (dr, dc) = (to.row - from.row, to.col - from.col);
    if from.is_odd_column() {
        (dr, dc) == (-1, -1)
    } else {
        (dr, dc) == (1, 1)
    }
}

/// Segment drawn for the border between `from` and `to`.
///
/// Neighbors get the perpendicular bisector of their centers, `radius ×`
/// [`EDGE_VISUAL_RATIO`] long, centered on the midpoint. Same-row pairs are
/// canonicalized to the lower column first so both directions yield the
/// identical segment.
///
/// Ambiguous diagonals ([`is_ambiguous_diagonal`]) diverge by renderer: the
/// live canvas returns `None` and skips them, the export path derives a line
/// from the two corners of `from` nearest `to`, each pulled
/// [`EXPORT_VERTEX_INSET`] toward `from`'s center. The two renderers
/// therefore disagree on these pairs; that mismatch is known and left as is.
pub fn shared_edge_vertices(
    from: HexCoord,
    to: HexCoord,
    radius: f32,
    positions: &HexPositions,
    mode: EdgeRenderMode,
) -> Option<EdgeSegment> {
    if is_ambiguous_diagonal(from, to) {
        return match mode {
            EdgeRenderMode::Live => None,
            EdgeRenderMode::Export => export_diagonal_segment(from, to, radius, positions),
        };
    }
    if !are_adjacent(from, to) {
        return None;
    }

    let (from, to) = if from.row == to.row && from.col > to.col {
        (to, from)
    } else {
        (from, to)
    };

    let a = positions.center_of(from)?;
    let b = positions.center_of(to)?;
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    let perp = dir.perp();
    let half = radius * EDGE_VISUAL_RATIO / 2.0;
    let mid = (a + b) / 2.0;

    Some(EdgeSegment {
        start: mid - perp * half,
        end: mid + perp * half,
    })
}

fn export_diagonal_segment(
    from: HexCoord,
    to: HexCoord,
    radius: f32,
    positions: &HexPositions,
) -> Option<EdgeSegment> {
    let a = positions.center_of(from)?;
    let b = positions.center_of(to)?;

    let mut corners = hex_corners(a, radius);
    corners.sort_by(|p, q| p.distance_squared(b).total_cmp(&q.distance_squared(b)));
    let inset = |v: Vec2| v.lerp(a, EXPORT_VERTEX_INSET);

    Some(EdgeSegment {
        start: inset(corners[0]),
        end: inset(corners[1]),
    })
}

/// The edge whose midpoint is closest to `(x, y)`, within `radius ×`
/// [`EDGE_HIT_RATIO`].
///
/// Scans every hex and its in-bounds neighbors: O(n × 6), fine for the grid
/// sizes a painter works with. Returns the pair as `(from, to)` with `from`
/// being the scanned hex.
pub fn edge_from_mouse_pos(
    x: f32,
    y: f32,
    positions: &HexPositions,
    radius: f32,
    grid: GridSize,
) -> Option<(HexCoord, HexCoord)> {
    let point = Vec2::new(x, y);
    let threshold = radius * EDGE_HIT_RATIO;
    let mut best: Option<(f32, HexCoord, HexCoord)> = None;

    for pos in positions.iter() {
        let from = pos.coord();
        for to in grid.neighbors_in_bounds(from) {
            if to < from {
                continue;
            }
            let Some(segment) = shared_edge_vertices(from, to, radius, positions, EdgeRenderMode::Live)
            else {
                continue;
            };
            let dist = point.distance(segment.midpoint());
            if dist <= threshold && best.is_none_or(|(d, _, _)| dist < d) {
                best = Some((dist, from, to));
            }
        }
    }

    best.map(|(_, from, to)| (from, to))
}
