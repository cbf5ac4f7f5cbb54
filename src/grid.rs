//! Offset-column hex coordinates, the neighbor table, and flood fill.
//!
//! The grid is a flat-top tiling packed along columns: odd columns sit half a
//! hex lower than even ones. Every neighbor computation in the crate goes
//! through [`hex_neighbors`] so that adjacency stays symmetric.

use std::collections::VecDeque;
use std::fmt;

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

/// A tile in the offset-column grid, 0-indexed.
///
/// Ordering is row-major (row first, then column), which is what
/// [`crate::edges::EdgeKey`] relies on to normalize edge identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct HexCoord {
    /// Row index (vertical).
    pub row: i32,
    /// Column index (horizontal packing axis).
    pub col: i32,
}

impl HexCoord {
    /// Creates a coordinate.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// `true` when the column is shifted down by half a hex.
    pub fn is_odd_column(self) -> bool {
        self.col.rem_euclid(2) == 1
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// Grid dimensions: `width` columns by `height` rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub struct GridSize {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridSize {
    /// Creates a grid size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether `coord` lies inside `[0, height) × [0, width)`.
    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.row >= 0
            && coord.col >= 0
            && (coord.row as u32) < self.height
            && (coord.col as u32) < self.width
    }

    /// Total number of tiles.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// `true` for a degenerate grid with no tiles.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every coordinate in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height as i32)
            .flat_map(move |row| (0..self.width as i32).map(move |col| HexCoord::new(row, col)))
    }

    /// In-bounds neighbors of `coord`, in slot order.
    pub fn neighbors_in_bounds(&self, coord: HexCoord) -> impl Iterator<Item = HexCoord> + '_ {
        hex_neighbors(coord)
            .into_iter()
            .filter(move |n| self.contains(*n))
    }
}

/// Which texture side tag an exposed edge asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub enum EdgeSide {
    /// Left/right edges.
    Side,
    /// Edges on the upper half of the hex.
    TopSide,
    /// Edges on the lower half of the hex.
    BottomSide,
}

impl EdgeSide {
    /// The tag used in asset filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Side => "side",
            Self::TopSide => "top-side",
            Self::BottomSide => "bottom-side",
        }
    }

    /// Parses a filename tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "side" => Some(Self::Side),
            "top-side" => Some(Self::TopSide),
            "bottom-side" => Some(Self::BottomSide),
            _ => None,
        }
    }
}

/// Fixed border-texture orientation attached to each neighbor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotOrientation {
    /// Texture angle in degrees, a multiple of 60.
    pub angle: u16,
    /// Side tag the texture must carry.
    pub side: EdgeSide,
    /// Whether the texture is mirrored.
    pub flipped: bool,
}

/// Orientation per slot of [`hex_neighbors`]:
/// right, left, upper-right, upper-left, lower-right, lower-left.
pub const SLOT_ORIENTATIONS: [SlotOrientation; 6] = [
    SlotOrientation { angle: 0, side: EdgeSide::Side, flipped: false },
    SlotOrientation { angle: 180, side: EdgeSide::Side, flipped: true },
    SlotOrientation { angle: 60, side: EdgeSide::TopSide, flipped: false },
    SlotOrientation { angle: 120, side: EdgeSide::TopSide, flipped: true },
    SlotOrientation { angle: 300, side: EdgeSide::BottomSide, flipped: false },
    SlotOrientation { angle: 240, side: EdgeSide::BottomSide, flipped: true },
];

/// The six neighbors of a hex, in slot order.
///
/// The formula depends on column parity because odd columns are shifted down
/// by half a hex. Coordinates may fall outside the grid; filter with
/// [`GridSize::contains`].
///
/// # Examples
/// ```
/// # use hex_painter::grid::{hex_neighbors, HexCoord};
/// let n = hex_neighbors(HexCoord::new(2, 2));
/// assert!(n.contains(&HexCoord::new(1, 2)));
/// assert!(n.contains(&HexCoord::new(3, 2)));
/// ```
pub fn hex_neighbors(coord: HexCoord) -> [HexCoord; 6] {
    let HexCoord { row, col } = coord;
    if coord.is_odd_column() {
        [
            HexCoord::new(row, col + 1),
            HexCoord::new(row, col - 1),
            HexCoord::new(row - 1, col),
            HexCoord::new(row + 1, col),
            HexCoord::new(row + 1, col + 1),
            HexCoord::new(row + 1, col - 1),
        ]
    } else {
        [
            HexCoord::new(row, col + 1),
            HexCoord::new(row, col - 1),
            HexCoord::new(row - 1, col + 1),
            HexCoord::new(row - 1, col),
            HexCoord::new(row - 1, col - 1),
            HexCoord::new(row + 1, col),
        ]
    }
}

/// Whether `a` and `b` share an edge.
pub fn are_adjacent(a: HexCoord, b: HexCoord) -> bool {
    hex_neighbors(a).contains(&b)
}

/// Breadth-first connected component starting at `start`.
///
/// `is_member` decides which in-bounds hexes belong to the component. The
/// worklist and visited set are local to the call; `start` is included only
/// if it is itself a member.
pub fn connected_component(
    start: HexCoord,
    grid: GridSize,
    mut is_member: impl FnMut(HexCoord) -> bool,
) -> HashSet<HexCoord> {
    let mut component = HashSet::new();
    if !grid.contains(start) || !is_member(start) {
        return component;
    }

    let mut queue = VecDeque::new();
    component.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in grid.neighbors_in_bounds(current) {
            if component.contains(&next) || !is_member(next) {
                continue;
            }
            component.insert(next);
            queue.push_back(next);
        }
    }

    component
}
