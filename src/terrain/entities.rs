use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

use crate::edges::EdgeKey;
use crate::grid::HexCoord;

/// Terrain types whose assets carry side-aware border variants.
pub const SIDE_AWARE_TERRAINS: [&str; 2] = ["forest", "coast"];

/// What is painted on a hex.
#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
pub enum TerrainValue {
    /// Nothing painted.
    #[default]
    Default,
    /// A flat color. Never part of a region.
    Color {
        /// sRGB components.
        rgb: [u8; 3],
    },
    /// A terrain texture.
    Texture {
        /// Asset name, e.g. `forest_dense` or `forestedge_side_a0_v1`.
        name: String,
        /// Asset path, when loaded from disk.
        path: Option<String>,
        /// Rotation in sixth turns, `0..=5`.
        rotation: u8,
        /// Horizontal mirror.
        flipped: bool,
    },
}

impl TerrainValue {
    /// A texture with no rotation or flip.
    pub fn texture(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::Texture {
            path: Some(format!("terrain/{name}.png")),
            name,
            rotation: 0,
            flipped: false,
        }
    }

    /// Terrain identity used for regions; `None` for colors and empty hexes.
    pub fn base_terrain(&self) -> Option<String> {
        match self {
            Self::Texture { name, .. } => Some(base_terrain_name(name)),
            Self::Default | Self::Color { .. } => None,
        }
    }

    /// `true` for [`TerrainValue::Texture`].
    pub fn is_texture(&self) -> bool {
        matches!(self, Self::Texture { .. })
    }
}

/// Canonical terrain name of a texture asset.
///
/// Takes the lowercased prefix before the first `_` or `-`. Edge families of
/// side-aware terrains (`forestedge`, `coastedge`) map to their terrain so
/// border textures keep a hex in its region.
///
/// # Examples
/// ```
/// # use hex_painter::terrain::base_terrain_name;
/// assert_eq!(base_terrain_name("Plains_02"), "plains");
/// assert_eq!(base_terrain_name("coast-north"), "coast");
/// assert_eq!(base_terrain_name("forestedge_side_a0_v1"), "forest");
/// ```
pub fn base_terrain_name(name: &str) -> String {
    let prefix = name
        .split(['_', '-'])
        .next()
        .unwrap_or(name)
        .to_ascii_lowercase();
    match prefix.strip_suffix("edge") {
        Some(stem) if SIDE_AWARE_TERRAINS.contains(&stem) => stem.to_string(),
        _ => prefix,
    }
}

/// Per-hex terrain. Hexes without an entry are [`TerrainValue::Default`].
pub type TerrainMap = HashMap<HexCoord, TerrainValue>;

/// What a click on a hex does.
#[derive(Clone, Debug, PartialEq, Reflect)]
pub enum PaintTool {
    /// Paint this terrain.
    Terrain(TerrainValue),
    /// Place an icon.
    Icon(String),
    /// Remove terrain and icon.
    Eraser,
    /// Paint borders on edges with this color.
    Border([u8; 3]),
}

impl Default for PaintTool {
    fn default() -> Self {
        Self::Terrain(TerrainValue::texture("plains"))
    }
}

/// The tool currently selected in the palette.
#[derive(Resource, Default, Clone, Debug)]
pub struct ActiveTool(pub PaintTool);

/// Hexes and edges already painted during the current drag.
///
/// A drag paints each hex and each edge at most once, so toggling borders
/// does not flicker while the pointer lingers on an edge.
#[derive(Resource, Default, Debug)]
pub struct DragState {
    active: bool,
    hexes: HashSet<HexCoord>,
    edges: HashSet<EdgeKey>,
}

impl DragState {
    /// Starts a new drag, forgetting the previous one.
    pub fn begin(&mut self) {
        self.active = true;
        self.hexes.clear();
        self.edges.clear();
    }

    /// Ends the drag.
    pub fn end(&mut self) {
        self.active = false;
        self.hexes.clear();
        self.edges.clear();
    }

    /// Whether a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `true` the first time `hex` is visited in this drag.
    pub fn visit_hex(&mut self, hex: HexCoord) -> bool {
        self.hexes.insert(hex)
    }

    /// `true` the first time `edge` is visited in this drag.
    pub fn visit_edge(&mut self, edge: EdgeKey) -> bool {
        self.edges.insert(edge)
    }
}

/// Paintable terrains, colors and icons offered by the palette.
#[derive(Clone, Debug, Reflect)]
pub struct TerrainPalette {
    /// Texture terrains with their preview swatch.
    pub terrains: Vec<(String, [u8; 3])>,
    /// Flat colors.
    pub colors: Vec<[u8; 3]>,
    /// Icon glyphs.
    pub icons: Vec<String>,
}

impl Default for TerrainPalette {
    fn default() -> Self {
        Self {
            terrains: vec![
                ("plains".into(), [163, 190, 90]),
                ("forest".into(), [46, 110, 60]),
                ("coast".into(), [222, 204, 150]),
                ("mountain".into(), [128, 118, 110]),
                ("water".into(), [60, 120, 190]),
            ],
            colors: vec![[200, 60, 60], [240, 200, 80], [90, 90, 200], [30, 30, 30]],
            icons: ["⌂", "♜", "⚑", "★", "✝", "⚓"].map(String::from).to_vec(),
        }
    }
}

impl TerrainPalette {
    /// Preview color for a base terrain.
    ///
    /// Terrains missing from the palette get a stable color derived from
    /// their name.
    pub fn swatch(&self, base_terrain: &str) -> [u8; 3] {
        if let Some((_, rgb)) = self.terrains.iter().find(|(name, _)| name == base_terrain) {
            return *rgb;
        }
        let hash = base_terrain
            .bytes()
            .fold(2166136261u32, |h, b| (h ^ b as u32).wrapping_mul(16777619));
        let [r, g, b, _] = hash.to_le_bytes();
        [r / 2 + 64, g / 2 + 64, b / 2 + 64]
    }
}
