//! Border texture manifests.
//!
//! Asset metadata is encoded in filenames:
//! `{family}_{side}_a{angle}_v{variant}[_special].png`, e.g.
//! `forestedge_top-side_a60_v2.png` or `coastedge_side_a0_v1_cliff.png`.
//! A [`ManifestSource`] lists the raw names for a terrain; the
//! [`ManifestCache`] parses and indexes them once per terrain.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::grid::{EdgeSide, SLOT_ORIENTATIONS};

/// One border texture, parsed from its filename.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureAsset {
    /// Filename without the extension; used as the terrain texture name.
    pub name: String,
    /// Asset family, e.g. `forestedge`.
    pub family: String,
    /// Side tag.
    pub side: EdgeSide,
    /// Drawn angle in degrees.
    pub angle: u16,
    /// Variant number.
    pub variant: u32,
    /// Special variant tag, if any.
    pub special: Option<String>,
}

impl TextureAsset {
    /// Parses a manifest filename; `None` when it does not follow the grammar.
    ///
    /// # Examples
    /// ```
    /// # use hex_painter::grid::EdgeSide;
    /// # use hex_painter::terrain::manifest::TextureAsset;
    /// let t = TextureAsset::parse("forestedge_top-side_a60_v2.png").unwrap();
    /// assert_eq!(t.side, EdgeSide::TopSide);
    /// assert_eq!((t.angle, t.variant), (60, 2));
    /// assert!(TextureAsset::parse("forest_dense.png").is_none());
    /// ```
    pub fn parse(file_name: &str) -> Option<Self> {
        let name = file_name.strip_suffix(".png").unwrap_or(file_name);
        let mut parts = name.split('_');
        let family = parts.next().filter(|f| !f.is_empty())?;
        let side = EdgeSide::parse(parts.next()?)?;
        let angle = parts.next()?.strip_prefix('a')?.parse().ok()?;
        let variant = parts.next()?.strip_prefix('v')?.parse().ok()?;
        let rest: Vec<&str> = parts.collect();
        let special = (!rest.is_empty()).then(|| rest.join("_"));

        Some(Self {
            name: name.to_string(),
            family: family.to_string(),
            side,
            angle,
            variant,
            special,
        })
    }

    /// Asset path relative to the asset root.
    pub fn path(&self) -> String {
        format!("terrain/{}.png", self.name)
    }
}

/// Parsed textures indexed for lookup. Index vectors point into `all`.
#[derive(Clone, Debug, Default)]
pub struct ManifestAssets {
    /// Every parsed texture.
    pub all: Vec<TextureAsset>,
    /// Textures by drawn angle.
    pub by_angle: HashMap<u16, Vec<usize>>,
    /// Textures by side tag.
    pub by_side: HashMap<EdgeSide, Vec<usize>>,
    /// Textures carrying a special tag.
    pub by_special: Vec<usize>,
}

/// Manifest of one terrain's border textures.
#[derive(Clone, Debug, Default)]
pub struct TerrainManifest {
    /// Raw filenames as listed by the source.
    pub raw_assets: Vec<String>,
    /// Parsed and indexed textures.
    pub assets: ManifestAssets,
}

impl TerrainManifest {
    /// Parses and indexes `raw_assets`, skipping names that do not parse.
    pub fn from_raw(raw_assets: Vec<String>) -> Self {
        let mut assets = ManifestAssets::default();
        for raw in &raw_assets {
            let Some(texture) = TextureAsset::parse(raw) else {
                debug!("skipping unrecognized manifest entry {raw}");
                continue;
            };
            let index = assets.all.len();
            assets.by_angle.entry(texture.angle).or_default().push(index);
            assets.by_side.entry(texture.side).or_default().push(index);
            if texture.special.is_some() {
                assets.by_special.push(index);
            }
            assets.all.push(texture);
        }
        Self { raw_assets, assets }
    }

    /// Textures drawn at `angle` with side tag `side`.
    pub fn exact(&self, angle: u16, side: EdgeSide) -> impl Iterator<Item = &TextureAsset> {
        self.indexed(self.assets.by_angle.get(&angle))
            .filter(move |t| t.side == side)
    }

    /// Textures with side tag `side`, any angle.
    pub fn with_side(&self, side: EdgeSide) -> impl Iterator<Item = &TextureAsset> {
        self.indexed(self.assets.by_side.get(&side))
    }

    fn indexed<'a>(&'a self, indices: Option<&'a Vec<usize>>) -> impl Iterator<Item = &'a TextureAsset> {
        indices
            .into_iter()
            .flatten()
            .filter_map(|&i| self.assets.all.get(i))
    }

    /// `true` when nothing parsed.
    pub fn is_empty(&self) -> bool {
        self.assets.all.is_empty()
    }
}

/// Supplies raw manifest filenames per terrain.
pub trait ManifestSource: Send + Sync {
    /// Filenames for `terrain`, or `None` if it has no border textures.
    fn raw_assets(&self, terrain: &str) -> Option<Vec<String>>;
}

/// The border texture sets shipped with the painter.
///
/// `forest` and `coast` each get two variants per slot orientation; forest
/// also has a `mossy` special variant on its side edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinManifests;

impl ManifestSource for BuiltinManifests {
    fn raw_assets(&self, terrain: &str) -> Option<Vec<String>> {
        let family = match terrain {
            "forest" => "forestedge",
            "coast" => "coastedge",
            _ => return None,
        };
        let mut names = Vec::new();
        for slot in SLOT_ORIENTATIONS {
            for variant in 1..=2 {
                names.push(format!(
                    "{family}_{}_a{}_v{variant}.png",
                    slot.side.as_str(),
                    slot.angle
                ));
            }
        }
        if terrain == "forest" {
            for angle in [0, 180] {
                names.push(format!("{family}_side_a{angle}_v1_mossy.png"));
            }
        }
        Some(names)
    }
}

/// Parsed manifests, loaded on first use and owned by the app.
#[derive(Resource)]
pub struct ManifestCache {
    source: Box<dyn ManifestSource>,
    loaded: HashMap<String, Option<TerrainManifest>>,
}

impl Default for ManifestCache {
    fn default() -> Self {
        Self::new(BuiltinManifests)
    }
}

impl ManifestCache {
    /// An empty cache over `source`.
    pub fn new(source: impl ManifestSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            loaded: HashMap::new(),
        }
    }

    /// Manifest for `terrain`. Missing or empty manifests yield `None`.
    pub fn load(&mut self, terrain: &str) -> Option<&TerrainManifest> {
        let source = &self.source;
        self.loaded
            .entry(terrain.to_string())
            .or_insert_with(|| {
                let manifest = TerrainManifest::from_raw(source.raw_assets(terrain)?);
                (!manifest.is_empty()).then_some(manifest)
            })
            .as_ref()
    }

    /// Whether `terrain` has any border textures.
    pub fn has_manifest(&mut self, terrain: &str) -> bool {
        self.load(terrain).is_some()
    }

    /// Drops every parsed manifest.
    pub fn clear(&mut self) {
        self.loaded.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<&'static str>);

    impl ManifestSource for Fixed {
        fn raw_assets(&self, terrain: &str) -> Option<Vec<String>> {
            (terrain == "forest").then(|| self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    // ── parse ───────────────────────────────────────────────────────

    #[test]
    fn parses_special_suffix() {
        let t = TextureAsset::parse("coastedge_bottom-side_a300_v3_cliff_high.png").unwrap();
        assert_eq!(t.family, "coastedge");
        assert_eq!(t.side, EdgeSide::BottomSide);
        assert_eq!(t.angle, 300);
        assert_eq!(t.variant, 3);
        assert_eq!(t.special.as_deref(), Some("cliff_high"));
        assert_eq!(t.path(), "terrain/coastedge_bottom-side_a300_v3_cliff_high.png");
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in [
            "forestedge_left_a0_v1.png",
            "forestedge_side_0_v1.png",
            "forestedge_side_a0_vx.png",
            "_side_a0_v1.png",
        ] {
            assert!(TextureAsset::parse(bad).is_none(), "{bad}");
        }
    }

    // ── index ───────────────────────────────────────────────────────

    #[test]
    fn indexes_by_angle_side_and_special() {
        let m = TerrainManifest::from_raw(vec![
            "forestedge_side_a0_v1.png".into(),
            "forestedge_side_a0_v2_mossy.png".into(),
            "forestedge_top-side_a60_v1.png".into(),
            "readme.txt".into(),
        ]);
        assert_eq!(m.raw_assets.len(), 4);
        assert_eq!(m.assets.all.len(), 3);
        assert_eq!(m.exact(0, EdgeSide::Side).count(), 2);
        assert_eq!(m.exact(60, EdgeSide::Side).count(), 0);
        assert_eq!(m.with_side(EdgeSide::TopSide).count(), 1);
        assert_eq!(m.assets.by_special, vec![1]);
    }

    // ── cache ───────────────────────────────────────────────────────

    #[test]
    fn builtin_covers_every_slot() {
        let mut cache = ManifestCache::default();
        let forest = cache.load("forest").unwrap();
        for slot in SLOT_ORIENTATIONS {
            assert!(forest.exact(slot.angle, slot.side).count() >= 2);
        }
        assert!(cache.has_manifest("coast"));
        assert!(!cache.has_manifest("plains"));
    }

    #[test]
    fn empty_manifest_is_missing() {
        let mut cache = ManifestCache::new(Fixed(vec!["notes.txt"]));
        assert!(cache.load("forest").is_none());
        assert!(cache.load("coast").is_none());
    }

    #[test]
    fn cache_is_isolated_per_instance() {
        let mut a = ManifestCache::new(Fixed(vec!["forestedge_side_a0_v1.png"]));
        let mut b = ManifestCache::default();
        assert_eq!(a.load("forest").unwrap().assets.all.len(), 1);
        assert!(b.load("forest").unwrap().assets.all.len() > 1);
    }
}
