//! Region engine: maximal connected sets of same-terrain hexes.
//!
//! `regions` and `hex_to_region` are two arena maps that every mutating
//! method updates together, so `hex_to_region` is a pure index over
//! `regions`. Incremental updates (paint, erase) merge and split regions;
//! [`RegionMap::rebuild`] recomputes everything from the terrain map.

use std::collections::BTreeMap;
use std::fmt;

use bevy::platform::collections::{HashMap, HashSet};
use bevy::prelude::*;

use super::entities::TerrainMap;
use crate::grid::{GridSize, HexCoord, connected_component, hex_neighbors};

/// Identifier of a region. Not reused within one [`RegionMap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region-{}", self.0)
    }
}

/// A connected set of hexes sharing one base terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Region identifier.
    pub id: RegionId,
    /// Base terrain name shared by every hex.
    pub terrain_type: String,
    /// Member hexes; never empty.
    pub hexes: HashSet<HexCoord>,
    /// Revision at which the region was created.
    pub created_at: u64,
    /// Revision of the last change to `hexes`.
    pub updated_at: u64,
}

impl Region {
    /// Number of member hexes.
    pub fn size(&self) -> usize {
        self.hexes.len()
    }
}

/// Summary numbers for the region panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionStats {
    /// Number of regions.
    pub total_regions: usize,
    /// Region count per terrain type.
    pub regions_by_terrain: BTreeMap<String, usize>,
    /// Mean hexes per region, `0.0` with no regions.
    pub average_region_size: f32,
    /// Biggest region and its size. Ties go to the lowest id.
    pub largest_region: Option<(RegionId, usize)>,
}

/// All regions of a board.
#[derive(Clone, Debug, Default)]
pub struct RegionMap {
    regions: HashMap<RegionId, Region>,
    hex_to_region: HashMap<HexCoord, RegionId>,
    next_id: u32,
    revision: u64,
}

impl RegionMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Region containing `hex`, if any.
    pub fn region_for_hex(&self, hex: HexCoord) -> Option<RegionId> {
        self.hex_to_region.get(&hex).copied()
    }

    /// Region by id.
    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(&id)
    }

    /// All regions in unspecified order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// `true` with no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Logical clock value, bumped once per mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn tick(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }

    fn insert_region(&mut self, terrain_type: &str, hexes: HashSet<HexCoord>, now: u64) -> RegionId {
        let id = RegionId(self.next_id);
        self.next_id += 1;
        for hex in &hexes {
            self.hex_to_region.insert(*hex, id);
        }
        self.regions.insert(
            id,
            Region {
                id,
                terrain_type: terrain_type.to_string(),
                hexes,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }

    /// Adds an unassigned hex of `terrain_type`.
    ///
    /// Joins the single adjacent region of that terrain, starts a singleton
    /// region when there is none, and merges every adjacent region into the
    /// first one (in neighbor slot order) when the hex bridges several.
    pub fn add_hex(&mut self, hex: HexCoord, terrain_type: &str) -> RegionId {
        debug_assert!(
            !self.hex_to_region.contains_key(&hex),
            "{hex} is already in a region"
        );
        let now = self.tick();

        let mut adjacent: Vec<RegionId> = Vec::new();
        for neighbor in hex_neighbors(hex) {
            let Some(id) = self.hex_to_region.get(&neighbor) else {
                continue;
            };
            let same_terrain = self
                .regions
                .get(id)
                .is_some_and(|r| r.terrain_type == terrain_type);
            if same_terrain && !adjacent.contains(id) {
                adjacent.push(*id);
            }
        }

        let Some((&primary, others)) = adjacent.split_first() else {
            return self.insert_region(terrain_type, [hex].into_iter().collect(), now);
        };

        let mut absorbed = Vec::new();
        for other in others {
            if let Some(region) = self.regions.remove(other) {
                absorbed.extend(region.hexes);
            }
        }
        if !others.is_empty() {
            debug!(
                "merging {} regions into {primary} at {hex}",
                others.len() + 1
            );
        }
        for moved in absorbed.iter().copied().chain([hex]) {
            self.hex_to_region.insert(moved, primary);
        }
        if let Some(region) = self.regions.get_mut(&primary) {
            region.hexes.extend(absorbed);
            region.hexes.insert(hex);
            region.updated_at = now;
        }
        primary
    }

    /// Removes `hex` from its region, splitting the region when the removal
    /// disconnects it. Returns the region the hex belonged to.
    pub fn remove_hex(&mut self, hex: HexCoord, grid: GridSize) -> Option<RegionId> {
        let id = self.hex_to_region.remove(&hex)?;
        let now = self.tick();
        let Some(region) = self.regions.get_mut(&id) else {
            return Some(id);
        };
        region.hexes.remove(&hex);
        region.updated_at = now;

        match region.hexes.len() {
            0 => {
                self.regions.remove(&id);
                return Some(id);
            }
            1 => return Some(id),
            _ => {}
        }

        let Some(&seed) = region.hexes.iter().next() else {
            return Some(id);
        };
        let reached = connected_component(seed, grid, |c| region.hexes.contains(&c));
        if reached.len() == region.hexes.len() {
            return Some(id);
        }

        let Some(region) = self.regions.remove(&id) else {
            return Some(id);
        };
        let mut remaining = region.hexes;
        let mut pieces = 0;
        while let Some(&start) = remaining.iter().next() {
            let component = connected_component(start, grid, |c| remaining.contains(&c));
            remaining.retain(|c| !component.contains(c));
            self.insert_region(&region.terrain_type, component, now);
            pieces += 1;
        }
        debug!("{id} split into {pieces} regions after removing {hex}");
        Some(id)
    }

    /// Moves `hex` to `terrain_type` (`None` erases it).
    ///
    /// Repainting a hex with its current terrain leaves the regions alone.
    pub fn update_hex(&mut self, hex: HexCoord, terrain_type: Option<&str>, grid: GridSize) {
        let current = self
            .region_for_hex(hex)
            .and_then(|id| self.regions.get(&id))
            .map(|r| r.terrain_type.as_str());
        if current == terrain_type {
            return;
        }
        self.remove_hex(hex, grid);
        if let Some(terrain) = terrain_type {
            self.add_hex(hex, terrain);
        }
        self.debug_check_invariants(grid);
    }

    /// Recomputes all regions from scratch with one flood fill per component.
    pub fn rebuild(terrain: &TerrainMap, grid: GridSize) -> Self {
        let base: HashMap<HexCoord, String> = terrain
            .iter()
            .filter(|(coord, _)| grid.contains(**coord))
            .filter_map(|(coord, value)| Some((*coord, value.base_terrain()?)))
            .collect();

        let mut map = Self::new();
        let now = map.tick();
        let mut visited: HashSet<HexCoord> = HashSet::new();
        for coord in grid.iter() {
            if visited.contains(&coord) {
                continue;
            }
            let Some(kind) = base.get(&coord) else {
                continue;
            };
            let component =
                connected_component(coord, grid, |c| base.get(&c).is_some_and(|t| t == kind));
            visited.extend(component.iter().copied());
            map.insert_region(kind, component, now);
        }
        map.debug_check_invariants(grid);
        map
    }

    /// Aggregate numbers over all regions.
    pub fn stats(&self) -> RegionStats {
        let mut stats = RegionStats {
            total_regions: self.regions.len(),
            ..default()
        };
        let mut total_hexes = 0;
        for region in self.regions.values() {
            *stats
                .regions_by_terrain
                .entry(region.terrain_type.clone())
                .or_default() += 1;
            total_hexes += region.size();
            let larger = match stats.largest_region {
                None => true,
                Some((id, size)) => region.size() > size || (region.size() == size && region.id < id),
            };
            if larger {
                stats.largest_region = Some((region.id, region.size()));
            }
        }
        if stats.total_regions > 0 {
            stats.average_region_size = total_hexes as f32 / stats.total_regions as f32;
        }
        stats
    }

    /// First broken invariant, if any.
    ///
    /// Checks that both maps agree, that no region is empty, and that every
    /// region is connected.
    pub fn invariant_violation(&self, grid: GridSize) -> Option<String> {
        for (hex, id) in &self.hex_to_region {
            match self.regions.get(id) {
                None => return Some(format!("{hex} points at missing {id}")),
                Some(r) if !r.hexes.contains(hex) => {
                    return Some(format!("{hex} points at {id} which does not contain it"));
                }
                Some(_) => {}
            }
        }
        for region in self.regions.values() {
            let Some(&seed) = region.hexes.iter().next() else {
                return Some(format!("{} is empty", region.id));
            };
            for hex in &region.hexes {
                if self.hex_to_region.get(hex) != Some(&region.id) {
                    return Some(format!("{hex} in {} is not indexed to it", region.id));
                }
            }
            let reached = connected_component(seed, grid, |c| region.hexes.contains(&c));
            if reached.len() != region.hexes.len() {
                return Some(format!("{} is not connected", region.id));
            }
        }
        None
    }

    /// Panics in debug builds when an invariant is broken.
    pub fn debug_check_invariants(&self, grid: GridSize) {
        debug_assert_eq!(self.invariant_violation(grid), None, "region map invariant broken");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::entities::TerrainValue;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    fn h(row: i32, col: i32) -> HexCoord {
        HexCoord::new(row, col)
    }

    /// Regions as comparable (terrain, hexes) pairs, ids dropped.
    fn partition(map: &RegionMap) -> BTreeSet<(String, BTreeSet<HexCoord>)> {
        map.regions()
            .map(|r| (r.terrain_type.clone(), r.hexes.iter().copied().collect()))
            .collect()
    }

    struct Painter {
        grid: GridSize,
        terrain: TerrainMap,
        regions: RegionMap,
    }

    impl Painter {
        fn new(width: u32, height: u32) -> Self {
            Self {
                grid: GridSize::new(width, height),
                terrain: TerrainMap::new(),
                regions: RegionMap::new(),
            }
        }

        fn paint(&mut self, hex: HexCoord, name: &str) {
            let value = TerrainValue::texture(name);
            let base = value.base_terrain();
            self.terrain.insert(hex, value);
            self.regions.update_hex(hex, base.as_deref(), self.grid);
        }

        fn erase(&mut self, hex: HexCoord) {
            self.terrain.remove(&hex);
            self.regions.update_hex(hex, None, self.grid);
        }

        fn sizes(&self) -> Vec<usize> {
            let mut sizes: Vec<usize> = self.regions.regions().map(Region::size).collect();
            sizes.sort_unstable();
            sizes
        }
    }

    // ── add ─────────────────────────────────────────────────────────

    #[test]
    fn isolated_hex_starts_a_region() {
        let mut p = Painter::new(5, 5);
        p.paint(h(2, 2), "forest");
        let id = p.regions.region_for_hex(h(2, 2)).unwrap();
        let region = p.regions.region(id).unwrap();
        assert_eq!(region.terrain_type, "forest");
        assert_eq!(region.size(), 1);
        assert_eq!(id.to_string(), "region-0");
    }

    #[test]
    fn bridging_hex_merges_regions() {
        let mut p = Painter::new(8, 4);
        for col in 0..3 {
            p.paint(h(0, col), "forest");
        }
        p.paint(h(0, 4), "forest");
        p.paint(h(0, 5), "forest");
        assert_eq!(p.sizes(), vec![2, 3]);

        p.paint(h(0, 3), "forest");
        assert_eq!(p.regions.len(), 1);
        let id = p.regions.region_for_hex(h(0, 3)).unwrap();
        let merged = p.regions.region(id).unwrap();
        let expected: HashSet<HexCoord> = (0..6).map(|c| h(0, c)).collect();
        assert_eq!(merged.hexes, expected);
        for c in 0..6 {
            assert_eq!(p.regions.region_for_hex(h(0, c)), Some(id));
        }
    }

    #[test]
    fn different_terrain_does_not_join() {
        let mut p = Painter::new(4, 4);
        p.paint(h(0, 0), "forest");
        p.paint(h(0, 1), "plains");
        assert_eq!(p.regions.len(), 2);
    }

    #[test]
    fn border_texture_stays_in_its_region() {
        let mut p = Painter::new(4, 4);
        p.paint(h(0, 0), "forest");
        p.paint(h(0, 1), "forestedge_side_a0_v1");
        assert_eq!(p.regions.len(), 1);
    }

    #[test]
    fn color_paint_removes_hex_from_region() {
        let mut p = Painter::new(4, 4);
        p.paint(h(0, 0), "forest");
        p.terrain.insert(h(0, 0), TerrainValue::Color { rgb: [9, 9, 9] });
        p.regions.update_hex(h(0, 0), None, p.grid);
        assert!(p.regions.is_empty());
    }

    // ── remove ──────────────────────────────────────────────────────

    #[test]
    fn erasing_middle_of_line_splits() {
        let mut p = Painter::new(6, 3);
        for col in 0..5 {
            p.paint(h(0, col), "forest");
        }
        assert_eq!(p.sizes(), vec![5]);
        p.erase(h(0, 2));
        assert_eq!(p.sizes(), vec![2, 2]);
        assert_ne!(
            p.regions.region_for_hex(h(0, 0)),
            p.regions.region_for_hex(h(0, 4))
        );
    }

    #[test]
    fn erasing_end_of_line_keeps_one_region() {
        let mut p = Painter::new(6, 3);
        for col in 0..5 {
            p.paint(h(0, col), "forest");
        }
        let before = p.regions.region_for_hex(h(0, 0));
        p.erase(h(0, 4));
        assert_eq!(p.sizes(), vec![4]);
        assert_eq!(p.regions.region_for_hex(h(0, 0)), before);
    }

    #[test]
    fn erasing_last_hex_deletes_region() {
        let mut p = Painter::new(3, 3);
        p.paint(h(1, 1), "coast");
        p.erase(h(1, 1));
        assert!(p.regions.is_empty());
        assert_eq!(p.regions.region_for_hex(h(1, 1)), None);
    }

    #[test]
    fn three_by_three_plains() {
        let mut p = Painter::new(3, 3);
        for hex in [h(0, 0), h(0, 1), h(1, 0)] {
            p.paint(hex, "plains");
        }
        assert_eq!(p.sizes(), vec![3]);
        let id = p.regions.region_for_hex(h(0, 0)).unwrap();
        assert_eq!(p.regions.region(id).unwrap().terrain_type, "plains");

        // (0,0) and (1,0) share an edge in column 0.
        p.erase(h(0, 1));
        assert_eq!(p.sizes(), vec![2]);
    }

    #[test]
    fn updates_bump_revision() {
        let mut p = Painter::new(3, 3);
        p.paint(h(0, 0), "plains");
        let id = p.regions.region_for_hex(h(0, 0)).unwrap();
        let created = p.regions.region(id).unwrap().created_at;
        p.paint(h(1, 0), "plains");
        let region = p.regions.region(id).unwrap();
        assert_eq!(region.created_at, created);
        assert!(region.updated_at > created);
    }

    // ── rebuild ─────────────────────────────────────────────────────

    #[test]
    fn rebuild_is_idempotent() {
        let mut p = Painter::new(6, 6);
        for (hex, name) in [
            (h(0, 0), "forest"),
            (h(0, 1), "forest"),
            (h(3, 3), "forest"),
            (h(2, 2), "coast"),
            (h(5, 5), "plains_02"),
        ] {
            p.paint(hex, name);
        }
        let a = RegionMap::rebuild(&p.terrain, p.grid);
        let b = RegionMap::rebuild(&p.terrain, p.grid);
        assert_eq!(partition(&a), partition(&b));
        assert_eq!(partition(&a), partition(&p.regions));
    }

    #[test]
    fn rebuild_ignores_colors_and_out_of_bounds() {
        let mut terrain = TerrainMap::new();
        terrain.insert(h(0, 0), TerrainValue::Color { rgb: [1, 1, 1] });
        terrain.insert(h(9, 9), TerrainValue::texture("forest"));
        terrain.insert(h(1, 1), TerrainValue::texture("forest"));
        let map = RegionMap::rebuild(&terrain, GridSize::new(3, 3));
        assert_eq!(map.len(), 1);
        assert_eq!(map.region_for_hex(h(0, 0)), None);
    }

    // ── stats ───────────────────────────────────────────────────────

    #[test]
    fn stats_summarize_regions() {
        let mut p = Painter::new(8, 8);
        p.paint(h(0, 0), "forest");
        p.paint(h(0, 1), "forest");
        p.paint(h(0, 2), "forest");
        p.paint(h(5, 5), "forest");
        p.paint(h(7, 0), "coast");
        let stats = p.regions.stats();
        assert_eq!(stats.total_regions, 3);
        assert_eq!(stats.regions_by_terrain.get("forest"), Some(&2));
        assert_eq!(stats.regions_by_terrain.get("coast"), Some(&1));
        assert!((stats.average_region_size - 5.0 / 3.0).abs() < 1e-6);
        let (largest, size) = stats.largest_region.unwrap();
        assert_eq!(size, 3);
        assert_eq!(p.regions.region_for_hex(h(0, 0)), Some(largest));
    }

    #[test]
    fn empty_stats() {
        let stats = RegionMap::new().stats();
        assert_eq!(stats, RegionStats::default());
    }

    // ── partition property ──────────────────────────────────────────

    proptest! {
        #[test]
        fn incremental_matches_rebuild(
            ops in prop::collection::vec((0i32..6, 0i32..6, 0usize..4), 1..80),
        ) {
            let names = ["forest", "coast", "plains"];
            let mut p = Painter::new(6, 6);
            for (row, col, pick) in ops {
                match names.get(pick) {
                    Some(name) => p.paint(h(row, col), name),
                    None => p.erase(h(row, col)),
                }
            }
            prop_assert_eq!(p.regions.invariant_violation(p.grid), None);
            let rebuilt = RegionMap::rebuild(&p.terrain, p.grid);
            prop_assert_eq!(partition(&p.regions), partition(&rebuilt));
        }
    }
}
