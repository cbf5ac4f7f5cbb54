use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use super::board::MapBoard;
use super::entities::{TerrainMap, TerrainValue};
use super::{GridSettings, TerrainConfig};
use crate::grid::GridSize;
use crate::math;

/// Terrain bands of the starter map, lowest first, with their upper bound
/// on the `[0, 1]` noise scale.
const STARTER_BANDS: [(&str, f32); 4] = [
    ("coast", 0.35),
    ("plains", 0.55),
    ("forest", 0.75),
    ("mountain", 1.0),
];

/// Samples fractal noise per hex and bands it into terrain textures.
///
/// The same seed and settings always yield the same map.
pub fn noise_terrain(grid: GridSize, settings: &GridSettings, seed: u32) -> TerrainMap {
    let fbm: Fbm<Perlin> = Fbm::new(seed).set_octaves(settings.noise_octaves);
    let scale = settings.noise_scale.max(f64::EPSILON);

    grid.iter()
        .map(|coord| {
            let sample = fbm.get([coord.col as f64 / scale, coord.row as f64 / scale]);
            let level = math::map_noise_to_range(sample.clamp(-1.0, 1.0), 0.0, 1.0);
            let name = STARTER_BANDS
                .iter()
                .find(|(_, upper)| level <= *upper)
                .map_or("mountain", |(name, _)| *name);
            (coord, TerrainValue::texture(name))
        })
        .collect()
}

/// Fills the board from noise when a seed is configured.
pub fn seed_board(cfg: Res<TerrainConfig>, mut board: ResMut<MapBoard>) {
    let Some(seed) = cfg.grid.noise_seed else {
        info!(
            "starting with an empty {}x{} board",
            cfg.grid.width, cfg.grid.height
        );
        return;
    };

    let grid = board.grid();
    let mut snapshot = board.snapshot();
    snapshot.terrain = noise_terrain(grid, &cfg.grid, seed);
    *board = MapBoard::from_snapshot(snapshot);
    info!(
        "seeded {}x{} board from noise seed {seed}: {} regions",
        grid.width,
        grid.height,
        board.regions().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GridSettings {
        TerrainConfig::default().grid
    }

    #[test]
    fn same_seed_same_map() {
        let grid = GridSize::new(12, 9);
        let a = noise_terrain(grid, &settings(), 7);
        let b = noise_terrain(grid, &settings(), 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), grid.len());
    }

    #[test]
    fn starter_map_uses_known_terrains() {
        let map = noise_terrain(GridSize::new(10, 10), &settings(), 3);
        for value in map.values() {
            let base = value.base_terrain().unwrap();
            assert!(STARTER_BANDS.iter().any(|(name, _)| *name == base), "{base}");
        }
    }
}
