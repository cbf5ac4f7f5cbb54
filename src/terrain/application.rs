use std::collections::VecDeque;
use std::time::Duration;

use bevy::prelude::*;

use super::board::{MapBoard, MapError};
use super::region_borders::BorderPlacement;
use super::regions::RegionId;

/// Paced application of region border placements.
///
/// Placements are written one per `delay` so the border visibly grows
/// around the region. Once started the run cannot be cancelled; it ends when
/// the queue is drained or a placement fails. A failure leaves the earlier
/// placements on the board.
#[derive(Resource, Debug)]
pub struct BorderApplication {
    queue: VecDeque<BorderPlacement>,
    timer: Timer,
    region: Option<RegionId>,
}

impl Default for BorderApplication {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

impl BorderApplication {
    /// Idle application with the given pacing.
    pub fn new(delay: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            timer: Timer::new(delay, TimerMode::Repeating),
            region: None,
        }
    }

    /// Whether a run is in progress.
    pub fn is_applying(&self) -> bool {
        self.region.is_some()
    }

    /// Region being bordered, if any.
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    /// Placements still queued.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Queues `placements` for `region`.
    ///
    /// Returns the number queued. An empty list finishes immediately.
    pub fn start(
        &mut self,
        region: RegionId,
        placements: Vec<BorderPlacement>,
    ) -> Result<usize, MapError> {
        if self.is_applying() {
            return Err(MapError::AlreadyApplying);
        }
        let count = placements.len();
        if count == 0 {
            debug!("{region} has no border placements");
            return Ok(0);
        }
        info!("applying {count} border textures to {region}");
        self.queue = placements.into();
        self.timer.reset();
        self.region = Some(region);
        Ok(count)
    }

    /// Advances the pacing timer and writes every placement that came due.
    ///
    /// Returns how many placements were written this call.
    pub fn tick(&mut self, delta: Duration, board: &mut MapBoard) -> usize {
        let Some(region) = self.region else {
            return 0;
        };
        self.timer.tick(delta);

        let mut applied = 0;
        for _ in 0..self.timer.times_finished_this_tick() {
            let Some(placement) = self.queue.pop_front() else {
                break;
            };
            if let Err(err) = board.apply_border_placement(&placement) {
                warn!("border application for {region} stopped: {err}");
                self.finish();
                return applied;
            }
            applied += 1;
        }

        if self.queue.is_empty() {
            debug!("border application for {region} finished");
            self.finish();
        }
        applied
    }

    fn finish(&mut self) {
        self.queue.clear();
        self.region = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridSize, HexCoord};
    use crate::terrain::entities::TerrainValue;

    const STEP: Duration = Duration::from_millis(50);

    fn placement(row: i32, col: i32) -> BorderPlacement {
        BorderPlacement {
            hex: HexCoord::new(row, col),
            slot: 0,
            texture: "forestedge_side_a0_v1".into(),
            path: "terrain/forestedge_side_a0_v1.png".into(),
            rotation: 0,
            flipped: false,
        }
    }

    #[test]
    fn applies_one_placement_per_delay() {
        let mut board = MapBoard::new(GridSize::new(4, 4));
        let mut app = BorderApplication::new(STEP);
        let queued = app
            .start(RegionId(0), vec![placement(0, 0), placement(0, 1), placement(0, 2)])
            .unwrap();
        assert_eq!(queued, 3);

        assert_eq!(app.tick(Duration::from_millis(20), &mut board), 0);
        assert_eq!(app.tick(Duration::from_millis(30), &mut board), 1);
        assert!(board.terrain_at(HexCoord::new(0, 0)).is_texture());
        assert!(app.is_applying());

        assert_eq!(app.tick(STEP * 2, &mut board), 2);
        assert!(!app.is_applying());
        assert_eq!(app.remaining(), 0);
    }

    #[test]
    fn refuses_to_start_twice() {
        let mut app = BorderApplication::new(STEP);
        app.start(RegionId(0), vec![placement(0, 0)]).unwrap();
        assert_eq!(
            app.start(RegionId(1), vec![placement(1, 1)]),
            Err(MapError::AlreadyApplying)
        );
        assert_eq!(app.region(), Some(RegionId(0)));
    }

    #[test]
    fn failure_stops_but_keeps_earlier_writes() {
        let mut board = MapBoard::new(GridSize::new(2, 2));
        let mut app = BorderApplication::new(STEP);
        app.start(
            RegionId(0),
            vec![placement(0, 0), placement(9, 9), placement(1, 1)],
        )
        .unwrap();

        assert_eq!(app.tick(STEP * 3, &mut board), 1);
        assert!(!app.is_applying());
        assert!(board.terrain_at(HexCoord::new(0, 0)).is_texture());
        assert_eq!(board.terrain_at(HexCoord::new(1, 1)), &TerrainValue::Default);
        // The flag is cleared, so a new run may start.
        assert!(app.start(RegionId(0), vec![placement(1, 1)]).is_ok());
    }

    #[test]
    fn empty_run_does_not_block() {
        let mut app = BorderApplication::new(STEP);
        assert_eq!(app.start(RegionId(3), Vec::new()), Ok(0));
        assert!(!app.is_applying());
    }
}
