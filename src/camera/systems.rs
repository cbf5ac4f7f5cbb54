use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::CameraConfig;
use super::entities::{GestureState, PainterCamera, PinchUpdate, ViewState};
use super::view;
use crate::math::calculate_hex_radius;
use crate::terrain::MapBoard;
use crate::visuals::{RedrawThrottle, window_canvas_size};

/// Spawns the 2D camera that renders the painter canvas.
pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("PainterCamera"), Camera2d, PainterCamera));
}

fn apply_step(view: &mut ViewState, step: view::ZoomStep, throttle: &mut RedrawThrottle) {
    if view.zoom_level == step.zoom && view.pan_offset == step.pan_offset {
        return;
    }
    view.zoom_level = step.zoom;
    view.pan_offset = step.pan_offset;
    throttle.request();
}

/// Mouse wheel zooms toward the cursor, one step per frame with input.
pub fn zoom_on_scroll(
    mut scroll: MessageReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    board: Res<MapBoard>,
    cfg: Res<CameraConfig>,
    mut view: ResMut<ViewState>,
    mut throttle: ResMut<RedrawThrottle>,
) {
    let lines: f32 = scroll
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y / cfg.scroll_pixels_per_line,
        })
        .sum();
    if lines == 0.0 {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    let step = view::calculate_zoom_to_point(
        view.zoom_level,
        lines.signum(),
        cursor,
        view.pan_offset,
        window_canvas_size(window),
        board.grid(),
        &cfg.zoom,
    );
    apply_step(&mut view, step, &mut throttle);
}

/// Dragging with the pan button moves the grid within its pan limits.
pub fn pan_on_drag(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    board: Res<MapBoard>,
    cfg: Res<CameraConfig>,
    mut gesture: ResMut<GestureState>,
    mut view: ResMut<ViewState>,
    mut throttle: ResMut<RedrawThrottle>,
) {
    if !buttons.pressed(cfg.pan_button) {
        gesture.drag_anchor = None;
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Some(anchor) = gesture.drag_anchor.replace(cursor) else {
        return;
    };

    let delta = cursor - anchor;
    if delta == Vec2::ZERO {
        return;
    }
    let canvas = window_canvas_size(window);
    let grid = board.grid();
    let radius = calculate_hex_radius(canvas, grid, view.zoom_level);
    let pan_offset = view::constrain_pan_offset(
        view.pan_offset + delta,
        radius,
        grid,
        canvas,
        view.zoom_level,
        &cfg.zoom,
    );
    let step = view::ZoomStep {
        zoom: view.zoom_level,
        pan_offset,
    };
    apply_step(&mut view, step, &mut throttle);
}

/// Two-finger pinch zoom around the pinch center.
///
/// See [`GestureState::track`] for the gesture lifecycle. Touches are
/// sorted by id so the same pair is seen in the same order every frame.
pub fn pinch_zoom(
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    board: Res<MapBoard>,
    cfg: Res<CameraConfig>,
    mut gesture: ResMut<GestureState>,
    mut view: ResMut<ViewState>,
    mut throttle: ResMut<RedrawThrottle>,
) {
    let mut fingers: Vec<(u64, Vec2)> = touches.iter().map(|t| (t.id(), t.position())).collect();
    fingers.sort_unstable_by_key(|(id, _)| *id);

    let (target, focus) = match gesture.track(&fingers, view.zoom_level) {
        PinchUpdate::Idle => return,
        PinchUpdate::Started => {
            debug!("pinch started at zoom {:.2}", view.zoom_level);
            return;
        }
        PinchUpdate::Ended => {
            throttle.request();
            debug!("pinch ended at zoom {:.2}", view.zoom_level);
            return;
        }
        PinchUpdate::Zoom { target, focus } => (target, focus),
    };

    let Ok(window) = windows.single() else {
        return;
    };
    let step = view::zoom_to_level(
        view.zoom_level,
        target,
        focus,
        view.pan_offset,
        window_canvas_size(window),
        board.grid(),
        &cfg.zoom,
    );
    apply_step(&mut view, step, &mut throttle);
}

#[cfg(test)]
mod tests {
    use bevy::input::InputPlugin;
    use bevy::input::touch::{TouchInput, TouchPhase};

    use super::*;
    use crate::grid::GridSize;

    fn pinch_app() -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin))
            .insert_resource(MapBoard::new(GridSize::new(20, 20)))
            .insert_resource(CameraConfig::default())
            .init_resource::<ViewState>()
            .init_resource::<GestureState>()
            .init_resource::<RedrawThrottle>()
            .add_systems(Update, pinch_zoom);
        let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
        (app, window)
    }

    fn touches(app: &mut App, window: Entity, events: &[(u64, TouchPhase, Vec2)]) {
        for &(id, phase, position) in events {
            app.world_mut().write_message(TouchInput {
                phase,
                position,
                window,
                force: None,
                id,
            });
        }
        app.update();
    }

    fn zoom(app: &App) -> f32 {
        app.world().resource::<ViewState>().zoom_level
    }

    #[test]
    fn replacing_a_lifted_finger_does_not_jump_the_zoom() {
        use TouchPhase::*;
        let (mut app, window) = pinch_app();
        let a = Vec2::new(500.0, 300.0);

        touches(&mut app, window, &[(0, Started, a), (1, Started, Vec2::new(600.0, 300.0))]);
        touches(&mut app, window, &[(1, Moved, Vec2::new(700.0, 300.0))]);
        assert!((zoom(&app) - 2.0).abs() < 1e-4);

        touches(&mut app, window, &[(1, Ended, Vec2::new(700.0, 300.0))]);
        assert!(app.world().resource::<GestureState>().is_gesturing);

        // Finger C lands 700px from A; read against the old pair it would
        // jump straight to the zoom limit.
        let c = Vec2::new(1200.0, 300.0);
        touches(&mut app, window, &[(2, Started, c)]);
        touches(&mut app, window, &[]);
        assert!((zoom(&app) - 2.0).abs() < 1e-4);

        app.world_mut().resource_mut::<RedrawThrottle>().take();
        touches(&mut app, window, &[(0, Ended, a), (2, Ended, c)]);
        let gesture = app.world().resource::<GestureState>();
        assert!(!gesture.is_gesturing);
        assert!(gesture.pinch.is_none());
        assert!(app.world().resource::<RedrawThrottle>().is_pending());
    }

    #[test]
    fn spreading_fingers_zooms_in() {
        use TouchPhase::*;
        let (mut app, window) = pinch_app();
        touches(
            &mut app,
            window,
            &[(0, Started, Vec2::new(600.0, 360.0)), (1, Started, Vec2::new(680.0, 360.0))],
        );
        assert_eq!(zoom(&app), 1.0);
        touches(&mut app, window, &[(1, Moved, Vec2::new(720.0, 360.0))]);
        assert!((zoom(&app) - 1.5).abs() < 1e-4);
    }
}
