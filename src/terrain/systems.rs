use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContext;

use super::application::BorderApplication;
use super::board::MapBoard;
use super::entities::{ActiveTool, DragState, PaintTool};
use super::manifest::ManifestCache;
use super::{ApplyRegionBorders, TerrainConfig};
use crate::buttons::{HexButton, hex_button_at};
use crate::camera::GestureState;
use crate::edges::{EdgeKey, edge_from_mouse_pos};
use crate::math::hex_from_mouse_pos;
use crate::visuals::ViewGeometry;

/// Where the painting pointer is and whether it went down this frame.
struct Pointer {
    position: Vec2,
    just_pressed: bool,
}

fn painting_pointer(
    buttons: &ButtonInput<MouseButton>,
    touches: &Touches,
    window: &Window,
) -> Option<Pointer> {
    let mut active = touches.iter();
    if let (Some(touch), None) = (active.next(), active.next()) {
        return Some(Pointer {
            position: touch.position(),
            just_pressed: touches.just_pressed(touch.id()),
        });
    }
    if !buttons.pressed(MouseButton::Left) {
        return None;
    }
    Some(Pointer {
        position: window.cursor_position()?,
        just_pressed: buttons.just_pressed(MouseButton::Left),
    })
}

// ── Paint input ────────────────────────────────────────────────────

/// Turns left-button drags and single-finger touches into board edits.
///
/// A drag paints each hex, or with the border tool each edge, at most once.
/// Holding the button modifier on a textured hex routes the press to its
/// sub-hex buttons instead. Nothing is painted while a pinch is active or
/// the pointer is over an egui panel.
#[allow(clippy::too_many_arguments)]
pub fn paint_input(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut egui_ctx: Query<&mut EguiContext>,
    cfg: Res<TerrainConfig>,
    geometry: Res<ViewGeometry>,
    gesture: Res<GestureState>,
    tool: Res<ActiveTool>,
    mut drag: ResMut<DragState>,
    mut board: ResMut<MapBoard>,
    mut apply: MessageWriter<ApplyRegionBorders>,
) {
    if gesture.is_gesturing {
        drag.end();
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(pointer) = painting_pointer(&buttons, &touches, window) else {
        if drag.is_active() {
            drag.end();
        }
        return;
    };
    if pointer.just_pressed {
        if let Ok(mut ctx) = egui_ctx.single_mut()
            && ctx.get_mut().is_pointer_over_area()
        {
            return;
        }
        drag.begin();
    }
    if !drag.is_active() {
        return;
    }

    let radius = geometry.radius;
    let Vec2 { x, y } = pointer.position;

    if let PaintTool::Border(color) = tool.0 {
        let Some((from, to)) = edge_from_mouse_pos(x, y, &geometry.positions, radius, board.grid())
        else {
            return;
        };
        if !drag.visit_edge(EdgeKey::new(from, to)) {
            return;
        }
        if let Err(err) = board.on_edge_click(from, to, color) {
            warn!("border paint failed: {err}");
        }
        return;
    }

    let Some(hex) = hex_from_mouse_pos(x, y, &geometry.positions, radius) else {
        return;
    };
    let coord = hex.coord();

    if pointer.just_pressed
        && keys.pressed(cfg.button_modifier)
        && board.terrain_at(coord).is_texture()
    {
        drag.end();
        let button = hex_button_at(pointer.position, hex.center(), radius);
        let result = match button {
            Some(HexButton::Center) => {
                if let Some(region) = board.region_for_hex(coord) {
                    apply.write(ApplyRegionBorders(region));
                }
                Ok(())
            }
            Some(HexButton::Left) => board.rotate_texture(coord, -1).map(drop),
            Some(HexButton::Right) => board.rotate_texture(coord, 1).map(drop),
            None => Ok(()),
        };
        if let Err(err) = result {
            warn!("hex button on {coord} failed: {err}");
        }
        return;
    }

    if !drag.visit_hex(coord) {
        return;
    }
    if let Err(err) = board.on_hex_click(coord, &tool.0) {
        warn!("paint on {coord} failed: {err}");
    }
}

// ── Region borders ─────────────────────────────────────────────────

/// Starts a paced border run for each requested region.
pub fn start_border_application(
    mut requests: MessageReader<ApplyRegionBorders>,
    board: Res<MapBoard>,
    cfg: Res<TerrainConfig>,
    mut manifests: ResMut<ManifestCache>,
    mut application: ResMut<BorderApplication>,
) {
    for &ApplyRegionBorders(region) in requests.read() {
        if !board.can_apply_borders(region) {
            debug!("{region} does not take border textures");
            continue;
        }
        let started = board
            .region_border_placements(region, &mut manifests, cfg.borders.prefer_special)
            .and_then(|placements| application.start(region, placements));
        if let Err(err) = started {
            warn!("cannot border {region}: {err}");
        }
    }
}

/// Writes border placements as they come due.
pub fn tick_border_application(
    time: Res<Time>,
    mut application: ResMut<BorderApplication>,
    mut board: ResMut<MapBoard>,
) {
    if !application.is_applying() {
        return;
    }
    application.tick(time.delta(), &mut board);
}

#[cfg(test)]
mod tests {
    use bevy::input::InputPlugin;
    use bevy::input::touch::{TouchInput, TouchPhase};

    use super::*;
    use crate::buttons::hex_button_dimensions;
    use crate::camera::ViewState;
    use crate::edges::{EdgeRenderMode, shared_edge_vertices};
    use crate::grid::{GridSize, HexCoord};
    use crate::terrain::TerrainValue;

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    fn forest() -> TerrainValue {
        TerrainValue::texture("forest")
    }

    fn painter_app(board: MapBoard, tool: PaintTool) -> (App, Entity) {
        let geometry = ViewGeometry::compute(CANVAS, &board, &ViewState::default());
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, InputPlugin))
            .add_message::<ApplyRegionBorders>()
            .insert_resource(TerrainConfig::default())
            .insert_resource(geometry)
            .insert_resource(board)
            .insert_resource(ActiveTool(tool))
            .init_resource::<DragState>()
            .init_resource::<GestureState>()
            .add_systems(Update, paint_input);
        let window = app.world_mut().spawn((Window::default(), PrimaryWindow)).id();
        (app, window)
    }

    fn touch(app: &mut App, window: Entity, phase: TouchPhase, position: Vec2) {
        app.world_mut().write_message(TouchInput {
            phase,
            position,
            window,
            force: None,
            id: 0,
        });
        app.update();
    }

    fn center_of(app: &App, hex: HexCoord) -> Vec2 {
        let geometry = app.world().resource::<ViewGeometry>();
        geometry.positions.center_of(hex).unwrap()
    }

    // ── painting ────────────────────────────────────────────────────

    #[test]
    fn single_touch_paints_the_hex_under_it() {
        let hex = HexCoord::new(1, 1);
        let (mut app, window) = painter_app(MapBoard::new(GridSize::new(4, 4)), PaintTool::Terrain(forest()));
        let at = center_of(&app, hex);
        touch(&mut app, window, TouchPhase::Started, at);

        let board = app.world().resource::<MapBoard>();
        assert_eq!(board.terrain_at(hex), &forest());
    }

    #[test]
    fn nothing_paints_while_gesturing() {
        let hex = HexCoord::new(1, 1);
        let (mut app, window) = painter_app(MapBoard::new(GridSize::new(4, 4)), PaintTool::Terrain(forest()));
        app.world_mut().resource_mut::<GestureState>().is_gesturing = true;
        let at = center_of(&app, hex);
        touch(&mut app, window, TouchPhase::Started, at);
        touch(&mut app, window, TouchPhase::Moved, at + Vec2::X);

        let world = app.world();
        assert_eq!(world.resource::<MapBoard>().terrain_at(hex), &TerrainValue::Default);
        assert!(!world.resource::<DragState>().is_active());
    }

    #[test]
    fn border_drag_toggles_each_edge_once() {
        let (from, to) = (HexCoord::new(1, 1), HexCoord::new(2, 1));
        let color = [9, 9, 9];
        let (mut app, window) = painter_app(MapBoard::new(GridSize::new(4, 4)), PaintTool::Border(color));
        let mid = {
            let geometry = app.world().resource::<ViewGeometry>();
            shared_edge_vertices(from, to, geometry.radius, &geometry.positions, EdgeRenderMode::Live)
                .unwrap()
                .midpoint()
        };
        let key = EdgeKey::new(from, to);

        touch(&mut app, window, TouchPhase::Started, mid);
        touch(&mut app, window, TouchPhase::Moved, mid + Vec2::X);
        touch(&mut app, window, TouchPhase::Moved, mid);
        assert_eq!(
            app.world().resource::<MapBoard>().borders().get(&key).map(|b| b.color),
            Some(color)
        );

        // A second drag over the same edge removes the border.
        touch(&mut app, window, TouchPhase::Ended, mid);
        touch(&mut app, window, TouchPhase::Started, mid);
        assert!(app.world().resource::<MapBoard>().borders().is_empty());
    }

    // ── sub-hex buttons ─────────────────────────────────────────────

    #[test]
    fn modifier_right_button_rotates_instead_of_painting() {
        let hex = HexCoord::new(1, 1);
        let mut board = MapBoard::new(GridSize::new(4, 4));
        board.paint_hex(hex, forest()).unwrap();
        let tool = PaintTool::Terrain(TerrainValue::texture("plains"));
        let (mut app, window) = painter_app(board, tool);

        let modifier = app.world().resource::<TerrainConfig>().button_modifier;
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(modifier);
        let radius = app.world().resource::<ViewGeometry>().radius;
        let at = center_of(&app, hex) + Vec2::X * hex_button_dimensions(radius).side_offset;
        touch(&mut app, window, TouchPhase::Started, at);

        let board = app.world().resource::<MapBoard>();
        let TerrainValue::Texture { name, rotation, .. } = board.terrain_at(hex) else {
            panic!("texture was painted over");
        };
        assert_eq!(name, "forest");
        assert_eq!(*rotation, 1);
    }

    #[test]
    fn without_modifier_a_textured_hex_is_painted() {
        let hex = HexCoord::new(1, 1);
        let mut board = MapBoard::new(GridSize::new(4, 4));
        board.paint_hex(hex, forest()).unwrap();
        let plains = TerrainValue::texture("plains");
        let (mut app, window) = painter_app(board, PaintTool::Terrain(plains.clone()));

        let radius = app.world().resource::<ViewGeometry>().radius;
        let at = center_of(&app, hex) + Vec2::X * hex_button_dimensions(radius).side_offset;
        touch(&mut app, window, TouchPhase::Started, at);

        assert_eq!(app.world().resource::<MapBoard>().terrain_at(hex), &plains);
    }
}
