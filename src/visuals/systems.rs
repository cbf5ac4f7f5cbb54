use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

use bevy::asset::RenderAssetUsages;
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_egui::egui;
use hexx::{HexLayout, HexOrientation, PlaneMeshBuilder};

use super::VisualsConfig;
use super::entities::{HexTile, RedrawThrottle, ViewGeometry, window_canvas_size};
use crate::buttons::{HexButton, hex_button_dimensions};
use crate::camera::ViewState;
use crate::math::{hex_corners, hex_from_mouse_pos};
use crate::terrain::{MapBoard, TerrainConfig, TerrainValue};

fn srgb(rgb: [u8; 3]) -> Color {
    Color::srgb_u8(rgb[0], rgb[1], rgb[2])
}

fn closed_loop<const N: usize>(points: [Vec2; N]) -> impl Iterator<Item = Vec2> {
    let first = points.first().copied();
    points.into_iter().chain(first)
}

// ── Startup ─────────────────────────────────────────────────────────

/// Spawns one flat-top hex mesh per grid cell, hidden until laid out.
pub fn spawn_tiles(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    board: Res<MapBoard>,
    cfg: Res<VisualsConfig>,
) {
    let unit_layout = HexLayout {
        orientation: HexOrientation::Flat,
        scale: Vec2::splat(1.0),
        ..default()
    };
    let hex_mesh_info = PlaneMeshBuilder::new(&unit_layout).build();
    let hex_mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, hex_mesh_info.vertices)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, hex_mesh_info.normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, hex_mesh_info.uvs)
    .with_inserted_indices(Indices::U16(hex_mesh_info.indices));
    let hex_mesh_handle = meshes.add(hex_mesh);

    let grid = board.grid();
    for coord in grid.iter() {
        commands.spawn((
            Name::new(format!("Hex {coord}")),
            HexTile { coord },
            Mesh2d(hex_mesh_handle.clone()),
            MeshMaterial2d(materials.add(ColorMaterial::from_color(cfg.empty_color))),
            // The plane mesh lies in XZ; tip it up to face the 2D camera.
            Transform::from_rotation(Quat::from_rotation_x(FRAC_PI_2)),
            Visibility::Hidden,
        ));
    }
    info!("spawned {} hex tiles", grid.len());
}

// ── Geometry ────────────────────────────────────────────────────────

/// Recomputes [`ViewGeometry`] when a redraw is pending.
///
/// Window resizes and board edits request a redraw here; pan and zoom
/// request one from the camera systems. However many requests arrive in a
/// frame, the geometry is rebuilt once.
pub fn refresh_geometry(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut resized: MessageReader<WindowResized>,
    board: Res<MapBoard>,
    view: Res<ViewState>,
    mut throttle: ResMut<RedrawThrottle>,
    mut geometry: ResMut<ViewGeometry>,
) {
    if resized.read().count() > 0 || board.is_changed() {
        throttle.request();
    }
    if !throttle.is_pending() {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    throttle.take();
    *geometry = ViewGeometry::compute(window_canvas_size(window), &board, &view);
    debug!(
        "view geometry refreshed: radius {:.1}, {} borders",
        geometry.radius,
        geometry.borders.len()
    );
}

// ── Draw ────────────────────────────────────────────────────────────

/// Moves, scales and recolors tiles after a geometry refresh or board edit.
pub fn sync_tiles(
    geometry: Res<ViewGeometry>,
    board: Res<MapBoard>,
    terrain_cfg: Res<TerrainConfig>,
    cfg: Res<VisualsConfig>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut tiles: Query<(
        &HexTile,
        &mut Transform,
        &mut Visibility,
        &MeshMaterial2d<ColorMaterial>,
    )>,
) {
    if !geometry.is_changed() && !board.is_changed() {
        return;
    }
    let scale = geometry.radius * cfg.tile_scale;
    for (tile, mut transform, mut visibility, material) in &mut tiles {
        let Some(center) = geometry.positions.center_of(tile.coord) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        transform.translation = geometry.canvas_to_world(center).extend(0.0);
        transform.scale = Vec3::splat(scale);
        *visibility = Visibility::Visible;

        let color = board
            .hex_background_color(tile.coord, &terrain_cfg.palette)
            .map_or(cfg.empty_color, srgb);
        if let Some(mat) = materials.get_mut(&material.0) {
            mat.color = color;
        }
    }
}

/// Hex outlines, texture rotation ticks and painted borders.
pub fn draw_overlay(
    mut gizmos: Gizmos,
    geometry: Res<ViewGeometry>,
    board: Res<MapBoard>,
    cfg: Res<VisualsConfig>,
) {
    let radius = geometry.radius;
    if radius <= 0.0 {
        return;
    }

    for pos in geometry.positions.iter() {
        let corners = hex_corners(pos.center(), radius).map(|c| geometry.canvas_to_world(c));
        gizmos.linestrip_2d(closed_loop(corners), cfg.outline_color);

        if !cfg.show_rotation_marks {
            continue;
        }
        if let TerrainValue::Texture { rotation, flipped, .. } = board.terrain_at(pos.coord()) {
            let angle = f32::from(*rotation) * FRAC_PI_3;
            let center = geometry.canvas_to_world(pos.center());
            let tip = center + Vec2::from_angle(angle) * radius * 0.5;
            let color = if *flipped {
                cfg.outline_color.with_alpha(0.9)
            } else {
                cfg.outline_color
            };
            gizmos.line_2d(center, tip, color);
        }
    }

    for border in &geometry.borders {
        gizmos.line_2d(
            geometry.canvas_to_world(border.segment.start),
            geometry.canvas_to_world(border.segment.end),
            srgb(border.color),
        );
    }
}

/// Highlights the hex under the cursor and, with the button modifier held
/// over a texture, its sub-hex buttons.
pub fn draw_hover(
    mut gizmos: Gizmos,
    windows: Query<&Window, With<PrimaryWindow>>,
    keys: Res<ButtonInput<KeyCode>>,
    geometry: Res<ViewGeometry>,
    board: Res<MapBoard>,
    terrain_cfg: Res<TerrainConfig>,
    cfg: Res<VisualsConfig>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let radius = geometry.radius;
    let Some(hex) = hex_from_mouse_pos(cursor.x, cursor.y, &geometry.positions, radius) else {
        return;
    };

    let corners = hex_corners(hex.center(), radius).map(|c| geometry.canvas_to_world(c));
    gizmos.linestrip_2d(closed_loop(corners), cfg.hover_color);

    if !keys.pressed(terrain_cfg.button_modifier) || !board.terrain_at(hex.coord()).is_texture() {
        return;
    }
    let dims = hex_button_dimensions(radius);
    for button in HexButton::ALL {
        match button {
            HexButton::Center => {
                let center = geometry.canvas_to_world(dims.button_center(button, hex.center()));
                gizmos.circle_2d(center, dims.center_diameter / 2.0, cfg.button_color);
            }
            HexButton::Left | HexButton::Right => {
                let outline = dims
                    .side_outline(button, hex.center())
                    .map(|p| geometry.canvas_to_world(p));
                gizmos.linestrip_2d(closed_loop(outline), cfg.button_color);
            }
        }
    }
}

/// Paints hex icons as egui text at their hex centers.
pub fn draw_icon_labels(
    mut egui_ctx: Query<&mut bevy_egui::EguiContext>,
    geometry: Res<ViewGeometry>,
    board: Res<MapBoard>,
    cfg: Res<VisualsConfig>,
    mut ready: Local<bool>,
) {
    if !*ready {
        *ready = true;
        return;
    }
    if board.icons().is_empty() {
        return;
    }
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());
    let size = (geometry.radius * cfg.icon_scale).max(6.0);

    for (coord, icon) in board.icons() {
        let Some(center) = geometry.positions.center_of(*coord) else {
            continue;
        };
        painter.text(
            egui::pos2(center.x, center.y),
            egui::Align2::CENTER_CENTER,
            icon.as_str(),
            egui::FontId::proportional(size),
            egui::Color32::BLACK,
        );
    }
}
