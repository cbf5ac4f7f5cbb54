//! egui side panel: tool palette, region statistics and border controls.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::PainterState;
use crate::camera::ViewState;
use crate::terrain::{
    ActiveTool, ApplyRegionBorders, BorderApplication, MapBoard, PaintTool, RegionId,
    TerrainConfig, TerrainValue,
};

/// Tool palette and region panel.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectedRegion>()
            .add_systems(Update, toggle_inspector)
            .add_systems(
                EguiPrimaryContextPass,
                painter_panel.run_if(in_state(PainterState::Painting)),
            );
    }
}

/// Region picked in the region list.
#[derive(Resource, Default, Debug)]
pub struct SelectedRegion(pub Option<RegionId>);

fn swatch_button(ui: &mut egui::Ui, rgb: [u8; 3], selected: bool, label: &str) -> egui::Response {
    let fill = egui::Color32::from_rgb(rgb[0], rgb[1], rgb[2]);
    let button = egui::Button::new(label)
        .fill(fill)
        .selected(selected)
        .min_size(egui::vec2(28.0, 28.0));
    ui.add(button)
}

/// Tool selection, statistics and the apply-borders action.
#[allow(clippy::too_many_arguments)]
pub fn painter_panel(
    mut contexts: EguiContexts,
    cfg: Res<TerrainConfig>,
    board: Res<MapBoard>,
    view: Res<ViewState>,
    application: Res<BorderApplication>,
    mut tool: ResMut<ActiveTool>,
    mut selected: ResMut<SelectedRegion>,
    mut apply: MessageWriter<ApplyRegionBorders>,
) -> Result {
    let ctx = contexts.ctx_mut()?;
    let palette = &cfg.palette;

    egui::SidePanel::left("painter_panel")
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Terrain");
            ui.horizontal_wrapped(|ui| {
                for (name, rgb) in &palette.terrains {
                    let value = TerrainValue::texture(name);
                    let active = tool.0 == PaintTool::Terrain(value.clone());
                    if swatch_button(ui, *rgb, active, "")
                        .on_hover_text(name.as_str())
                        .clicked()
                    {
                        tool.0 = PaintTool::Terrain(value);
                    }
                }
            });

            ui.label("Colors");
            ui.horizontal_wrapped(|ui| {
                for rgb in &palette.colors {
                    let value = TerrainValue::Color { rgb: *rgb };
                    let active = tool.0 == PaintTool::Terrain(value.clone());
                    if swatch_button(ui, *rgb, active, "").clicked() {
                        tool.0 = PaintTool::Terrain(value);
                    }
                }
            });

            ui.label("Icons");
            ui.horizontal_wrapped(|ui| {
                for icon in &palette.icons {
                    let active = tool.0 == PaintTool::Icon(icon.clone());
                    if ui.selectable_label(active, icon.as_str()).clicked() {
                        tool.0 = PaintTool::Icon(icon.clone());
                    }
                }
            });

            ui.separator();
            ui.horizontal(|ui| {
                let erasing = tool.0 == PaintTool::Eraser;
                if ui.selectable_label(erasing, "Eraser").clicked() {
                    tool.0 = PaintTool::Eraser;
                }
                let mut color = match tool.0 {
                    PaintTool::Border(rgb) => rgb,
                    _ => cfg.borders.default_color,
                };
                let bordering = matches!(tool.0, PaintTool::Border(_));
                if ui.selectable_label(bordering, "Border").clicked() {
                    tool.0 = PaintTool::Border(color);
                }
                if ui.color_edit_button_srgb(&mut color).changed() {
                    tool.0 = PaintTool::Border(color);
                }
            });

            ui.separator();
            ui.heading("Regions");
            let stats = board.region_stats();
            ui.label(format!("Total: {}", stats.total_regions));
            ui.label(format!("Average size: {:.1}", stats.average_region_size));
            if let Some((id, size)) = stats.largest_region {
                ui.label(format!("Largest: {id} ({size} hexes)"));
            }
            for (terrain, count) in &stats.regions_by_terrain {
                ui.label(format!("  {terrain}: {count}"));
            }

            let mut regions: Vec<_> = board.regions().regions().collect();
            regions.sort_unstable_by_key(|r| r.id);
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                for region in regions {
                    let text = format!("{} {} ({})", region.id, region.terrain_type, region.size());
                    let picked = selected.0 == Some(region.id);
                    if ui.selectable_label(picked, text).clicked() {
                        selected.0 = Some(region.id);
                    }
                }
            });

            let target = selected.0.filter(|id| board.can_apply_borders(*id));
            let enabled = target.is_some() && !application.is_applying();
            let label = if application.is_applying() {
                format!("Applying… {} left", application.remaining())
            } else {
                "Apply region borders".to_string()
            };
            if ui.add_enabled(enabled, egui::Button::new(label)).clicked()
                && let Some(region) = target
            {
                apply.write(ApplyRegionBorders(region));
            }

            ui.separator();
            ui.small(format!(
                "{}x{} · zoom {:.1}",
                board.grid().width,
                board.grid().height,
                view.zoom_level
            ));
            ui.small("Shift-click a texture for its buttons. Tab: inspector.");
        });
    Ok(())
}

/// Tab switches between painting and the world inspector.
pub fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<PainterState>>,
    mut next: ResMut<NextState<PainterState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        let new_state = match state.get() {
            PainterState::Painting => PainterState::Inspecting,
            PainterState::Inspecting => PainterState::Painting,
        };
        info!("switching to {new_state:?}");
        next.set(new_state);
    }
}
