//! Hex map painter binary.

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;
use hex_painter::{PainterConfig, PainterPlugin, PainterState};

/// Command-line overrides for the board.
#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(version, about = "Paint terrain regions on a hex grid")]
struct Cli {
    /// Grid columns.
    #[arg(long)]
    width: Option<u32>,
    /// Grid rows.
    #[arg(long)]
    height: Option<u32>,
    /// Seed a starter map from noise.
    #[arg(long)]
    seed: Option<u32>,
}

fn config() -> PainterConfig {
    #[allow(unused_mut)]
    let mut cfg = PainterConfig::default();
    #[cfg(feature = "native")]
    {
        use clap::Parser;
        let cli = Cli::parse();
        let grid = &mut cfg.terrain.grid;
        grid.width = cli.width.unwrap_or(grid.width).clamp(1, 100);
        grid.height = cli.height.unwrap_or(grid.height).clamp(1, 100);
        grid.noise_seed = cli.seed.or(grid.noise_seed);
    }
    cfg
}

fn main() {
    let cfg = config();
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex Painter".into(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(PainterPlugin(cfg))
    .add_systems(Update, exit_on_esc)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(PainterState::Inspecting)));

    #[cfg(feature = "native")]
    app.add_plugins(bevy::remote::RemotePlugin::default())
        .add_plugins(bevy::remote::http::RemoteHttpPlugin::default());

    app.run();
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
