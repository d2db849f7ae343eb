//! dvd-idle: a page that turns into a bouncing-logo screensaver when left alone.

mod celebration;
mod config;
mod idle;
mod motion;
mod page;
mod screensaver;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy::asset::AssetPlugin;
use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::window::{WindowMode, WindowResizeConstraints, WindowResolution};
use clap::Parser;

use crate::celebration::CelebrationPlugin;
use crate::config::Config;
use crate::idle::IdlePlugin;
use crate::page::PagePlugin;
use crate::screensaver::{
    SaverAssets, ScreensaverPlugin, LOGO_FRAME, LOGO_SHEET_COLS, LOGO_SHEET_ROWS,
};

// ===== Asset paths (relative to the asset dir) =====
const LOGO_IMAGE: &str = "images/dvd-logo.png";
const MASCOT_IMAGE: &str = "images/mascot.png";
const PARTY_SOUND: &str = "sounds/win.mp3";
const TRIUMPH_SOUND: &str = "sounds/parkour.mp3";

const PAGE_BACKGROUND: Color = Color::srgb(0.07, 0.07, 0.09);

/// Idle screensaver with a bouncing logo.
#[derive(Parser, Debug)]
#[command(name = "dvd-idle")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Override the idle delay in milliseconds.
    #[arg(long)]
    idle_delay_ms: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level: Level = args
        .log_level
        .parse()
        .with_context(|| format!("Invalid log level: {}", args.log_level))?;

    let mut config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(ms) = args.idle_delay_ms {
        config.idle_delay_ms = ms;
    }
    config.validate().context("Invalid configuration")?;

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(LogPlugin {
                level,
                filter: "wgpu=error,naga=warn".into(),
                ..default()
            })
            .set(AssetPlugin {
                file_path: config.asset_dir.clone(),
                ..default()
            })
            // crisp pixels
            .set(ImagePlugin::default_nearest())
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "dvd-idle".into(),
                    name: Some("dvd-idle".into()),
                    resolution: WindowResolution::new(config.window_width, config.window_height),
                    resizable: true,
                    // the logo box must always fit
                    resize_constraints: WindowResizeConstraints {
                        min_width: config.box_width,
                        min_height: config.box_height,
                        ..default()
                    },
                    mode: WindowMode::Windowed,
                    ..default()
                }),
                ..default()
            }),
    )
    .insert_resource(ClearColor(PAGE_BACKGROUND))
    .insert_resource(config.clone())
    .add_plugins((PagePlugin, ScreensaverPlugin, IdlePlugin, CelebrationPlugin))
    .add_systems(Startup, (setup_camera, load_assets));

    info!(
        "dvd-idle v{} starting, screensaver after {:?} of inactivity",
        env!("CARGO_PKG_VERSION"),
        config.idle_delay()
    );

    match app.run() {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("dvd-idle exited with code {}", code),
    }
}

/// Camera so sprites can be drawn
fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2dBundle::default());
}

/// Queue images and sounds and cut the logo sheet into frames.
/// Anything missing just fails to show or play.
fn load_assets(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut assets: ResMut<SaverAssets>,
) {
    assets.logo = asset_server.load(LOGO_IMAGE);
    let layout =
        TextureAtlasLayout::from_grid(LOGO_FRAME, LOGO_SHEET_COLS, LOGO_SHEET_ROWS, None, None);
    assets.logo_layout = layouts.add(layout);
    assets.mascot = asset_server.load(MASCOT_IMAGE);
    assets.party = asset_server.load(PARTY_SOUND);
    assets.triumph = asset_server.load(TRIUMPH_SOUND);
}
