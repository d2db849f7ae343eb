//! Corner-hit celebration: confetti burst, sounds and the sliding mascot.
//!
//! Everything here is best effort. Missing images or sounds only show up as
//! asset warnings and never hold up the bounce loop.

use std::time::Duration;

use bevy::color::Alpha;
use bevy::prelude::*;
use rand::Rng;

use crate::config::Config;
use crate::screensaver::{SaverAssets, SaverRng, SaverSet, Viewport};

// ===== Mascot =====
pub const MASCOT_SIZE: Vec2 = Vec2::new(240.0, 300.0);
const SLIDE_SECS: f32 = 0.5;

// ===== Confetti (per-frame units at 60 fps) =====
const FRAME_RATE: f32 = 60.0;
const LAUNCH_ANGLE_DEG: f32 = 90.0;
const SPREAD_DEG: f32 = 360.0;
const START_VELOCITY: f32 = 45.0;
const DECAY: f32 = 0.9;
const GRAVITY: f32 = 3.0;
const LIFETIME_FRAMES: f32 = 200.0;
const PARTICLE_SIZE: Vec2 = Vec2::new(10.0, 6.0);
const Z_CONFETTI: f32 = 20.0;

const CONFETTI_COLORS: [[u8; 3]; 7] = [
    [0x26, 0xcc, 0xff],
    [0xa2, 0x5a, 0xfd],
    [0xff, 0x5e, 0x7e],
    [0x88, 0xff, 0x5a],
    [0xfc, 0xff, 0x42],
    [0xff, 0xa6, 0x2d],
    [0xff, 0x36, 0xff],
];

/// Both axes bounced (near) simultaneously.
#[derive(Event, Clone, Copy, Debug)]
pub struct CornerBounce;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CueKind {
    Triumph,
    HideMascot,
}

/// Delayed follow-up of a corner hit. Lives on its own entity so it keeps
/// running after the screensaver goes away.
#[derive(Component, Debug)]
pub struct Cue {
    kind: CueKind,
    timer: Timer,
}

impl Cue {
    pub fn new(kind: CueKind, delay: Duration) -> Self {
        Self {
            kind,
            timer: Timer::new(delay, TimerMode::Once),
        }
    }
}

#[derive(Component)]
pub struct PartySound;

#[derive(Component)]
pub struct TriumphSound;

/// Slide state of the mascot: `progress` 0 = fully below the screen, 1 = fully up.
#[derive(Component, Default, Debug)]
pub struct Mascot {
    shown: bool,
    progress: f32,
}

impl Mascot {
    pub fn show(&mut self) {
        self.shown = true;
    }

    pub fn hide(&mut self) {
        self.shown = false;
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Move toward the target; returns the eased amount showing.
    pub fn slide(&mut self, dt: f32) -> f32 {
        let step = dt / SLIDE_SECS;
        self.progress = if self.shown {
            (self.progress + step).min(1.0)
        } else {
            (self.progress - step).max(0.0)
        };
        let t = self.progress;
        t * t * (3.0 - 2.0 * t)
    }
}

/// Bottom-anchored, left edge at a quarter of the width minus half the box.
pub fn mascot_translation(viewport: Vec2, box_width: f32, showing: f32) -> Vec2 {
    let left = viewport.x * 0.25 - box_width / 2.0;
    Vec2::new(
        left + MASCOT_SIZE.x / 2.0 - viewport.x / 2.0,
        -viewport.y / 2.0 + MASCOT_SIZE.y / 2.0 - (1.0 - showing) * MASCOT_SIZE.y,
    )
}

#[derive(Component)]
pub struct Confetti {
    velocity: Vec2, // px per frame
    life: Timer,
}

/// Launch velocity: random direction within the spread, random speed.
pub fn launch<R: Rng>(rng: &mut R) -> Vec2 {
    let angle = LAUNCH_ANGLE_DEG + (rng.random::<f32>() - 0.5) * SPREAD_DEG;
    let speed = START_VELOCITY * 0.5 + rng.random::<f32>() * START_VELOCITY;
    Vec2::from_angle(angle.to_radians()) * speed
}

pub struct CelebrationPlugin;

impl Plugin for CelebrationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CornerBounce>()
            .add_systems(
                Update,
                (celebrate, run_cues).chain().in_set(SaverSet::React),
            )
            .add_systems(
                Update,
                (slide_mascot, update_confetti).in_set(SaverSet::Render),
            );
    }
}

fn celebrate(
    mut commands: Commands,
    mut corners: EventReader<CornerBounce>,
    config: Res<Config>,
    assets: Res<SaverAssets>,
    mut rng: ResMut<SaverRng>,
    playing: Query<Entity, With<PartySound>>,
    mut mascots: Query<&mut Mascot>,
) {
    let hits = corners.read().count();
    if hits == 0 {
        return;
    }

    for _ in 0..hits {
        spawn_confetti(&mut commands, &mut rng.0, config.confetti_particles);
        commands.spawn(Cue::new(CueKind::Triumph, config.triumph_delay()));
        commands.spawn(Cue::new(CueKind::HideMascot, config.mascot_hide_delay()));
    }
    restart_sound(&mut commands, &playing, &assets.party, PartySound);
    for mut mascot in &mut mascots {
        if !mascot.is_shown() {
            mascot.show();
        }
    }
    debug!("Celebrating {} corner hit(s)", hits);
}

fn run_cues(
    mut commands: Commands,
    time: Res<Time>,
    assets: Res<SaverAssets>,
    mut cues: Query<(Entity, &mut Cue)>,
    playing: Query<Entity, With<TriumphSound>>,
    mut mascots: Query<&mut Mascot>,
) {
    let mut triumph = false;
    for (entity, mut cue) in &mut cues {
        cue.timer.tick(time.delta());
        if !cue.timer.finished() {
            continue;
        }
        debug!("Cue {:?} due", cue.kind);
        match cue.kind {
            CueKind::Triumph => triumph = true,
            CueKind::HideMascot => {
                for mut mascot in &mut mascots {
                    mascot.hide();
                }
            }
        }
        commands.entity(entity).despawn();
    }

    if triumph {
        restart_sound(&mut commands, &playing, &assets.triumph, TriumphSound);
    }
}

/// Stop whatever instance of this sound is playing and start it from the top.
fn restart_sound<M: Component>(
    commands: &mut Commands,
    playing: &Query<Entity, With<M>>,
    source: &Handle<AudioSource>,
    marker: M,
) {
    for entity in playing.iter() {
        commands.entity(entity).despawn();
    }
    commands.spawn((
        AudioBundle {
            source: source.clone(),
            settings: PlaybackSettings::DESPAWN,
        },
        marker,
    ));
}

fn spawn_confetti<R: Rng>(commands: &mut Commands, rng: &mut R, count: usize) {
    let lifetime = LIFETIME_FRAMES / FRAME_RATE;
    for _ in 0..count {
        let [r, g, b] = CONFETTI_COLORS[rng.random_range(0..CONFETTI_COLORS.len())];
        let spin = rng.random_range(0.0..std::f32::consts::TAU);
        commands.spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: Color::srgb_u8(r, g, b),
                    custom_size: Some(PARTICLE_SIZE),
                    ..default()
                },
                // viewport center
                transform: Transform::from_xyz(0.0, 0.0, Z_CONFETTI)
                    .with_rotation(Quat::from_rotation_z(spin)),
                ..default()
            },
            Confetti {
                velocity: launch(rng),
                life: Timer::from_seconds(lifetime, TimerMode::Once),
            },
        ));
    }
}

fn update_confetti(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut Confetti, &mut Sprite, &mut Transform)>,
) {
    let frames = time.delta_seconds() * FRAME_RATE;
    for (entity, mut confetti, mut sprite, mut tf) in &mut particles {
        confetti.life.tick(time.delta());
        if confetti.life.finished() {
            commands.entity(entity).despawn();
            continue;
        }

        let step = confetti.velocity * frames - Vec2::Y * GRAVITY * frames;
        tf.translation += step.extend(0.0);
        confetti.velocity *= DECAY.powf(frames);
        sprite.color.set_alpha(1.0 - confetti.life.fraction());
    }
}

fn slide_mascot(
    time: Res<Time>,
    viewport: Res<Viewport>,
    config: Res<Config>,
    mut mascots: Query<(&mut Mascot, &mut Transform)>,
) {
    for (mut mascot, mut tf) in &mut mascots {
        let showing = mascot.slide(time.delta_seconds());
        let pos = mascot_translation(viewport.0, config.box_width, showing);
        tf.translation.x = pos.x;
        tf.translation.y = pos.y;
    }
}
