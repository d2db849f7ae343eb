//! The screensaver itself: a single-instance state machine that owns the
//! bouncing box, plus the systems that spawn, drive and draw it.

use std::time::Duration;

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::celebration::{CornerBounce, Cue, Mascot, MASCOT_SIZE};
use crate::config::Config;
use crate::motion::{page_to_world, Bounce, Bouncer};
use crate::page::{Overflow, PageStyle};

// ===== Layering =====
const Z_BACKDROP: f32 = 10.0;
const Z_LOGO: f32 = 1.0; // relative to the backdrop
const Z_MASCOT: f32 = 2.0;

// #000e
const BACKDROP_COLOR: Color = Color::srgba(0.0, 0.0, 0.0, 0.933);
const LOGO_FILL: f32 = 0.8;

// ===== Logo sheet (one row of frames) =====
pub const LOGO_SHEET_COLS: u32 = 8;
pub const LOGO_SHEET_ROWS: u32 = 1;
pub const LOGO_FRAME: UVec2 = UVec2::new(200, 175);
const LOGO_FPS: f32 = 12.0;

/// Frame ordering for everything screensaver related.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SaverSet {
    Input,
    Idle,
    Toggle,
    Animate,
    React,
    Render,
}

/// Insert or remove the screensaver from the page.
#[derive(Event, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SaverToggle {
    Insert,
    Remove,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("screensaver is already active")]
    AlreadyActive,
    #[error("screensaver is not active")]
    NotActive,
}

#[derive(Debug)]
pub enum SaverState {
    Uninitialized,
    Active { bouncer: Bouncer, tick: Timer },
    Destroyed,
}

/// Result of driving the movement loop for one frame.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub steps: u32,
    pub bounces: u32,
    pub corners: u32,
}

/// Logical viewport size (window size).
#[derive(Resource, Clone, Copy, Debug)]
pub struct Viewport(pub Vec2);

#[derive(Resource)]
pub struct SaverRng(pub StdRng);

impl Default for SaverRng {
    fn default() -> Self {
        Self(StdRng::from_os_rng())
    }
}

#[derive(Resource, Default)]
pub struct SaverAssets {
    pub logo: Handle<Image>,
    pub logo_layout: Handle<TextureAtlasLayout>,
    pub mascot: Handle<Image>,
    pub party: Handle<AudioSource>,
    pub triumph: Handle<AudioSource>,
}

/// The one screensaver on the page.
#[derive(Resource, Debug)]
pub struct Screensaver {
    state: SaverState,
    root: Option<Entity>,
    // the activation frame does not move the box
    just_activated: bool,
    // color the box had when last destroyed
    last_color: Option<[u8; 3]>,
}

impl Default for Screensaver {
    fn default() -> Self {
        Self {
            state: SaverState::Uninitialized,
            root: None,
            just_activated: false,
            last_color: None,
        }
    }
}

impl Screensaver {
    pub fn is_active(&self) -> bool {
        matches!(self.state, SaverState::Active { .. })
    }

    pub fn bouncer(&self) -> Option<&Bouncer> {
        match &self.state {
            SaverState::Active { bouncer, .. } => Some(bouncer),
            _ => None,
        }
    }

    /// Attach: fresh geometry, random start, scroll locked, tick loop started.
    /// Re-inserting a destroyed screensaver runs the same initialization.
    pub fn activate(
        &mut self,
        viewport: Vec2,
        config: &Config,
        rng: &mut StdRng,
        page: &mut PageStyle,
    ) -> Result<(), TransitionError> {
        if self.is_active() {
            return Err(TransitionError::AlreadyActive);
        }

        let mut bouncer = Bouncer::new(
            config.box_size(),
            viewport,
            config.speed,
            config.corner_window(),
            rng,
        );
        if let Some(rgb) = self.last_color {
            bouncer = bouncer.with_color(rgb);
        }
        page.overflow = Overflow::Hidden;
        self.just_activated = true;
        self.state = SaverState::Active {
            bouncer,
            tick: Timer::new(config.tick_interval(), TimerMode::Repeating),
        };
        Ok(())
    }

    /// Stop the tick loop and give scrolling back to the page.
    pub fn destroy(&mut self, page: &mut PageStyle) -> Result<(), TransitionError> {
        let Some(bouncer) = self.bouncer() else {
            return Err(TransitionError::NotActive);
        };
        self.last_color = Some(bouncer.color_rgb());
        page.overflow = Overflow::Auto;
        self.state = SaverState::Destroyed;
        Ok(())
    }

    /// Run every tick that came due during `delta`. `now` is the current
    /// clock; each step is stamped with the moment its tick was due.
    /// The first call after activation only starts the clock.
    pub fn advance(&mut self, delta: Duration, now: Duration) -> TickReport {
        let SaverState::Active { bouncer, tick } = &mut self.state else {
            return TickReport::default();
        };
        if std::mem::take(&mut self.just_activated) {
            return TickReport::default();
        }

        tick.tick(delta);
        let steps = tick.times_finished_this_tick();
        let period = tick.duration();
        // time already spent toward the next tick
        let overshoot = tick.elapsed();

        let mut report = TickReport {
            steps,
            ..default()
        };
        for i in 0..steps {
            let late = overshoot + period * (steps - 1 - i);
            let bounce: Bounce = bouncer.step(now.saturating_sub(late));
            if !bounce.any() {
                continue;
            }
            report.bounces += u32::from(bounce.horizontal) + u32::from(bounce.vertical);
            if bounce.corner {
                report.corners += 1;
            }
        }
        report
    }

    /// Viewport changed. Returns true when the box was moved back inside.
    pub fn resize(&mut self, viewport: Vec2, rng: &mut StdRng) -> bool {
        match &mut self.state {
            SaverState::Active { bouncer, .. } => bouncer.resize(viewport, rng),
            _ => false,
        }
    }
}

// ===== Visual parts =====

#[derive(Component)]
pub struct Backdrop;

#[derive(Component)]
pub struct LogoBox;

/// Cycles the logo image through the frames of its sheet.
#[derive(Component, Debug)]
pub struct LogoAnim {
    frames: usize,
    timer: Timer,
}

impl LogoAnim {
    pub fn new(frames: usize, fps: f32) -> Self {
        Self {
            frames: frames.max(1),
            timer: Timer::from_seconds(1.0 / fps.max(1.0), TimerMode::Repeating),
        }
    }

    /// Frame shown after `delta`, looping back to the first one.
    pub fn advance(&mut self, index: usize, delta: Duration) -> usize {
        self.timer.tick(delta);
        let passed = self.timer.times_finished_this_tick() as usize;
        (index % self.frames + passed) % self.frames
    }
}

pub struct ScreensaverPlugin;

impl Plugin for ScreensaverPlugin {
    fn build(&self, app: &mut App) {
        let viewport = app
            .world()
            .get_resource::<Config>()
            .map(Config::window_size)
            .unwrap_or_else(|| Config::default().window_size());

        app.init_resource::<Screensaver>()
            .init_resource::<SaverRng>()
            .init_resource::<SaverAssets>()
            .init_resource::<PageStyle>()
            .insert_resource(Viewport(viewport))
            .add_event::<SaverToggle>()
            .add_event::<WindowResized>()
            .configure_sets(
                Update,
                (
                    SaverSet::Input,
                    SaverSet::Idle,
                    SaverSet::Toggle,
                    SaverSet::Animate,
                    SaverSet::React,
                    SaverSet::Render,
                )
                    .chain(),
            )
            .add_systems(Startup, sync_viewport)
            .add_systems(
                Update,
                (
                    track_viewport.in_set(SaverSet::Input),
                    apply_toggles.in_set(SaverSet::Toggle),
                    tick_screensaver.in_set(SaverSet::Animate),
                    (render_screensaver, animate_logo).in_set(SaverSet::Render),
                ),
            );
    }
}

/// Take the real window size once it exists.
fn sync_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<Viewport>,
) {
    if let Ok(win) = windows.get_single() {
        viewport.0 = Vec2::new(win.width(), win.height());
    }
}

fn track_viewport(
    mut resized: EventReader<WindowResized>,
    mut viewport: ResMut<Viewport>,
    mut saver: ResMut<Screensaver>,
    mut rng: ResMut<SaverRng>,
) {
    let Some(ev) = resized.read().last() else {
        return;
    };
    viewport.0 = Vec2::new(ev.width, ev.height);
    if saver.resize(viewport.0, &mut rng.0) {
        debug!("Viewport now {}x{}, box moved back inside", ev.width, ev.height);
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_toggles(
    mut commands: Commands,
    mut toggles: EventReader<SaverToggle>,
    mut saver: ResMut<Screensaver>,
    mut page: ResMut<PageStyle>,
    mut rng: ResMut<SaverRng>,
    viewport: Res<Viewport>,
    config: Res<Config>,
    assets: Res<SaverAssets>,
    cues: Query<Entity, With<Cue>>,
) {
    for toggle in toggles.read() {
        match toggle {
            SaverToggle::Insert => {
                match saver.activate(viewport.0, &config, &mut rng.0, &mut page) {
                    Ok(()) => {
                        let root = spawn_visuals(&mut commands, &assets, &config, viewport.0);
                        saver.root = Some(root);
                        info!("Screensaver activated");
                    }
                    Err(e) => warn!("Ignoring insert: {}", e),
                }
            }
            SaverToggle::Remove => match saver.destroy(&mut page) {
                Ok(()) => {
                    if let Some(root) = saver.root.take() {
                        commands.entity(root).despawn_recursive();
                    }
                    if config.cancel_celebration_on_destroy {
                        for cue in &cues {
                            commands.entity(cue).despawn();
                        }
                    }
                    info!("Screensaver destroyed");
                }
                Err(e) => debug!("Ignoring remove: {}", e),
            },
        }
    }
}

/// Backdrop with the logo box and the (hidden) mascot as children.
fn spawn_visuals(
    commands: &mut Commands,
    assets: &SaverAssets,
    config: &Config,
    viewport: Vec2,
) -> Entity {
    let box_size = config.box_size();
    commands
        .spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: BACKDROP_COLOR,
                    custom_size: Some(viewport),
                    ..default()
                },
                transform: Transform::from_xyz(0.0, 0.0, Z_BACKDROP),
                ..default()
            },
            Backdrop,
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    SpriteBundle {
                        sprite: Sprite {
                            custom_size: Some(box_size),
                            ..default()
                        },
                        transform: Transform::from_xyz(0.0, 0.0, Z_LOGO),
                        ..default()
                    },
                    LogoBox,
                ))
                .with_children(|logo| {
                    logo.spawn((
                        SpriteBundle {
                            texture: assets.logo.clone(),
                            sprite: Sprite {
                                custom_size: Some(box_size * LOGO_FILL),
                                ..default()
                            },
                            transform: Transform::from_xyz(0.0, 0.0, 0.1),
                            ..default()
                        },
                        TextureAtlas {
                            layout: assets.logo_layout.clone(),
                            index: 0,
                        },
                        LogoAnim::new((LOGO_SHEET_COLS * LOGO_SHEET_ROWS) as usize, LOGO_FPS),
                    ));
                });

            parent.spawn((
                SpriteBundle {
                    texture: assets.mascot.clone(),
                    sprite: Sprite {
                        custom_size: Some(MASCOT_SIZE),
                        ..default()
                    },
                    transform: Transform::from_xyz(0.0, -viewport.y, Z_MASCOT),
                    ..default()
                },
                Mascot::default(),
            ));
        })
        .id()
}

fn tick_screensaver(
    time: Res<Time>,
    mut saver: ResMut<Screensaver>,
    mut corners: EventWriter<CornerBounce>,
) {
    let report = saver.advance(time.delta(), time.elapsed());
    if report.steps == 0 {
        return;
    }
    if report.bounces > 0 {
        debug!(
            "Bounced {} time(s), color index {}",
            report.bounces,
            saver.bouncer().map_or(0, |b| b.color_index)
        );
    }
    for _ in 0..report.corners {
        debug!("Corner bounce");
        corners.send(CornerBounce);
    }
}

fn animate_logo(time: Res<Time>, mut q: Query<(&mut TextureAtlas, &mut LogoAnim)>) {
    for (mut atlas, mut anim) in &mut q {
        let next = anim.advance(atlas.index, time.delta());
        if next != atlas.index {
            atlas.index = next;
        }
    }
}

/// Write position, color and backdrop size to the sprites.
fn render_screensaver(
    saver: Res<Screensaver>,
    viewport: Res<Viewport>,
    mut logo: Query<(&mut Transform, &mut Sprite), (With<LogoBox>, Without<Backdrop>)>,
    mut backdrop: Query<&mut Sprite, (With<Backdrop>, Without<LogoBox>)>,
) {
    let Some(bouncer) = saver.bouncer() else {
        return;
    };

    if let Ok((mut tf, mut sprite)) = logo.get_single_mut() {
        let world = page_to_world(bouncer.rendered_pos(), bouncer.size, viewport.0);
        tf.translation.x = world.x;
        tf.translation.y = world.y;
        sprite.color = bouncer.color();
    }

    if let Ok(mut sprite) = backdrop.get_single_mut() {
        sprite.custom_size = Some(viewport.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::celebration::CelebrationPlugin;
    use crate::idle::{Activity, IdlePlugin};
    use crate::motion::{Horizontal, Vertical};
    use bevy::input::keyboard::KeyboardInput;
    use bevy::input::mouse::MouseButtonInput;
    use bevy::time::TimeUpdateStrategy;
    use bevy::window::CursorMoved;

    const VIEWPORT: Vec2 = Vec2::new(1000.0, 800.0);
    const FRAME: Duration = Duration::from_millis(50);

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    // uses up the activation frame
    fn settle(saver: &mut Screensaver) {
        saver.advance(Duration::ZERO, Duration::ZERO);
    }

    #[test]
    fn activation_initializes_state() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        assert!(matches!(saver.state, SaverState::Uninitialized));

        saver
            .activate(VIEWPORT, &config, &mut rng(), &mut page)
            .unwrap();
        assert!(saver.is_active());
        assert_eq!(page.overflow, Overflow::Hidden);

        let b = saver.bouncer().unwrap();
        assert_eq!(b.heading.h, Horizontal::Right);
        assert_eq!(b.heading.v, Vertical::Down);
        assert_eq!(b.color_index, 0);
        assert!(b.pos.x >= 0.0 && b.pos.x <= 800.0);
        assert!(b.pos.y >= 0.0 && b.pos.y <= 625.0);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();

        assert_eq!(saver.destroy(&mut page), Err(TransitionError::NotActive));
        saver
            .activate(VIEWPORT, &config, &mut rng(), &mut page)
            .unwrap();
        assert_eq!(
            saver.activate(VIEWPORT, &config, &mut rng(), &mut page),
            Err(TransitionError::AlreadyActive)
        );
    }

    #[test]
    fn destroy_restores_scrolling_and_stops_ticking() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        saver
            .activate(VIEWPORT, &config, &mut rng(), &mut page)
            .unwrap();
        saver.destroy(&mut page).unwrap();

        assert!(matches!(saver.state, SaverState::Destroyed));
        assert_eq!(page.overflow, Overflow::Auto);
        assert_eq!(
            saver.advance(Duration::from_secs(1), Duration::from_secs(10)),
            TickReport::default()
        );
    }

    #[test]
    fn reinsertion_reruns_initialization() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        let mut rng = rng();

        saver.activate(VIEWPORT, &config, &mut rng, &mut page).unwrap();
        if let SaverState::Active { bouncer, .. } = &mut saver.state {
            bouncer.heading.h = Horizontal::Left;
            bouncer.color_index = 4;
        }
        saver.destroy(&mut page).unwrap();
        saver.activate(VIEWPORT, &config, &mut rng, &mut page).unwrap();

        let b = saver.bouncer().unwrap();
        assert_eq!(b.heading.h, Horizontal::Right);
        assert_eq!(b.color_index, 0);
        assert_eq!(page.overflow, Overflow::Hidden);
    }

    #[test]
    fn reinsertion_keeps_the_last_color() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        let mut rng = rng();

        saver.activate(VIEWPORT, &config, &mut rng, &mut page).unwrap();
        let first = saver.bouncer().unwrap().color();
        if let SaverState::Active { bouncer, .. } = &mut saver.state {
            bouncer.on_bounce(Duration::from_millis(100));
            bouncer.on_bounce(Duration::from_millis(200));
        }
        let before = saver.bouncer().unwrap().color();
        assert_ne!(before, first);
        saver.destroy(&mut page).unwrap();

        saver.activate(VIEWPORT, &config, &mut rng, &mut page).unwrap();
        let b = saver.bouncer().unwrap();
        assert_eq!(b.color_index, 0);
        assert_eq!(b.color(), before);
    }

    #[test]
    fn activation_frame_does_not_move_the_box() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        saver
            .activate(Vec2::new(5000.0, 5000.0), &config, &mut rng(), &mut page)
            .unwrap();
        let start = saver.bouncer().unwrap().pos;

        let report = saver.advance(Duration::from_millis(250), Duration::from_millis(250));
        assert_eq!(report, TickReport::default());
        assert_eq!(saver.bouncer().unwrap().pos, start);

        let report = saver.advance(Duration::from_millis(30), Duration::from_millis(280));
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn window_smaller_than_the_box_never_celebrates() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        saver
            .activate(Vec2::new(150.0, 150.0), &config, &mut rng(), &mut page)
            .unwrap();
        settle(&mut saver);

        let report = saver.advance(Duration::from_millis(3000), Duration::from_millis(3000));
        assert_eq!(report.steps, 100);
        assert_eq!(report.bounces, 0);
        assert_eq!(report.corners, 0);
        assert_eq!(saver.bouncer().unwrap().rendered_pos(), Vec2::ZERO);
    }

    #[test]
    fn logo_frames_loop_over_the_sheet() {
        let mut anim = LogoAnim::new(8, 10.0);
        assert_eq!(anim.advance(0, Duration::from_millis(50)), 0);
        assert_eq!(anim.advance(0, Duration::from_millis(50)), 1);
        assert_eq!(anim.advance(6, Duration::from_millis(200)), 0);
        // a stale index from a bigger sheet is wrapped
        assert_eq!(anim.advance(9, Duration::ZERO), 1);
    }

    #[test]
    fn advance_runs_one_step_per_elapsed_tick() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        saver
            .activate(Vec2::new(5000.0, 5000.0), &config, &mut rng(), &mut page)
            .unwrap();
        if let SaverState::Active { bouncer, .. } = &mut saver.state {
            bouncer.pos = Vec2::new(100.0, 100.0);
        }
        settle(&mut saver);

        let report = saver.advance(Duration::from_millis(20), Duration::from_millis(20));
        assert_eq!(report.steps, 0);
        let report = saver.advance(Duration::from_millis(100), Duration::from_millis(120));
        assert_eq!(report.steps, 4);
        assert_eq!(saver.bouncer().unwrap().pos, Vec2::new(132.0, 132.0));
    }

    #[test]
    fn catch_up_ticks_are_not_mistaken_for_corners() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        saver
            .activate(VIEWPORT, &config, &mut rng(), &mut page)
            .unwrap();
        // one step from the right edge, two from the bottom
        if let SaverState::Active { bouncer, .. } = &mut saver.state {
            bouncer.pos = Vec2::new(800.0, 617.0);
        }
        settle(&mut saver);

        // two ticks land in the same frame
        let report = saver.advance(Duration::from_millis(60), Duration::from_millis(60));
        assert_eq!(report.steps, 2);
        assert_eq!(report.bounces, 2);
        assert_eq!(report.corners, 0);
    }

    #[test]
    fn simultaneous_axis_bounces_report_a_corner() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        saver
            .activate(VIEWPORT, &config, &mut rng(), &mut page)
            .unwrap();
        if let SaverState::Active { bouncer, .. } = &mut saver.state {
            bouncer.pos = Vec2::new(800.0, 625.0);
        }
        settle(&mut saver);

        let report = saver.advance(Duration::from_millis(30), Duration::from_millis(30));
        assert_eq!(report.bounces, 2);
        assert_eq!(report.corners, 1);
    }

    #[test]
    fn activity_shortly_after_activation_restarts_the_full_delay() {
        let config = Config::default();
        let mut page = PageStyle::default();
        let mut saver = Screensaver::default();
        let mut session = crate::idle::IdleSession::new(config.idle_delay());

        assert!(session.advance(config.idle_delay()));
        saver
            .activate(VIEWPORT, &config, &mut rng(), &mut page)
            .unwrap();
        assert!(!session.advance(Duration::from_millis(100)));

        session.restart();
        saver.destroy(&mut page).unwrap();
        assert!(!saver.is_active());
        assert_eq!(session.remaining(), config.idle_delay());
        assert!(!session.advance(Duration::from_millis(4999)));
        assert!(session.advance(Duration::from_millis(1)));
    }

    // ===== Whole-app behavior =====

    fn app(config: Config) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
            .add_event::<CursorMoved>()
            .add_event::<MouseButtonInput>()
            .add_event::<KeyboardInput>()
            .insert_resource(config)
            .insert_resource(SaverRng(rng()))
            .add_plugins((ScreensaverPlugin, IdlePlugin, CelebrationPlugin));
        app
    }

    fn quick_config() -> Config {
        Config {
            idle_delay_ms: 200,
            ..default()
        }
    }

    // too big for the box to reach a corner during a test
    fn roomy_config() -> Config {
        Config {
            window_width: 20000.0,
            window_height: 20000.0,
            ..quick_config()
        }
    }

    fn count<F: bevy::ecs::query::QueryFilter>(app: &mut App) -> usize {
        let mut q = app.world_mut().query_filtered::<Entity, F>();
        q.iter(app.world()).count()
    }

    fn run(app: &mut App, frames: usize) {
        for _ in 0..frames {
            app.update();
        }
    }

    #[test]
    fn idle_period_inserts_the_screensaver() {
        let mut app = app(quick_config());
        run(&mut app, 2);
        assert!(!app.world().resource::<Screensaver>().is_active());

        run(&mut app, 10);
        assert!(app.world().resource::<Screensaver>().is_active());
        assert_eq!(count::<With<Backdrop>>(&mut app), 1);
        assert_eq!(count::<With<LogoBox>>(&mut app), 1);
        assert_eq!(count::<With<Mascot>>(&mut app), 1);
        assert!(app.world().resource::<PageStyle>().scroll_locked());
    }

    #[test]
    fn activity_removes_the_screensaver_and_it_comes_back() {
        let mut app = app(quick_config());
        run(&mut app, 12);
        assert!(app.world().resource::<Screensaver>().is_active());

        app.world_mut().send_event(Activity);
        app.update();
        assert!(!app.world().resource::<Screensaver>().is_active());
        assert_eq!(count::<With<Backdrop>>(&mut app), 0);
        assert_eq!(count::<With<LogoBox>>(&mut app), 0);
        assert!(!app.world().resource::<PageStyle>().scroll_locked());

        // delay restarted from zero
        run(&mut app, 2);
        assert!(!app.world().resource::<Screensaver>().is_active());

        run(&mut app, 10);
        assert!(app.world().resource::<Screensaver>().is_active());
        assert_eq!(count::<With<Backdrop>>(&mut app), 1);
    }

    #[test]
    fn steady_activity_keeps_the_screensaver_away() {
        let mut app = app(quick_config());
        for _ in 0..20 {
            app.world_mut().send_event(Activity);
            app.update();
        }
        assert!(!app.world().resource::<Screensaver>().is_active());
        assert_eq!(count::<With<Backdrop>>(&mut app), 0);
    }

    #[test]
    fn logo_is_drawn_inside_the_viewport() {
        let mut app = app(quick_config());
        run(&mut app, 12);
        for _ in 0..100 {
            app.update();
            let mut q = app
                .world_mut()
                .query_filtered::<&Transform, With<LogoBox>>();
            let tf = q.single(app.world());
            assert!(tf.translation.x.abs() <= 400.0, "x={}", tf.translation.x);
            assert!(tf.translation.y.abs() <= 312.5, "y={}", tf.translation.y);
        }
    }

    #[test]
    fn logo_image_plays_through_its_frames() {
        let mut app = app(roomy_config());
        run(&mut app, 12);
        let mut seen = Vec::new();
        for _ in 0..40 {
            app.update();
            let mut q = app.world_mut().query::<&TextureAtlas>();
            let index = q.single(app.world()).index;
            assert!(index < (LOGO_SHEET_COLS * LOGO_SHEET_ROWS) as usize);
            if seen.last() != Some(&index) {
                seen.push(index);
            }
        }
        // looped around at least once
        assert!(seen.len() > 8, "{:?}", seen);
        assert_eq!(seen[..3], [seen[0], (seen[0] + 1) % 8, (seen[0] + 2) % 8]);
    }

    #[test]
    fn resize_updates_viewport_and_moves_box_inside() {
        let mut app = app(quick_config());
        run(&mut app, 12);
        assert!(app.world().resource::<Screensaver>().is_active());

        app.world_mut().send_event(WindowResized {
            window: Entity::PLACEHOLDER,
            width: 300.0,
            height: 250.0,
        });
        app.update();

        assert_eq!(app.world().resource::<Viewport>().0, Vec2::new(300.0, 250.0));
        let b = app.world().resource::<Screensaver>().bouncer().unwrap();
        assert_eq!(b.bounds, Vec2::new(300.0, 250.0));
        let p = b.rendered_pos();
        assert!(p.x >= 0.0 && p.x <= 100.0);
        assert!(p.y >= 0.0 && p.y <= 75.0);
    }

    #[test]
    fn pending_cues_survive_destroy_by_default() {
        let mut app = app(roomy_config());
        run(&mut app, 12);
        app.world_mut().send_event(CornerBounce);
        app.update();
        assert_eq!(count::<With<Cue>>(&mut app), 2);

        app.world_mut().send_event(Activity);
        app.update();
        assert!(!app.world().resource::<Screensaver>().is_active());
        assert_eq!(count::<With<Cue>>(&mut app), 2);
    }

    #[test]
    fn pending_cues_can_be_cancelled_on_destroy() {
        let mut app = app(Config {
            cancel_celebration_on_destroy: true,
            ..roomy_config()
        });
        run(&mut app, 12);
        app.world_mut().send_event(CornerBounce);
        app.update();
        assert_eq!(count::<With<Cue>>(&mut app), 2);

        app.world_mut().send_event(Activity);
        app.update();
        assert_eq!(count::<With<Cue>>(&mut app), 0);
    }
}
