//! Idle detection: any pointer movement, click or key press restarts the
//! quiet timer; when it runs out the screensaver is inserted.

use std::time::Duration;

use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::MouseButtonInput;
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::CursorMoved;

use crate::config::Config;
use crate::screensaver::{SaverSet, SaverToggle, Screensaver};

/// User input that counts as activity.
#[derive(Event, Clone, Copy, Debug)]
pub struct Activity;

/// Quiet-period tracker. One per app, lives as long as the app.
#[derive(Resource, Debug)]
pub struct IdleSession {
    quiet: Timer,
}

impl IdleSession {
    pub fn new(delay: Duration) -> Self {
        Self {
            quiet: Timer::new(delay, TimerMode::Once),
        }
    }

    /// Drop the pending activation and schedule a fresh one.
    pub fn restart(&mut self) {
        self.quiet.reset();
    }

    /// True exactly once, when the delay has elapsed without a restart.
    pub fn advance(&mut self, delta: Duration) -> bool {
        self.quiet.tick(delta);
        self.quiet.just_finished()
    }

    pub fn remaining(&self) -> Duration {
        self.quiet.remaining()
    }
}

pub struct IdlePlugin;

impl Plugin for IdlePlugin {
    fn build(&self, app: &mut App) {
        let delay = app
            .world()
            .get_resource::<Config>()
            .map(Config::idle_delay)
            .unwrap_or_else(|| Config::default().idle_delay());

        app.add_event::<Activity>()
            .insert_resource(IdleSession::new(delay))
            .add_systems(
                Update,
                (
                    detect_activity.in_set(SaverSet::Input),
                    watch_idle.in_set(SaverSet::Idle),
                ),
            );
    }
}

/// Funnel raw input into `Activity`.
fn detect_activity(
    mut cursor: EventReader<CursorMoved>,
    mut buttons: EventReader<MouseButtonInput>,
    mut keys: EventReader<KeyboardInput>,
    mut activity: EventWriter<Activity>,
) {
    let moved = cursor.read().count() > 0;
    let clicked = buttons.read().any(|ev| ev.state == ButtonState::Pressed);
    let typed = keys.read().any(|ev| ev.state == ButtonState::Pressed);

    if moved || clicked || typed {
        activity.send(Activity);
    }
}

fn watch_idle(
    time: Res<Time>,
    mut activity: EventReader<Activity>,
    mut session: ResMut<IdleSession>,
    saver: Res<Screensaver>,
    mut toggles: EventWriter<SaverToggle>,
) {
    if activity.read().count() > 0 {
        session.restart();
        if saver.is_active() {
            toggles.send(SaverToggle::Remove);
        }
        trace!("Activity, screensaver in {:?}", session.remaining());
    } else if session.advance(time.delta()) {
        debug!("Idle for {:?}, inserting screensaver", session.quiet.duration());
        toggles.send(SaverToggle::Insert);
    }
}
