//! The host page: scrollable content plus the page-wide overflow style
//! the screensaver locks while it is showing.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

const LINE_HEIGHT: f32 = 40.0;
const MAX_SCROLL: f32 = 600.0;

const PAGE_TEXT: &str = "\
Nothing to see here.\n\
\n\
Leave the mouse and keyboard alone for a few seconds\n\
and the logo will start bouncing around.\n\
\n\
Move, click or press a key to bring the page back.\n\
\n\
Hit a corner for a surprise.";

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Overflow {
    #[default]
    Auto,
    Hidden,
}

/// Page-wide style shared by everything drawn on the page.
#[derive(Resource, Default, Debug)]
pub struct PageStyle {
    pub overflow: Overflow,
}

impl PageStyle {
    pub fn scroll_locked(&self) -> bool {
        self.overflow == Overflow::Hidden
    }
}

#[derive(Component, Default)]
pub struct PageContent {
    scroll: f32,
}

pub struct PagePlugin;

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PageStyle>()
            .add_systems(Startup, spawn_page)
            .add_systems(Update, scroll_page);
    }
}

fn spawn_page(mut commands: Commands) {
    commands.spawn((
        Text2dBundle {
            text: Text::from_section(
                PAGE_TEXT,
                TextStyle {
                    font_size: 28.0,
                    color: Color::srgb(0.85, 0.85, 0.9),
                    ..default()
                },
            )
            .with_justify(JustifyText::Center),
            ..default()
        },
        PageContent::default(),
    ));
}

/// Wheel scrolling, ignored while the page overflow is hidden.
fn scroll_page(
    mut wheel: EventReader<MouseWheel>,
    page: Res<PageStyle>,
    mut q: Query<(&mut PageContent, &mut Transform)>,
) {
    let delta: f32 = wheel
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y * LINE_HEIGHT,
            MouseScrollUnit::Pixel => ev.y,
        })
        .sum();

    if page.scroll_locked() || delta == 0.0 {
        return;
    }

    for (mut content, mut tf) in &mut q {
        // wheel up (+y) scrolls back toward the top
        content.scroll = (content.scroll - delta).clamp(0.0, MAX_SCROLL);
        tf.translation.y = content.scroll;
    }
}
