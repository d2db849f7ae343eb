//! Bouncing box model: page coordinates (origin top-left, y down).

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;

// ===== Colors cycled on every bounce =====
pub const PALETTE: [[u8; 3]; 7] = [
    [0x0d, 0x85, 0x13],
    [0x29, 0x00, 0xc6],
    [0xc4, 0x00, 0xf0],
    [0x3a, 0x3a, 0x3a],
    [0x97, 0x9c, 0x0a],
    [0xb6, 0x68, 0x0f],
    [0xa8, 0x02, 0x04],
];

// shown until the first bounce ever
const FALLBACK_COLOR: [u8; 3] = [0xa8, 0x02, 0x04];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Horizontal {
    Right,
    Left,
}

impl Horizontal {
    pub fn flipped(self) -> Self {
        match self {
            Horizontal::Right => Horizontal::Left,
            Horizontal::Left => Horizontal::Right,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Horizontal::Right => 1.0,
            Horizontal::Left => -1.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Vertical {
    Down,
    Up,
}

impl Vertical {
    pub fn flipped(self) -> Self {
        match self {
            Vertical::Down => Vertical::Up,
            Vertical::Up => Vertical::Down,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Vertical::Down => 1.0,
            Vertical::Up => -1.0,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Heading {
    pub h: Horizontal,
    pub v: Vertical,
}

impl Default for Heading {
    fn default() -> Self {
        Self {
            h: Horizontal::Right,
            v: Vertical::Down,
        }
    }
}

/// What happened during one movement step.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Bounce {
    pub horizontal: bool,
    pub vertical: bool,
    pub corner: bool,
}

impl Bounce {
    pub fn any(&self) -> bool {
        self.horizontal || self.vertical
    }
}

#[derive(Clone, Debug)]
pub struct Bouncer {
    pub pos: Vec2, // top-left px
    pub heading: Heading,
    pub size: Vec2,
    pub bounds: Vec2,
    pub speed: f32,
    pub color_index: usize,
    shown_color: [u8; 3],
    last_bounce: Option<Duration>,
    corner_window: Duration,
}

impl Bouncer {
    /// Fresh box at a random spot inside `bounds`, heading right/down.
    pub fn new<R: Rng>(
        size: Vec2,
        bounds: Vec2,
        speed: f32,
        corner_window: Duration,
        rng: &mut R,
    ) -> Self {
        let mut bouncer = Self {
            pos: Vec2::ZERO,
            heading: Heading::default(),
            size,
            bounds,
            speed,
            color_index: 0,
            shown_color: FALLBACK_COLOR,
            last_bounce: None,
            corner_window,
        };
        bouncer.place_randomly(rng);
        bouncer
    }

    /// Start out showing `rgb` instead of the fallback color.
    pub fn with_color(mut self, rgb: [u8; 3]) -> Self {
        self.shown_color = rgb;
        self
    }

    pub fn overlaps_right(&self) -> bool {
        self.pos.x + self.size.x > self.bounds.x
    }

    pub fn overlaps_left(&self) -> bool {
        self.pos.x < 0.0
    }

    pub fn overlaps_up(&self) -> bool {
        self.pos.y < 0.0
    }

    pub fn overlaps_down(&self) -> bool {
        self.pos.y + self.size.y > self.bounds.y
    }

    fn overlaps_any(&self) -> bool {
        self.overlaps_right() || self.overlaps_left() || self.overlaps_up() || self.overlaps_down()
    }

    /// Largest top-left coordinate that keeps the box on screen (0 if it can't fit).
    pub fn max_pos(&self) -> Vec2 {
        (self.bounds - self.size).max(Vec2::ZERO)
    }

    pub fn place_randomly<R: Rng>(&mut self, rng: &mut R) {
        let span = self.bounds - self.size;
        self.pos = Vec2::new(random_offset(rng, span.x), random_offset(rng, span.y));
    }

    /// Move one step along the current heading.
    pub fn advance(&mut self) {
        self.pos.x += self.speed * self.heading.h.sign();
        self.pos.y += self.speed * self.heading.v.sign();
    }

    /// Flip any axis that crossed an edge. `now` stamps the bounces.
    /// An axis with no room to travel stays pinned at 0 and never bounces.
    pub fn check_bounds(&mut self, now: Duration) -> Bounce {
        let mut bounce = Bounce::default();
        let room = self.bounds - self.size;
        if room.x <= 0.0 {
            self.pos.x = 0.0;
        } else if self.overlaps_right() || self.overlaps_left() {
            bounce.corner |= self.on_bounce(now);
            self.heading.h = self.heading.h.flipped();
            bounce.horizontal = true;
        }
        if room.y <= 0.0 {
            self.pos.y = 0.0;
        } else if self.overlaps_up() || self.overlaps_down() {
            bounce.corner |= self.on_bounce(now);
            self.heading.v = self.heading.v.flipped();
            bounce.vertical = true;
        }
        bounce
    }

    pub fn step(&mut self, now: Duration) -> Bounce {
        self.advance();
        self.check_bounds(now)
    }

    /// Next color, then compare against the previous bounce time.
    /// Returns true when this bounce landed within the corner window.
    pub fn on_bounce(&mut self, now: Duration) -> bool {
        self.color_index = (self.color_index + 1) % PALETTE.len();
        self.shown_color = PALETTE[self.color_index];

        let corner = self
            .last_bounce
            .is_some_and(|last| now.saturating_sub(last) < self.corner_window);
        self.last_bounce = Some(now);
        corner
    }

    /// New viewport. Returns true when the box had to be moved back inside.
    pub fn resize<R: Rng>(&mut self, bounds: Vec2, rng: &mut R) -> bool {
        self.bounds = bounds;
        if self.overlaps_any() {
            self.place_randomly(rng);
            true
        } else {
            false
        }
    }

    /// Position as drawn; the overshoot past an edge is never shown.
    pub fn rendered_pos(&self) -> Vec2 {
        self.pos.clamp(Vec2::ZERO, self.max_pos())
    }

    pub fn color_rgb(&self) -> [u8; 3] {
        self.shown_color
    }

    pub fn color(&self) -> Color {
        let [r, g, b] = self.shown_color;
        Color::srgb_u8(r, g, b)
    }
}

/// `floor(U[0,1) * span)`, or 0 when there is no room.
fn random_offset<R: Rng>(rng: &mut R, span: f32) -> f32 {
    if span > 0.0 {
        rng.random_range(0.0..span).floor()
    } else {
        0.0
    }
}

/// Page coordinates of a box's top-left corner -> world translation of its center.
pub fn page_to_world(pos: Vec2, size: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        pos.x + size.x / 2.0 - viewport.x / 2.0,
        viewport.y / 2.0 - pos.y - size.y / 2.0,
    )
}
