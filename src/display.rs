//! Expand/collapse state, window placement and the drag/return-to-origin motion.
//!
//! All of it is plain data driven by pointer events; the window layer only
//! turns the returned [`Transition`]s into viewport commands.

use crate::config::Config;
use egui::{pos2, Pos2, Vec2};
use std::time::{Duration, Instant};

/// Height tier of the window. Width never changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeTier {
    /// Row 1 only.
    Collapsed,
    /// Rows 1-2, while hovered.
    Expanded,
    /// Rows 1-3, pinned by double-click.
    Full,
}

impl SizeTier {
    pub fn height(self, cfg: &Config) -> f32 {
        match self {
            SizeTier::Collapsed => cfg.collapsed_height,
            SizeTier::Expanded => cfg.expanded_height,
            SizeTier::Full => cfg.full_height,
        }
    }

    pub fn size(self, cfg: &Config) -> Vec2 { Vec2::new(cfg.width, self.height(cfg)) }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
    DoubleClick,
}

/// What the window has to do after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    None,
    Resize(SizeTier),
    ReturnToOrigin,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub expanded: bool,
    pub settings_open: bool,
    /// Set by double-click; suppresses collapse on pointer leave.
    pub manual_expanded: bool,
}

impl DisplayState {
    pub fn tier(&self) -> SizeTier {
        if self.settings_open { SizeTier::Full } else if self.expanded { SizeTier::Expanded } else { SizeTier::Collapsed }
    }

    /// Row 3 is only drawn while expanded with the settings open.
    pub fn show_settings(&self) -> bool { self.expanded && self.settings_open }

    pub fn handle(&mut self, event: PointerEvent, at_origin: bool) -> Transition {
        match event {
            PointerEvent::Enter => {
                if self.expanded { return Transition::None; }
                self.expanded = true;
            }
            PointerEvent::Leave => {
                if self.manual_expanded { return Transition::None; }
                self.expanded = false;
                self.settings_open = false;
            }
            PointerEvent::DoubleClick => {
                if !at_origin { return Transition::ReturnToOrigin; }
                if !self.expanded || !self.settings_open {
                    self.expanded = true;
                    self.settings_open = true;
                    self.manual_expanded = true;
                } else {
                    *self = DisplayState::default();
                }
            }
        }
        if !self.expanded { self.settings_open = false; }
        Transition::Resize(self.tier())
    }
}

// ===================== Placement =====================
/// Horizontally centered on the primary screen, `top_margin` below its top edge.
pub fn top_center(screen_width: f32, cfg: &Config) -> Pos2 {
    pos2(((screen_width - cfg.width) / 2.0).floor(), cfg.top_margin)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowGeometry {
    pub original: Pos2,
    pub current: Pos2,
    pub tier: SizeTier,
}

impl WindowGeometry {
    pub fn centered(screen_width: f32, cfg: &Config) -> Self {
        let p = top_center(screen_width, cfg);
        Self { original: p, current: p, tier: SizeTier::Collapsed }
    }

    pub fn at_origin(&self) -> bool { self.current == self.original }

    /// Apply a new tier and return where the window's top-left should be.
    /// At the origin the widget is re-centered; a dragged widget keeps its spot.
    pub fn resize(&mut self, tier: SizeTier, screen_width: Option<f32>, cfg: &Config) -> Pos2 {
        self.tier = tier;
        if self.at_origin() {
            if let Some(w) = screen_width {
                self.original = top_center(w, cfg);
                self.current = self.original;
            }
        }
        self.current
    }

    /// End of a drag: adopt where the window actually landed, which the
    /// window manager may have clamped. Keeps the requested spot when unknown.
    pub fn settle(&mut self, reported: Option<Pos2>) {
        if let Some(p) = reported { self.current = p; }
    }
}

/// Pointer-to-window offset captured when a primary-button drag starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    offset: Vec2,
}

impl DragState {
    pub fn begin(pointer: Pos2, window: Pos2) -> Self { Self { offset: pointer - window } }

    pub fn position_for(&self, pointer: Pos2) -> Pos2 { pointer - self.offset }
}

// ===================== Return animation =====================
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0) - 1.0;
    t * t * t + 1.0
}

#[derive(Clone, Copy, Debug)]
pub struct MoveAnimation {
    from: Pos2,
    to: Pos2,
    started: Instant,
    duration: Duration,
}

impl MoveAnimation {
    pub fn new(from: Pos2, to: Pos2, started: Instant, duration: Duration) -> Self { Self { from, to, started, duration } }

    pub fn position_at(&self, now: Instant) -> Pos2 {
        let t = if self.duration.is_zero() { 1.0 } else {
            now.saturating_duration_since(self.started).as_secs_f32() / self.duration.as_secs_f32()
        };
        self.from + (self.to - self.from) * ease_out_cubic(t)
    }

    pub fn finished(&self, now: Instant) -> bool { now.saturating_duration_since(self.started) >= self.duration }
}
