// Slider-style controls, one set per overlay kind.
// The window only knows about keys; this turns "nudge the laser hue up" into
// an absolute `SetHue(Laser, 45.0)` command, just like dragging a slider would.

use crate::config::ControlsConfig;
use crate::editor::Command;
use crate::types::{OverlayKind, Vec2};
use std::path::PathBuf;

const SCALE_MIN: f32 = 0.1;
const SCALE_MAX: f32 = 3.0;
const WHEEL_ZOOM: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    pub value: f32,
    min: f32,
    max: f32,
    step: f32,
    /// Angles wrap around instead of stopping at the ends.
    wraps: bool,
}

impl Slider {
    fn clamped(value: f32, min: f32, max: f32, step: f32) -> Self {
        Self { value, min, max, step, wraps: false }
    }

    fn angle(step: f32) -> Self {
        Self { value: 0.0, min: 0.0, max: 360.0, step, wraps: true }
    }

    /// Move one step up (`+1`) or down (`-1`); returns the new value.
    pub fn nudge(&mut self, direction: f32) -> f32 {
        let next = self.value + direction * self.step;
        self.value = if self.wraps {
            next.rem_euclid(self.max - self.min) + self.min
        } else {
            // avoid 1.2000001-style drift on a stepped slider
            ((next.clamp(self.min, self.max)) * 1000.0).round() / 1000.0
        };
        self.value
    }

    /// Multiply the value by `factor`, clamped. Returns the factor actually applied.
    pub fn zoom(&mut self, factor: f32) -> f32 {
        let before = self.value;
        self.value = (before * factor).clamp(self.min, self.max);
        self.value / before
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindSliders {
    pub scale: Slider,
    pub rotation: Slider,
    pub hue: Slider,
}

impl KindSliders {
    fn new(config: &ControlsConfig) -> Self {
        Self {
            scale: Slider::clamped(1.0, SCALE_MIN, SCALE_MAX, config.scale_step),
            rotation: Slider::angle(config.rotation_step),
            hue: Slider::angle(config.hue_step),
        }
    }
}

/// Which slider a key moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Scale,
    Rotation,
    Hue,
}

/// Key-level intents produced by the window.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Add(OverlayKind),
    SwitchKind,
    Step(Axis, f32),
    /// Wheel ticks over the canvas (positive = grow).
    Wheel(f32),
    DeleteActive,
    Reset,
    Upload(Option<PathBuf>),
    Export,
    PointerDown(f32, f32),
    PointerMove(f32, f32),
    PointerUp,
}

pub struct Controls {
    active: OverlayKind,
    sliders: [KindSliders; 2],
}

impl Controls {
    pub fn new(config: &ControlsConfig) -> Self {
        let sliders = KindSliders::new(config);
        Self { active: OverlayKind::Fist, sliders: [sliders; 2] }
    }

    pub fn active(&self) -> OverlayKind {
        self.active
    }

    pub fn sliders(&self, kind: OverlayKind) -> &KindSliders {
        &self.sliders[kind.index()]
    }

    /// Turn one action into the command it stands for. `None` means nothing to do.
    pub fn translate(&mut self, action: Action) -> Option<Command> {
        let kind = self.active;
        let cmd = match action {
            Action::Add(kind) => Command::AddOverlay(kind),
            Action::SwitchKind => {
                self.active = kind.next();
                return None;
            }
            Action::Step(axis, direction) => {
                let s = &mut self.sliders[kind.index()];
                match axis {
                    Axis::Scale => Command::SetScale(kind, s.scale.nudge(direction)),
                    Axis::Rotation => Command::SetRotation(kind, s.rotation.nudge(direction)),
                    Axis::Hue => Command::SetHue(kind, s.hue.nudge(direction)),
                }
            }
            Action::Wheel(ticks) => {
                let applied = self.sliders[kind.index()].scale.zoom(WHEEL_ZOOM.powf(ticks));
                if applied == 1.0 {
                    return None;
                }
                Command::ScaleBy(kind, applied)
            }
            Action::DeleteActive => Command::DeleteKind(kind),
            Action::Reset => Command::Reset,
            Action::Upload(Some(path)) => Command::Upload(path),
            Action::Upload(None) => {
                log::info!("no file selected");
                return None;
            }
            Action::Export => Command::Export,
            Action::PointerDown(x, y) => Command::PointerDown(Vec2::new(x, y)),
            Action::PointerMove(x, y) => Command::PointerMove(Vec2::new(x, y)),
            Action::PointerUp => Command::PointerUp,
        };
        Some(cmd)
    }
}
