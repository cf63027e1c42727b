//! Fixed-duration tweens

use crate::easing::Easing;

/// A value animating from `start` to `end` over `duration_ms`
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    start: f32,
    end: f32,
    duration_ms: f32,
    elapsed_ms: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(start: f32, end: f32, duration_ms: f32, easing: Easing) -> Self {
        Self {
            start,
            end,
            duration_ms: duration_ms.max(0.0),
            elapsed_ms: 0.0,
            easing,
        }
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    /// Advance the tween by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: f32) {
        self.elapsed_ms = (self.elapsed_ms + dt_ms.max(0.0)).min(self.duration_ms);
    }

    /// Linear progress in `0.0..=1.0`
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            self.elapsed_ms / self.duration_ms
        }
    }

    /// Current eased value
    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.end;
        }
        let eased = self.easing.apply(self.progress());
        self.start + (self.end - self.start) * eased
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}
