//! Animation scheduler
//!
//! Owns all live tweens and advances them from a single frame clock.

use crate::tween::Tween;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    pub struct TweenId;
}

/// The animation scheduler that ticks all active tweens
pub struct AnimationScheduler {
    tweens: SlotMap<TweenId, Tween>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            tweens: SlotMap::with_key(),
        }
    }

    pub fn add_tween(&mut self, tween: Tween) -> TweenId {
        self.tweens.insert(tween)
    }

    pub fn get_tween(&self, id: TweenId) -> Option<&Tween> {
        self.tweens.get(id)
    }

    /// Stop a tween where it is. Unknown ids are ignored.
    pub fn remove_tween(&mut self, id: TweenId) -> Option<Tween> {
        self.tweens.remove(id)
    }

    /// Current value of a tween
    pub fn value(&self, id: TweenId) -> Option<f32> {
        self.tweens.get(id).map(Tween::value)
    }

    /// Advance every tween by `dt_ms`
    pub fn tick(&mut self, dt_ms: f32) {
        for (_, tween) in self.tweens.iter_mut() {
            tween.tick(dt_ms);
        }
    }

    /// Drop finished tweens, returning their final values
    pub fn sweep_finished(&mut self) -> Vec<(TweenId, f32)> {
        let finished: Vec<(TweenId, f32)> = self
            .tweens
            .iter()
            .filter(|(_, t)| t.is_finished())
            .map(|(id, t)| (id, t.end()))
            .collect();

        for (id, _) in &finished {
            self.tweens.remove(*id);
        }
        if !finished.is_empty() {
            tracing::trace!("swept {} finished tweens", finished.len());
        }
        finished
    }

    /// Check if any tweens are still running
    pub fn has_active_animations(&self) -> bool {
        self.tweens.iter().any(|(_, t)| !t.is_finished())
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}
