//! Vela Animation System
//!
//! Time-based tweens for the visual side of page effects.
//!
//! # Features
//!
//! - **Easing**: CSS-compatible curves including `cubic-bezier()`
//! - **Tweens**: a value moving from start to end over a fixed duration
//! - **Scheduler**: ticks every live tween from one frame clock
//!
//! Animations are fire-and-forget from the caller's point of view: nothing
//! waits on completion, and replacing a running tween simply starts a new
//! one from the current value.

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{AnimationScheduler, TweenId};
pub use tween::Tween;
