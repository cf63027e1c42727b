//! Vela Core Runtime
//!
//! Foundational primitives shared by the Vela page runtime:
//!
//! - **State Machines**: flat statecharts whose actions drive a context
//! - **Page Events**: input and viewport events with DOM dispatch flags
//! - **Geometry**: viewport rectangles and CSS-style root margins
//!
//! # Example
//!
//! ```rust
//! use vela_core::fsm::StateMachine;
//!
//! #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
//! enum Light { Off, On }
//!
//! let mut presses = 0u32;
//! let mut fsm: StateMachine<Light, (), u32> = StateMachine::builder(Light::Off)
//!     .on(Light::Off, (), Light::On)
//!     .on(Light::On, (), Light::Off)
//!     .on_enter(Light::On, |n: &mut u32| *n += 1)
//!     .build();
//!
//! fsm.send((), &mut presses);
//! assert_eq!(fsm.current_state(), Light::On);
//! assert_eq!(presses, 1);
//! ```

pub mod events;
pub mod fsm;
pub mod geometry;
pub mod node;

pub use events::{EventData, EventType, KeyCode, PageEvent};
pub use fsm::{FsmId, FsmRuntime, StateMachine, Transition};
pub use geometry::{MarginError, Rect, RootMargin};
pub use node::ElementId;
