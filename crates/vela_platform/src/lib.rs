//! Vela Platform Abstraction
//!
//! The seam between the page runtime and whatever hosts the document.
//!
//! - [`Page`]: element lookup, classes/styles, geometry, scrolling, history
//! - [`Selector`]: the CSS selector subset used to find elements
//! - [`HeadlessPage`]: an in-memory page for tests and scripted replays
//! - [`PageFixture`]: serde description that builds a `HeadlessPage`

pub mod error;
pub mod fixture;
pub mod headless;
pub mod page;
pub mod selector;

pub use error::{PlatformError, Result};
pub use fixture::{ElementFixture, PageFixture};
pub use headless::{ElementSpec, HeadlessConfig, HeadlessPage};
pub use page::{Page, ScrollBehavior};
pub use selector::{Selector, SelectorError};
