//! Vela page runtime
//!
//! Scroll- and input-reactive behavior for a single landing page, driven
//! through the [`Page`](vela_platform::Page) seam:
//!
//! - **Reveal**: elements fade in once, the first time they scroll into view
//! - **Scroll spy**: the navigation link of the visible section is marked active
//! - **Anchor navigation**: smooth, header-aware scrolling for `#fragment` links
//! - **Mobile navigation**: an open/closed panel with overlay and scroll lock
//! - **Back to top**: a control shown past a scroll threshold
//! - **FAQ** and **forms**: accordion toggling and the submission flow
//!
//! # Example
//!
//! ```rust
//! use vela_core::{PageEvent, Rect};
//! use vela_page::{NavState, PageConfig, PageRuntime};
//! use vela_platform::{ElementSpec, HeadlessConfig, HeadlessPage, Page};
//!
//! let mut page = HeadlessPage::new(HeadlessConfig::new(400.0, 700.0));
//! let body = page.body();
//! let toggle = page.insert(body, ElementSpec::new("button").class("menu-toggle"));
//! page.insert(body, ElementSpec::new("ul").class("nav-menu"));
//!
//! let mut runtime = PageRuntime::initialize(&mut page, &PageConfig::default());
//! runtime.dispatch(&mut page, &mut PageEvent::click(toggle));
//!
//! let snapshot = runtime.snapshot(&page);
//! assert_eq!(snapshot.nav, Some(NavState::Open));
//! assert!(snapshot.nav_effects.unwrap().all());
//! ```

pub mod anchor_nav;
pub mod back_to_top;
pub mod config;
pub mod error;
pub mod faq;
pub mod forms;
pub mod mobile_nav;
pub mod reporter;
pub mod reveal;
pub mod runtime;
pub mod scroll_spy;

pub use anchor_nav::{target_offset, AnchorNavigation, AnchorNavigator};
pub use back_to_top::BackToTop;
pub use config::PageConfig;
pub use error::{PageError, Result};
pub use faq::{FaqAccordion, FaqState};
pub use forms::{
    is_valid_email, FormCoordinator, FormValidator, LogNotifier, Notification, Notifier,
    RequiredFieldsValidator, Severity,
};
pub use mobile_nav::{MobileNav, NavEffects, NavState, NavTrigger};
pub use reporter::{IntersectionEntry, IntersectionReporter, ObserverOptions, ReporterMode};
pub use reveal::RevealAnimator;
pub use runtime::{PageRuntime, PageSnapshot};
pub use scroll_spy::ScrollSpy;
