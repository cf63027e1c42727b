//! Back-to-top control
//!
//! Visibility is a pure function of the current scroll offset, recomputed on
//! every call to [`BackToTop::evaluate`]; nothing is accumulated between
//! calls.

use vela_core::{ElementId, PageEvent};
use vela_platform::{Page, ScrollBehavior};

use crate::config::{self, BackToTopConfig};

/// Whether the control is shown at `scroll_y`
pub fn is_shown(scroll_y: f32, threshold: f32) -> bool {
    scroll_y > threshold
}

pub struct BackToTop {
    control: ElementId,
    threshold: f32,
    show_class: String,
}

impl BackToTop {
    /// Locate the control and evaluate it against the current offset
    pub fn init(page: &mut dyn Page, config: &BackToTopConfig) -> Option<Self> {
        let selector = config::compile(&config.control, "back-to-top")?;
        let Some(control) = page.query(&selector) else {
            tracing::debug!("back-to-top: no control");
            return None;
        };
        let controller = Self {
            control,
            threshold: config.threshold,
            show_class: config.show_class.clone(),
        };
        controller.evaluate(page);
        Some(controller)
    }

    /// Show or hide the control for the current offset. Returns the new
    /// visibility.
    pub fn evaluate(&self, page: &mut dyn Page) -> bool {
        let shown = is_shown(page.scroll_y(), self.threshold);
        if shown {
            page.add_class(self.control, &self.show_class);
        } else {
            page.remove_class(self.control, &self.show_class);
        }
        shown
    }

    /// Scroll to the top when the click hit the control
    pub fn handle_click(&self, page: &mut dyn Page, event: &PageEvent) -> bool {
        let Some(target) = event.target else {
            return false;
        };
        if !page.contains(self.control, target) {
            return false;
        }
        tracing::debug!(from = page.scroll_y(), "back-to-top: scrolling to top");
        page.scroll_to(0.0, ScrollBehavior::Smooth);
        true
    }

    pub fn is_visible(&self, page: &dyn Page) -> bool {
        page.has_class(self.control, &self.show_class)
    }

    pub fn control(&self) -> ElementId {
        self.control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::Rect;
    use vela_platform::{ElementSpec, HeadlessConfig, HeadlessPage};

    fn page() -> (HeadlessPage, ElementId) {
        let mut page = HeadlessPage::new(HeadlessConfig::new(800.0, 600.0));
        let body = page.body();
        page.insert(
            body,
            ElementSpec::new("main").layout(Rect::new(0.0, 0.0, 800.0, 5000.0)),
        );
        let control = page.insert(body, ElementSpec::new("button").class("back-to-top"));
        (page, control)
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!is_shown(400.0, 400.0));
        assert!(is_shown(400.5, 400.0));
    }

    #[test]
    fn test_visibility_follows_offset() {
        let (mut page, control) = page();
        let btt = BackToTop::init(&mut page, &BackToTopConfig::default()).unwrap();
        assert!(!btt.is_visible(&page));

        page.set_scroll_y(399.0);
        assert!(!btt.evaluate(&mut page));
        page.set_scroll_y(401.0);
        assert!(btt.evaluate(&mut page));
        assert!(page.has_class(control, "show"));

        page.set_scroll_y(10.0);
        btt.evaluate(&mut page);
        assert!(!btt.is_visible(&page));
    }

    #[test]
    fn test_initial_evaluation() {
        let (mut page, control) = page();
        page.set_scroll_y(1000.0);
        let btt = BackToTop::init(&mut page, &BackToTopConfig::default()).unwrap();
        assert!(btt.is_visible(&page));
        assert!(page.has_class(control, "show"));
    }

    #[test]
    fn test_click_scrolls_to_top() {
        let (mut page, control) = page();
        page.set_scroll_y(2000.0);
        let btt = BackToTop::init(&mut page, &BackToTopConfig::default()).unwrap();

        assert!(btt.handle_click(&mut page, &PageEvent::click(control)));
        assert_eq!(page.scroll_target(), Some(0.0));
        page.advance(1000.0);
        assert_eq!(page.scroll_y(), 0.0);

        let body = page.body();
        assert!(!btt.handle_click(&mut page, &PageEvent::click(body)));
    }
}
