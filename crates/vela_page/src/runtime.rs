//! Page runtime
//!
//! [`PageRuntime::initialize`] wires every component against a page, each
//! independently: a component whose elements are missing stays unwired and
//! the rest work as usual. [`PageRuntime::dispatch`] then routes host events
//! in the order a DOM would deliver them:
//!
//! 1. target-phase handlers (anchor links, back-to-top, FAQ questions,
//!    mobile-nav toggle/overlay/panel), each seeing the same event;
//! 2. document-level handlers (outside-click and `Escape` close), skipped
//!    once propagation has been stopped.
//!
//! Scroll and resize events re-poll both intersection reporters and
//! re-evaluate the back-to-top control.

use serde::Serialize;
use vela_core::events::event_types;
use vela_core::{ElementId, PageEvent};
use vela_platform::Page;

use crate::anchor_nav::AnchorNavigator;
use crate::back_to_top::BackToTop;
use crate::config::PageConfig;
use crate::faq::FaqAccordion;
use crate::forms::{
    FormCoordinator, FormValidator, LogNotifier, Notification, Notifier, RequiredFieldsValidator,
};
use crate::mobile_nav::{MobileNav, NavEffects, NavState};
use crate::reveal::RevealAnimator;
use crate::scroll_spy::ScrollSpy;

/// Serializable view of everything the runtime owns
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageSnapshot {
    pub scroll_y: f32,
    pub location_hash: String,
    pub nav: Option<NavState>,
    pub nav_effects: Option<NavEffects>,
    /// `href` of the active navigation link
    pub active_link: Option<String>,
    pub revealed: usize,
    pub back_to_top_visible: Option<bool>,
    /// Position of the expanded FAQ item
    pub open_faq: Option<usize>,
    pub pending_forms: usize,
    pub notification: Option<Notification>,
}

pub struct PageRuntime<P: Page + 'static> {
    mobile_nav: Option<MobileNav<P>>,
    anchors: Option<AnchorNavigator>,
    reveal: Option<RevealAnimator>,
    forms: Option<FormCoordinator>,
    faq: Option<FaqAccordion<P>>,
    scroll_spy: Option<ScrollSpy>,
    back_to_top: Option<BackToTop>,
}

impl<P: Page + 'static> PageRuntime<P> {
    /// Wire all components with the default form validator and a logging
    /// notifier. Call once per page.
    pub fn initialize(page: &mut P, config: &PageConfig) -> Self {
        let validator = RequiredFieldsValidator::from_config(&config.forms)
            .map(|v| Box::new(v) as Box<dyn FormValidator>);
        Self::wire(page, config, validator, Box::new(LogNotifier))
    }

    /// Wire all components with host-provided form collaborators
    pub fn initialize_with(
        page: &mut P,
        config: &PageConfig,
        validator: Box<dyn FormValidator>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self::wire(page, config, Some(validator), notifier)
    }

    fn wire(
        page: &mut P,
        config: &PageConfig,
        validator: Option<Box<dyn FormValidator>>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let runtime = Self {
            mobile_nav: MobileNav::init(page, &config.mobile_nav),
            anchors: AnchorNavigator::init(page, &config.anchors),
            reveal: RevealAnimator::init(page, &config.reveal),
            forms: validator
                .and_then(|v| FormCoordinator::init(page, &config.forms, v, notifier)),
            faq: FaqAccordion::init(page, &config.faq),
            scroll_spy: ScrollSpy::init(page, &config.scroll_spy),
            back_to_top: BackToTop::init(page, &config.back_to_top),
        };
        tracing::info!(
            mobile_nav = runtime.mobile_nav.is_some(),
            anchors = runtime.anchors.is_some(),
            reveal = runtime.reveal.is_some(),
            forms = runtime.forms.is_some(),
            faq = runtime.faq.is_some(),
            scroll_spy = runtime.scroll_spy.is_some(),
            back_to_top = runtime.back_to_top.is_some(),
            "page runtime initialized"
        );
        runtime
    }

    /// Route one host event
    pub fn dispatch(&mut self, page: &mut P, event: &mut PageEvent) {
        match event.event_type {
            event_types::CLICK => self.dispatch_click(page, event),
            event_types::KEY_DOWN => self.dispatch_key(page, event),
            event_types::SCROLL | event_types::RESIZE => self.refresh(page),
            event_types::SUBMIT => {
                if let Some(forms) = &mut self.forms {
                    forms.handle_submit(page, event);
                }
            }
            other => tracing::trace!(event_type = other, "unhandled event"),
        }
    }

    fn dispatch_click(&mut self, page: &mut P, event: &mut PageEvent) {
        if let Some(anchors) = &self.anchors {
            anchors.handle_click(page, event);
        }
        if let Some(back_to_top) = &self.back_to_top {
            back_to_top.handle_click(page, event);
        }
        if let Some(faq) = &mut self.faq {
            faq.handle_click(page, event);
        }
        if let Some(nav) = &mut self.mobile_nav {
            nav.on_click(page, event);
        }

        if event.propagation_stopped {
            return;
        }
        if let Some(nav) = &mut self.mobile_nav {
            nav.on_document_click(page, event);
        }
    }

    fn dispatch_key(&mut self, page: &mut P, event: &mut PageEvent) {
        if let Some(faq) = &mut self.faq {
            faq.handle_key(page, event);
        }

        if event.propagation_stopped {
            return;
        }
        if let Some(nav) = &mut self.mobile_nav {
            nav.on_key_down(page, event);
        }
    }

    /// Re-read the scroll position: intersection reporters and back-to-top
    pub fn refresh(&mut self, page: &mut P) {
        if let Some(reveal) = &mut self.reveal {
            reveal.poll(page);
        }
        if let Some(spy) = &mut self.scroll_spy {
            spy.poll(page);
        }
        if let Some(back_to_top) = &self.back_to_top {
            back_to_top.evaluate(page);
        }
    }

    /// Host callback once a pending form submission has gone through
    pub fn complete_submission(&mut self, page: &mut P, form: ElementId) -> bool {
        self.forms
            .as_mut()
            .is_some_and(|forms| forms.complete(page, form))
    }

    pub fn snapshot(&self, page: &P) -> PageSnapshot {
        PageSnapshot {
            scroll_y: page.scroll_y(),
            location_hash: page.location_hash(),
            nav: self.mobile_nav.as_ref().map(MobileNav::state),
            nav_effects: self.mobile_nav.as_ref().map(|nav| nav.effects(page)),
            active_link: self
                .scroll_spy
                .as_ref()
                .and_then(ScrollSpy::active_link)
                .and_then(|link| page.attribute(link, "href")),
            revealed: self
                .reveal
                .as_ref()
                .map_or(0, RevealAnimator::revealed_count),
            back_to_top_visible: self.back_to_top.as_ref().map(|b| b.is_visible(page)),
            open_faq: self.faq.as_ref().and_then(FaqAccordion::open_index),
            pending_forms: self
                .forms
                .as_ref()
                .map_or(0, |forms| forms.pending_forms().len()),
            notification: self
                .forms
                .as_ref()
                .and_then(FormCoordinator::last_notification)
                .cloned(),
        }
    }

    pub fn mobile_nav(&self) -> Option<&MobileNav<P>> {
        self.mobile_nav.as_ref()
    }

    pub fn mobile_nav_mut(&mut self) -> Option<&mut MobileNav<P>> {
        self.mobile_nav.as_mut()
    }

    pub fn anchors(&self) -> Option<&AnchorNavigator> {
        self.anchors.as_ref()
    }

    pub fn reveal(&self) -> Option<&RevealAnimator> {
        self.reveal.as_ref()
    }

    pub fn forms(&self) -> Option<&FormCoordinator> {
        self.forms.as_ref()
    }

    pub fn faq(&self) -> Option<&FaqAccordion<P>> {
        self.faq.as_ref()
    }

    pub fn scroll_spy(&self) -> Option<&ScrollSpy> {
        self.scroll_spy.as_ref()
    }

    pub fn back_to_top(&self) -> Option<&BackToTop> {
        self.back_to_top.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::{KeyCode, Rect};
    use vela_platform::{ElementSpec, HeadlessConfig, HeadlessPage};

    #[test]
    fn test_empty_page_wires_nothing() {
        let mut page = HeadlessPage::default();
        let runtime = PageRuntime::initialize(&mut page, &PageConfig::default());
        let snap = runtime.snapshot(&page);
        assert_eq!(snap.nav, None);
        assert_eq!(snap.active_link, None);
        assert_eq!(snap.back_to_top_visible, None);
        assert_eq!(snap.revealed, 0);
    }

    #[test]
    fn test_missing_nav_does_not_block_others() {
        let mut page = HeadlessPage::new(HeadlessConfig::new(800.0, 600.0));
        let body = page.body();
        page.insert(
            body,
            ElementSpec::new("main").layout(Rect::new(0.0, 0.0, 800.0, 3000.0)),
        );
        let control = page.insert(body, ElementSpec::new("a").class("back-to-top"));
        // A panel without a toggle
        page.insert(body, ElementSpec::new("ul").class("nav-menu"));

        let mut runtime = PageRuntime::initialize(&mut page, &PageConfig::default());
        assert!(runtime.mobile_nav().is_none());
        assert!(runtime.back_to_top().is_some());

        page.set_scroll_y(900.0);
        runtime.dispatch(&mut page, &mut PageEvent::scroll());
        assert!(page.has_class(control, "show"));

        // Escape with no nav is harmless
        runtime.dispatch(&mut page, &mut PageEvent::key_down(KeyCode::ESCAPE, None));
        assert_eq!(runtime.snapshot(&page).back_to_top_visible, Some(true));
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut page = HeadlessPage::default();
        let body = page.body();
        page.insert(body, ElementSpec::new("button").class("menu-toggle"));
        page.insert(body, ElementSpec::new("ul").class("nav-menu"));
        let runtime = PageRuntime::initialize(&mut page, &PageConfig::default());

        let json = serde_json::to_value(runtime.snapshot(&page)).unwrap();
        assert_eq!(json["nav"], "closed");
        assert_eq!(json["nav_effects"]["scroll_locked"], false);
        assert!(json["active_link"].is_null());
    }
}
