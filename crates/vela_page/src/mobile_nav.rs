//! Mobile navigation state machine
//!
//! Owns the open/closed state of the collapsible navigation panel. The
//! page effects of each state are bound to state entry, so they are applied
//! together inside a single transition:
//!
//! | effect                         | Open              | Closed        |
//! |--------------------------------|-------------------|---------------|
//! | toggle `aria-expanded`         | `"true"`          | `"false"`     |
//! | panel, toggle, overlay class   | `active`          | removed       |
//! | body class                     | `menu-open`       | removed       |
//! | document element `overflow`    | `hidden`          | unset         |
//!
//! The toggle flips the state and stops propagation, so the same click does
//! not also reach the outside-click rule. Overlay clicks, fragment links in
//! the panel, `Escape` and clicks outside both panel and toggle only close.

use serde::Serialize;
use vela_core::{ElementId, KeyCode, PageEvent, StateMachine};
use vela_platform::Page;

use crate::config::{self, MobileNavConfig};

const ACTIVE: &str = "active";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavState {
    #[default]
    Closed,
    Open,
}

/// What asked the panel to change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavTrigger {
    Toggle,
    Overlay,
    PanelLink,
    Escape,
    OutsideClick,
}

impl NavTrigger {
    pub const CLOSE_TRIGGERS: [NavTrigger; 4] = [
        NavTrigger::Overlay,
        NavTrigger::PanelLink,
        NavTrigger::Escape,
        NavTrigger::OutsideClick,
    ];
}

/// The bound effects as currently visible on the page
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavEffects {
    pub toggle_expanded: bool,
    pub panel_visible: bool,
    pub overlay_visible: bool,
    pub scroll_locked: bool,
    pub body_marked: bool,
}

impl NavEffects {
    pub fn all(&self) -> bool {
        self.toggle_expanded
            && self.panel_visible
            && self.overlay_visible
            && self.scroll_locked
            && self.body_marked
    }

    pub fn none(&self) -> bool {
        !(self.toggle_expanded
            || self.panel_visible
            || self.overlay_visible
            || self.scroll_locked
            || self.body_marked)
    }
}

/// Elements the effects are written to
#[derive(Clone, Debug)]
struct Targets {
    toggle: ElementId,
    panel: ElementId,
    overlay: ElementId,
    body_class: String,
}

impl Targets {
    fn apply(&self, page: &mut dyn Page, open: bool) {
        let body = page.body();
        let root = page.document_element();

        page.set_attribute(
            self.toggle,
            "aria-expanded",
            if open { "true" } else { "false" },
        );
        set_class(page, self.panel, ACTIVE, open);
        set_class(page, self.toggle, ACTIVE, open);
        set_class(page, self.overlay, ACTIVE, open);
        set_class(page, body, &self.body_class, open);
        page.set_style(root, "overflow", if open { "hidden" } else { "" });
    }

    fn observe(&self, page: &dyn Page) -> NavEffects {
        NavEffects {
            toggle_expanded: page.attribute(self.toggle, "aria-expanded").as_deref()
                == Some("true"),
            panel_visible: page.has_class(self.panel, ACTIVE),
            overlay_visible: page.has_class(self.overlay, ACTIVE),
            scroll_locked: page.style(page.document_element(), "overflow").as_deref()
                == Some("hidden"),
            body_marked: page.has_class(page.body(), &self.body_class),
        }
    }
}

fn set_class(page: &mut dyn Page, el: ElementId, class: &str, on: bool) {
    if on {
        page.add_class(el, class);
    } else {
        page.remove_class(el, class);
    }
}

pub struct MobileNav<P: Page + 'static> {
    machine: StateMachine<NavState, NavTrigger, P>,
    targets: Targets,
}

impl<P: Page + 'static> MobileNav<P> {
    /// Wire the panel. Returns `None` (touching nothing) when the toggle or
    /// the panel is missing.
    ///
    /// A missing overlay is created and appended to the body. The page is
    /// put in the closed configuration immediately.
    pub fn init(page: &mut P, config: &MobileNavConfig) -> Option<Self> {
        let toggle = config::compile(&config.toggle, "mobile-nav").and_then(|s| page.query(&s));
        let panel = config::compile(&config.panel, "mobile-nav").and_then(|s| page.query(&s));
        let (Some(toggle), Some(panel)) = (toggle, panel) else {
            tracing::debug!(
                toggle = toggle.is_some(),
                panel = panel.is_some(),
                "mobile-nav: missing structure, not wiring"
            );
            return None;
        };

        let overlay = match config::compile(&config.overlay, "mobile-nav").and_then(|s| page.query(&s))
        {
            Some(overlay) => overlay,
            None => {
                let overlay = page.create_element("div");
                page.set_attribute(overlay, "class", &config.overlay_class);
                let body = page.body();
                page.append_child(body, overlay);
                tracing::debug!("mobile-nav: created overlay");
                overlay
            }
        };

        let panel_id = match page.attribute(panel, "id").filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => {
                page.set_attribute(panel, "id", &config.panel_id);
                config.panel_id.clone()
            }
        };
        page.set_attribute(toggle, "aria-controls", &panel_id);

        let targets = Targets {
            toggle,
            panel,
            overlay,
            body_class: config.body_open_class.clone(),
        };
        targets.apply(page, false);

        let on_open = targets.clone();
        let on_close = targets.clone();
        let mut builder = StateMachine::builder(NavState::Closed)
            .on(NavState::Closed, NavTrigger::Toggle, NavState::Open)
            .on(NavState::Open, NavTrigger::Toggle, NavState::Closed)
            .on_enter(NavState::Open, move |page: &mut P| on_open.apply(page, true))
            .on_enter(NavState::Closed, move |page: &mut P| on_close.apply(page, false));
        for trigger in NavTrigger::CLOSE_TRIGGERS {
            builder = builder.on(NavState::Open, trigger, NavState::Closed);
        }

        tracing::debug!(panel = %panel_id, "mobile-nav: wired");
        Some(Self {
            machine: builder.build(),
            targets,
        })
    }

    pub fn state(&self) -> NavState {
        self.machine.current_state()
    }

    pub fn is_open(&self) -> bool {
        self.machine.is_in(NavState::Open)
    }

    /// Apply a trigger and return the resulting state. Triggers with no
    /// transition from the current state are ignored.
    pub fn send(&mut self, page: &mut P, trigger: NavTrigger) -> NavState {
        let from = self.machine.current_state();
        let to = self.machine.send(trigger, page);
        if from != to {
            tracing::debug!(?from, ?to, ?trigger, "mobile-nav: transition");
        }
        to
    }

    /// Target-phase click handling for the toggle, overlay and panel links.
    /// Returns whether the click hit one of them.
    pub fn on_click(&mut self, page: &mut P, event: &mut PageEvent) -> bool {
        let Some(target) = event.target else {
            return false;
        };
        let Targets {
            toggle,
            panel,
            overlay,
            ..
        } = self.targets;

        if page.contains(toggle, target) {
            event.stop_propagation();
            self.send(page, NavTrigger::Toggle);
            true
        } else if page.contains(overlay, target) {
            self.send(page, NavTrigger::Overlay);
            true
        } else if page.contains(panel, target) {
            if fragment_link(page, panel, target).is_some() {
                self.send(page, NavTrigger::PanelLink);
            }
            true
        } else {
            false
        }
    }

    /// Document-level click: closes when the click landed outside both the
    /// panel and the toggle. Skipped if propagation was stopped.
    pub fn on_document_click(&mut self, page: &mut P, event: &PageEvent) {
        if event.propagation_stopped || !self.is_open() {
            return;
        }
        let outside = match event.target {
            Some(target) => {
                !page.contains(self.targets.panel, target)
                    && !page.contains(self.targets.toggle, target)
            }
            None => true,
        };
        if outside {
            self.send(page, NavTrigger::OutsideClick);
        }
    }

    /// Document-level key handling
    pub fn on_key_down(&mut self, page: &mut P, event: &PageEvent) {
        if event.key() == Some(KeyCode::ESCAPE) {
            self.send(page, NavTrigger::Escape);
        }
    }

    /// The bound effects as currently applied to the page
    pub fn effects(&self, page: &P) -> NavEffects {
        self.targets.observe(page)
    }

    pub fn toggle(&self) -> ElementId {
        self.targets.toggle
    }

    pub fn panel(&self) -> ElementId {
        self.targets.panel
    }

    pub fn overlay(&self) -> ElementId {
        self.targets.overlay
    }

    /// Transitions taken so far
    pub fn transitions(&self) -> &[(NavState, NavTrigger, NavState)] {
        self.machine.history()
    }
}

/// Nearest `<a>` at or above `node`, inside `panel`, whose `href` is a
/// fragment
fn fragment_link(page: &dyn Page, panel: ElementId, node: ElementId) -> Option<ElementId> {
    let mut cursor = Some(node);
    while let Some(el) = cursor {
        if page.tag_name(el).as_deref() == Some("a") {
            let is_fragment = page
                .attribute(el, "href")
                .is_some_and(|href| href.starts_with('#'));
            return is_fragment.then_some(el);
        }
        if el == panel {
            return None;
        }
        cursor = page.parent(el);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_platform::{ElementSpec, HeadlessConfig, HeadlessPage};

    struct Fixture {
        page: HeadlessPage,
        toggle: ElementId,
        link: ElementId,
        external: ElementId,
        content: ElementId,
    }

    fn fixture() -> Fixture {
        let mut page = HeadlessPage::new(HeadlessConfig::new(400.0, 700.0));
        let body = page.body();
        let header = page.insert(body, ElementSpec::new("header").class("navbar"));
        let toggle = page.insert(header, ElementSpec::new("button").class("menu-toggle"));
        let panel = page.insert(header, ElementSpec::new("ul").class("nav-menu"));
        let item = page.insert(panel, ElementSpec::new("li"));
        let link = page.insert(item, ElementSpec::new("a").attr("href", "#features"));
        let external = page.insert(panel, ElementSpec::new("a").attr("href", "/blog"));
        let content = page.insert(body, ElementSpec::new("main"));
        Fixture {
            page,
            toggle,
            link,
            external,
            content,
        }
    }

    fn nav(f: &mut Fixture) -> MobileNav<HeadlessPage> {
        MobileNav::init(&mut f.page, &MobileNavConfig::default()).unwrap()
    }

    #[test]
    fn test_init_accessibility_and_overlay() {
        let mut f = fixture();
        let nav = nav(&mut f);

        assert_eq!(nav.state(), NavState::Closed);
        assert_eq!(f.page.attribute(f.toggle, "aria-controls").as_deref(), Some("nav-menu"));
        assert_eq!(f.page.attribute(f.toggle, "aria-expanded").as_deref(), Some("false"));
        assert_eq!(f.page.attribute(nav.panel(), "id").as_deref(), Some("nav-menu"));

        // Overlay was created under the body
        assert!(f.page.has_class(nav.overlay(), "menu-overlay"));
        assert_eq!(f.page.parent(nav.overlay()), Some(f.page.body()));
        assert!(nav.effects(&f.page).none());
    }

    #[test]
    fn test_existing_panel_id_is_kept() {
        let mut f = fixture();
        let panel = f.page.find(".nav-menu").unwrap();
        f.page.set_attribute(panel, "id", "primary");
        let _nav = nav(&mut f);
        assert_eq!(f.page.attribute(f.toggle, "aria-controls").as_deref(), Some("primary"));
    }

    #[test]
    fn test_existing_overlay_is_reused() {
        let mut f = fixture();
        let body = f.page.body();
        let overlay = f.page.insert(body, ElementSpec::new("div").class("menu-overlay"));
        let nav = nav(&mut f);
        assert_eq!(nav.overlay(), overlay);
    }

    #[test]
    fn test_toggle_opens_and_stops_propagation() {
        let mut f = fixture();
        let mut nav = nav(&mut f);

        let mut click = PageEvent::click(f.toggle);
        assert!(nav.on_click(&mut f.page, &mut click));
        assert!(click.propagation_stopped);
        nav.on_document_click(&mut f.page, &click);

        assert!(nav.is_open());
        assert!(nav.effects(&f.page).all());
        assert!(f.page.has_class(f.toggle, "active"));
    }

    #[test]
    fn test_every_close_trigger_closes() {
        for trigger in NavTrigger::CLOSE_TRIGGERS {
            let mut f = fixture();
            let mut nav = nav(&mut f);
            nav.send(&mut f.page, NavTrigger::Toggle);
            assert_eq!(nav.send(&mut f.page, trigger), NavState::Closed, "{trigger:?}");
            assert!(nav.effects(&f.page).none(), "{trigger:?}");
        }
    }

    #[test]
    fn test_close_triggers_are_ignored_when_closed() {
        let mut f = fixture();
        let mut nav = nav(&mut f);
        for trigger in NavTrigger::CLOSE_TRIGGERS {
            assert_eq!(nav.send(&mut f.page, trigger), NavState::Closed);
        }
        assert!(nav.transitions().is_empty());
    }

    #[test]
    fn test_escape_and_outside_click() {
        let mut f = fixture();
        let mut nav = nav(&mut f);

        nav.send(&mut f.page, NavTrigger::Toggle);
        nav.on_key_down(&mut f.page, &PageEvent::key_down(KeyCode::ENTER, None));
        assert!(nav.is_open());
        nav.on_key_down(&mut f.page, &PageEvent::key_down(KeyCode::ESCAPE, None));
        assert!(!nav.is_open());

        nav.send(&mut f.page, NavTrigger::Toggle);
        let mut click = PageEvent::click(f.content);
        assert!(!nav.on_click(&mut f.page, &mut click));
        nav.on_document_click(&mut f.page, &click);
        assert!(!nav.is_open());
        assert!(nav.effects(&f.page).none());
    }

    #[test]
    fn test_panel_clicks() {
        let mut f = fixture();
        let mut nav = nav(&mut f);
        nav.send(&mut f.page, NavTrigger::Toggle);

        // Non-fragment links and the panel itself do not close
        let mut click = PageEvent::click(f.external);
        assert!(nav.on_click(&mut f.page, &mut click));
        nav.on_document_click(&mut f.page, &click);
        assert!(nav.is_open());

        let mut click = PageEvent::click(f.link);
        nav.on_click(&mut f.page, &mut click);
        assert!(!nav.is_open());
    }

    #[test]
    fn test_missing_structure_touches_nothing() {
        let mut page = HeadlessPage::default();
        let body = page.body();
        let toggle = page.insert(body, ElementSpec::new("button").class("menu-toggle"));

        assert!(MobileNav::init(&mut page, &MobileNavConfig::default()).is_none());
        assert_eq!(page.attribute(toggle, "aria-expanded"), None);
        assert!(page.find(".menu-overlay").is_err());
    }
}
