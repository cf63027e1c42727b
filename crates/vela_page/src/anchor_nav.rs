//! Smooth in-page anchor navigation
//!
//! Clicks on same-page fragment links are intercepted: the page scrolls
//! smoothly to the target, leaving room for the fixed header, and the
//! fragment is recorded in session history instead of triggering a jump.
//! Links whose fragment names no element are left to the host.

use vela_core::{ElementId, PageEvent};
use vela_platform::{Page, ScrollBehavior};

use crate::config::{self, AnchorConfig};

/// Scroll offset that puts `target_top` (viewport-relative) just below the
/// header.
pub fn target_offset(scroll_y: f32, target_top: f32, header_height: f32, margin: f32) -> f32 {
    (scroll_y + target_top - header_height - margin).max(0.0)
}

/// A completed interception
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorNavigation {
    pub link: ElementId,
    pub target: ElementId,
    /// The link's `href`, e.g. `#contact`
    pub fragment: String,
    pub offset: f32,
}

pub struct AnchorNavigator {
    links: Vec<ElementId>,
    header: Option<ElementId>,
    header_fallback: f32,
    margin: f32,
}

impl AnchorNavigator {
    /// Collect fragment links (a bare `#` is not a fragment link) and locate
    /// the header. Returns `None` when the page has no fragment links.
    pub fn init(page: &dyn Page, config: &AnchorConfig) -> Option<Self> {
        let selector = config::compile(&config.links, "anchors")?;
        let links: Vec<ElementId> = page
            .query_all(&selector)
            .into_iter()
            .filter(|&l| fragment_of(page, l).is_some())
            .collect();
        if links.is_empty() {
            tracing::debug!("anchors: no fragment links");
            return None;
        }

        let header = config
            .header
            .iter()
            .filter_map(|source| config::compile(source, "anchors"))
            .find_map(|selector| page.query(&selector));
        if header.is_none() {
            tracing::debug!(
                fallback = config.header_fallback,
                "anchors: no header, using fallback height"
            );
        }

        Some(Self {
            links,
            header,
            header_fallback: config.header_fallback,
            margin: config.fixed_margin,
        })
    }

    /// Current header height, or the fallback when there is no header
    pub fn header_height(&self, page: &dyn Page) -> f32 {
        self.header
            .map(|h| page.offset_height(h))
            .unwrap_or(self.header_fallback)
    }

    /// Fragment link containing `node`, if any
    pub fn link_for(&self, page: &dyn Page, node: ElementId) -> Option<ElementId> {
        self.links.iter().copied().find(|&l| page.contains(l, node))
    }

    /// Handle a click. Marks the event default-prevented and returns the
    /// navigation when it was intercepted.
    pub fn handle_click(
        &self,
        page: &mut dyn Page,
        event: &mut PageEvent,
    ) -> Option<AnchorNavigation> {
        let link = self.link_for(page, event.target?)?;
        self.navigate(page, link).map(|nav| {
            event.prevent_default();
            nav
        })
    }

    /// Scroll to `link`'s target and record the fragment. Returns `None`
    /// without touching the page when the fragment does not resolve.
    pub fn navigate(&self, page: &mut dyn Page, link: ElementId) -> Option<AnchorNavigation> {
        let fragment = fragment_of(page, link)?;
        let Some(target) = page.element_by_id(&fragment[1..]) else {
            tracing::debug!(%fragment, "anchors: unresolved fragment, not intercepting");
            return None;
        };

        let offset = target_offset(
            page.scroll_y(),
            page.bounding_rect(target).top(),
            self.header_height(page),
            self.margin,
        );
        page.scroll_to(offset, ScrollBehavior::Smooth);

        if page.supports_history() {
            page.push_history(&fragment);
        } else {
            page.set_location_hash(&fragment);
        }
        tracing::debug!(%fragment, offset, "anchors: navigated");

        Some(AnchorNavigation {
            link,
            target,
            fragment,
            offset,
        })
    }

    pub fn links(&self) -> &[ElementId] {
        &self.links
    }
}

/// The link's `href` if it is a non-empty fragment (`#x`)
fn fragment_of(page: &dyn Page, link: ElementId) -> Option<String> {
    page.attribute(link, "href")
        .filter(|href| href.starts_with('#') && href.len() > 1)
}
