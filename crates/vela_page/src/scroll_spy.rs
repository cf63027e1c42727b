//! Scroll spy
//!
//! Keeps at most one navigation link marked active: the link whose
//! fragment names the section most recently reported intersecting. When
//! several sections start intersecting in one batch the last one in report
//! order wins. Sections leaving the viewport never clear the mark on their
//! own; only another section becoming active moves it.

use vela_core::ElementId;
use vela_platform::Page;

use crate::config::{self, ScrollSpyConfig};
use crate::reporter::{IntersectionEntry, IntersectionReporter, ObserverOptions};

struct Section {
    el: ElementId,
    /// Link targeting this section, resolved once at wiring time
    link: Option<ElementId>,
}

pub struct ScrollSpy {
    reporter: IntersectionReporter,
    sections: Vec<Section>,
    links: Vec<ElementId>,
    active: Option<ElementId>,
    active_class: String,
}

impl ScrollSpy {
    /// Track every configured section. Returns `None` if there are no
    /// sections or no navigation links.
    pub fn init(page: &mut dyn Page, config: &ScrollSpyConfig) -> Option<Self> {
        let section_selector = config::compile(&config.sections, "scroll-spy")?;
        let link_selector = config::compile(&config.links, "scroll-spy")?;

        let sections = page.query_all(&section_selector);
        let links = page.query_all(&link_selector);
        if sections.is_empty() || links.is_empty() {
            tracing::debug!(
                sections = sections.len(),
                links = links.len(),
                "scroll-spy: nothing to track"
            );
            return None;
        }

        let mut reporter =
            IntersectionReporter::new(page, ObserverOptions::new([config.threshold]));
        reporter.observe_all(sections.iter().copied());

        let sections = sections
            .into_iter()
            .map(|el| Section {
                el,
                link: link_for(page, &links, el),
            })
            .collect();

        // A link already marked in markup is the initial active link
        let active = links
            .iter()
            .copied()
            .find(|&l| page.has_class(l, &config.active_class));

        let mut spy = Self {
            reporter,
            sections,
            links,
            active,
            active_class: config.active_class.clone(),
        };
        spy.poll(page);
        tracing::debug!(
            sections = spy.sections.len(),
            links = spy.links.len(),
            "scroll-spy: wired"
        );
        Some(spy)
    }

    /// Check section visibility and move the active mark if needed
    pub fn poll(&mut self, page: &mut dyn Page) {
        let entries = self.reporter.check(page);
        self.deliver(page, &entries);
    }

    /// Apply an intersection batch in report order
    pub fn deliver(&mut self, page: &mut dyn Page, entries: &[IntersectionEntry]) {
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            let Some(link) = self
                .sections
                .iter()
                .find(|s| s.el == entry.target)
                .and_then(|s| s.link)
            else {
                continue;
            };
            self.activate(page, link);
        }
    }

    fn activate(&mut self, page: &mut dyn Page, link: ElementId) {
        for &other in &self.links {
            page.remove_class(other, &self.active_class);
        }
        page.add_class(link, &self.active_class);

        if self.active != Some(link) {
            tracing::debug!(
                href = page.attribute(link, "href").as_deref().unwrap_or(""),
                "scroll-spy: active link changed"
            );
        }
        self.active = Some(link);
    }

    /// The currently active link
    pub fn active_link(&self) -> Option<ElementId> {
        self.active
    }

    /// Id of the section the active link points at
    pub fn active_section(&self) -> Option<ElementId> {
        let link = self.active?;
        self.sections
            .iter()
            .find(|s| s.link == Some(link))
            .map(|s| s.el)
    }

    pub fn links(&self) -> &[ElementId] {
        &self.links
    }
}

/// First link whose `href` is exactly `#<section id>`
fn link_for(page: &dyn Page, links: &[ElementId], section: ElementId) -> Option<ElementId> {
    let id = page.attribute(section, "id")?;
    let href = format!("#{id}");
    links
        .iter()
        .copied()
        .find(|&l| page.attribute(l, "href").as_deref() == Some(href.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_core::Rect;
    use vela_platform::{ElementSpec, HeadlessConfig, HeadlessPage};

    struct Fixture {
        page: HeadlessPage,
        links: Vec<ElementId>,
        sections: Vec<ElementId>,
    }

    /// Three 600px sections stacked from y=0, viewport 800x600
    fn fixture() -> Fixture {
        let mut page = HeadlessPage::new(HeadlessConfig::new(800.0, 600.0));
        let body = page.body();
        let nav = page.insert(body, ElementSpec::new("ul").class("nav-menu"));

        let mut links = Vec::new();
        let mut sections = Vec::new();
        for (i, id) in ["home", "features", "contact"].into_iter().enumerate() {
            links.push(page.insert(nav, ElementSpec::new("a").attr("href", &format!("#{id}"))));
            sections.push(page.insert(
                body,
                ElementSpec::new("section")
                    .id(id)
                    .layout(Rect::new(0.0, i as f32 * 600.0, 800.0, 600.0)),
            ));
        }
        Fixture {
            page,
            links,
            sections,
        }
    }

    fn active_links(page: &HeadlessPage, links: &[ElementId]) -> Vec<ElementId> {
        links
            .iter()
            .copied()
            .filter(|&l| page.has_class(l, "active"))
            .collect()
    }

    #[test]
    fn test_initial_section_is_active() {
        let mut f = fixture();
        let spy = ScrollSpy::init(&mut f.page, &ScrollSpyConfig::default()).unwrap();
        assert_eq!(spy.active_link(), Some(f.links[0]));
        assert_eq!(spy.active_section(), Some(f.sections[0]));
        assert_eq!(active_links(&f.page, &f.links), vec![f.links[0]]);
    }

    #[test]
    fn test_active_follows_scroll() {
        let mut f = fixture();
        let mut spy = ScrollSpy::init(&mut f.page, &ScrollSpyConfig::default()).unwrap();

        f.page.set_scroll_y(600.0);
        spy.poll(&mut f.page);
        assert_eq!(spy.active_link(), Some(f.links[1]));
        assert_eq!(active_links(&f.page, &f.links), vec![f.links[1]]);
    }

    #[test]
    fn test_no_flicker_when_nothing_intersects() {
        let mut f = fixture();
        let mut spy = ScrollSpy::init(&mut f.page, &ScrollSpyConfig::default()).unwrap();

        // S1 stops intersecting and nothing else starts
        let leave = IntersectionEntry {
            target: f.sections[0],
            is_intersecting: false,
            ratio: 0.1,
        };
        spy.deliver(&mut f.page, &[leave]);
        assert_eq!(spy.active_link(), Some(f.links[0]));
        assert_eq!(active_links(&f.page, &f.links), vec![f.links[0]]);
    }

    #[test]
    fn test_last_in_batch_wins() {
        let mut f = fixture();
        let mut spy = ScrollSpy::init(&mut f.page, &ScrollSpyConfig::default()).unwrap();

        let batch: Vec<IntersectionEntry> = [2, 1]
            .into_iter()
            .map(|i| IntersectionEntry {
                target: f.sections[i],
                is_intersecting: true,
                ratio: 0.6,
            })
            .collect();
        spy.deliver(&mut f.page, &batch);
        assert_eq!(spy.active_link(), Some(f.links[1]));
        assert_eq!(active_links(&f.page, &f.links), vec![f.links[1]]);
    }

    #[test]
    fn test_section_without_link_is_ignored() {
        let mut f = fixture();
        let body = f.page.body();
        let orphan = f.page.insert(
            body,
            ElementSpec::new("section")
                .id("orphan")
                .layout(Rect::new(0.0, 1800.0, 800.0, 600.0)),
        );
        let mut spy = ScrollSpy::init(&mut f.page, &ScrollSpyConfig::default()).unwrap();

        f.page.set_scroll_y(1800.0);
        spy.poll(&mut f.page);
        // Orphan is the only section past the threshold; contact is not
        assert_ne!(spy.active_section(), Some(orphan));
        assert_eq!(active_links(&f.page, &f.links).len(), 1);
    }

    #[test]
    fn test_requires_sections_and_links() {
        let mut page = HeadlessPage::new(HeadlessConfig::default());
        let body = page.body();
        page.insert(body, ElementSpec::new("section").id("lonely"));
        assert!(ScrollSpy::init(&mut page, &ScrollSpyConfig::default()).is_none());
    }
}
