//! Reveal-on-scroll
//!
//! Registered elements start hidden (transparent, shifted down) and are
//! revealed the first time they are reported intersecting. Revealing
//! unregisters the element from its reporter, so later reports cannot reach
//! it: each element goes hidden → visible at most once and never re-hides.

use rustc_hash::FxHashMap;
use vela_core::{ElementId, RootMargin};
use vela_platform::Page;

use crate::config::{self, RevealConfig};
use crate::reporter::{IntersectionEntry, IntersectionReporter, ObserverOptions};

pub struct RevealAnimator {
    reporter: IntersectionReporter,
    /// `revealed` flag per registered element, in registration order
    order: Vec<ElementId>,
    revealed: FxHashMap<ElementId, bool>,
}

impl RevealAnimator {
    /// Hide and register every element matching the configured targets,
    /// then deliver the initial intersection report.
    ///
    /// Returns `None` when nothing matches.
    pub fn init(page: &mut dyn Page, config: &RevealConfig) -> Option<Self> {
        let selector = config::compile(&config.targets, "reveal")?;
        let targets = page.query_all(&selector);
        if targets.is_empty() {
            tracing::debug!(selector = %selector, "reveal: no targets");
            return None;
        }

        let margin = match RootMargin::parse(&config.root_margin) {
            Ok(margin) => margin,
            Err(err) => {
                tracing::warn!("reveal: ignoring root margin: {}", err);
                RootMargin::default()
            }
        };
        let options = ObserverOptions::new([config.threshold]).with_root_margin(margin);
        let mut reporter = IntersectionReporter::new(page, options);

        let hidden_transform = format!("translateY({}px)", config.hidden_offset);
        for &el in &targets {
            page.set_style(el, "opacity", "0");
            page.set_style(el, "transform", &hidden_transform);
            page.set_style(el, "transition", &config.transition);
            reporter.observe(el);
        }

        let mut animator = Self {
            reporter,
            revealed: targets.iter().map(|&el| (el, false)).collect(),
            order: targets,
        };
        let initially_visible = animator.poll(page);
        tracing::debug!(
            targets = animator.order.len(),
            initially_visible,
            "reveal: wired"
        );
        Some(animator)
    }

    /// Check visibility and reveal newly intersecting elements.
    ///
    /// Returns how many elements were revealed by this call.
    pub fn poll(&mut self, page: &mut dyn Page) -> usize {
        let entries = self.reporter.check(page);
        self.deliver(page, &entries)
    }

    /// Apply an intersection batch. Entries for elements that are no longer
    /// registered are ignored.
    pub fn deliver(&mut self, page: &mut dyn Page, entries: &[IntersectionEntry]) -> usize {
        let mut count = 0;
        for entry in entries {
            if !entry.is_intersecting || !self.reporter.is_observing(entry.target) {
                continue;
            }
            if self.reveal(page, entry.target) {
                count += 1;
            }
        }
        count
    }

    fn reveal(&mut self, page: &mut dyn Page, el: ElementId) -> bool {
        let Some(revealed) = self.revealed.get_mut(&el) else {
            return false;
        };
        if *revealed {
            return false;
        }
        *revealed = true;

        page.set_style(el, "opacity", "1");
        page.set_style(el, "transform", "translateY(0)");
        self.reporter.unobserve(el);
        tracing::trace!(?el, "revealed");
        true
    }

    pub fn is_revealed(&self, el: ElementId) -> bool {
        self.revealed.get(&el).copied().unwrap_or(false)
    }

    /// Registered elements in document order
    pub fn targets(&self) -> &[ElementId] {
        &self.order
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.values().filter(|&&r| r).count()
    }

    /// Elements still waiting to be revealed
    pub fn pending_count(&self) -> usize {
        self.reporter.len()
    }
}
