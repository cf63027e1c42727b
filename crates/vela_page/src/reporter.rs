//! Viewport intersection reporting
//!
//! An [`IntersectionReporter`] tracks a set of elements against the viewport
//! (grown or shrunk by a root margin) and, on each [`check`], reports the
//! elements whose intersection state changed since the previous check.
//! The first check after [`observe`] always reports the element, so
//! consumers see an initial state for everything they register.
//!
//! Delivery is pull-based: the owner calls `check` from its scroll/resize
//! handler and processes the returned batch in order. An element removed
//! with [`unobserve`] while a batch is being processed is still present in
//! that batch; consumers skip such entries with [`is_observing`].
//!
//! When the host has no native visibility observer the reporter fails open:
//! every registered element is reported once as fully intersecting and
//! never changes afterwards, so one-shot effects still reach their terminal
//! state.
//!
//! [`check`]: IntersectionReporter::check
//! [`observe`]: IntersectionReporter::observe
//! [`unobserve`]: IntersectionReporter::unobserve
//! [`is_observing`]: IntersectionReporter::is_observing

use vela_core::{ElementId, Rect, RootMargin};
use vela_platform::Page;

/// Observation parameters
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    /// Visible fractions that delimit intersection states, sorted ascending
    thresholds: Vec<f32>,
    pub root_margin: RootMargin,
}

impl ObserverOptions {
    pub fn new(thresholds: impl IntoIterator<Item = f32>) -> Self {
        let mut thresholds: Vec<f32> = thresholds
            .into_iter()
            .filter(|t| !t.is_nan())
            .map(|t| t.clamp(0.0, 1.0))
            .collect();
        thresholds.sort_by(f32::total_cmp);
        thresholds.dedup();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }
        Self {
            thresholds,
            root_margin: RootMargin::default(),
        }
    }

    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    /// Number of thresholds reached by an overlap, 0 when not intersecting
    fn bucket(&self, overlap: Option<f32>) -> usize {
        match overlap {
            None => 0,
            Some(ratio) => self.thresholds.iter().filter(|&&t| ratio >= t).count(),
        }
    }
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self::new([0.0])
    }
}

/// A change in one element's intersection state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    pub is_intersecting: bool,
    /// Visible fraction of the element's area
    pub ratio: f32,
}

/// How intersections are determined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReporterMode {
    /// Measure element boxes against the viewport
    Native,
    /// Report everything as permanently intersecting
    FailOpen,
}

struct Tracked {
    target: ElementId,
    /// Threshold bucket at the last report; `None` until first reported
    last_bucket: Option<usize>,
}

pub struct IntersectionReporter {
    options: ObserverOptions,
    mode: ReporterMode,
    tracked: Vec<Tracked>,
}

impl IntersectionReporter {
    /// Create a reporter, failing open if `page` cannot observe visibility
    pub fn new(page: &dyn Page, options: ObserverOptions) -> Self {
        let mode = if page.supports_intersection_observer() {
            ReporterMode::Native
        } else {
            tracing::debug!("no intersection observer; reporting all targets as visible");
            ReporterMode::FailOpen
        };
        Self::with_mode(options, mode)
    }

    pub fn with_mode(options: ObserverOptions, mode: ReporterMode) -> Self {
        Self {
            options,
            mode,
            tracked: Vec::new(),
        }
    }

    pub fn mode(&self) -> ReporterMode {
        self.mode
    }

    pub fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Start tracking `target`. Already-tracked elements are left as they are.
    pub fn observe(&mut self, target: ElementId) {
        if !self.is_observing(target) {
            self.tracked.push(Tracked {
                target,
                last_bucket: None,
            });
        }
    }

    pub fn observe_all(&mut self, targets: impl IntoIterator<Item = ElementId>) {
        for target in targets {
            self.observe(target);
        }
    }

    /// Stop tracking `target`. Returns whether it was tracked; untracked
    /// elements are a no-op.
    pub fn unobserve(&mut self, target: ElementId) -> bool {
        let before = self.tracked.len();
        self.tracked.retain(|t| t.target != target);
        self.tracked.len() != before
    }

    /// Stop tracking everything
    pub fn disconnect(&mut self) {
        self.tracked.clear();
    }

    pub fn is_observing(&self, target: ElementId) -> bool {
        self.tracked.iter().any(|t| t.target == target)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Measure every tracked element and return those whose state changed,
    /// in registration order.
    pub fn check(&mut self, page: &dyn Page) -> Vec<IntersectionEntry> {
        match self.mode {
            ReporterMode::Native => self.check_native(page),
            ReporterMode::FailOpen => self.check_fail_open(),
        }
    }

    fn check_native(&mut self, page: &dyn Page) -> Vec<IntersectionEntry> {
        let root = self.options.root_margin.apply(&page.viewport());
        let mut entries = Vec::new();

        for tracked in &mut self.tracked {
            let rect = page.bounding_rect(tracked.target);
            let overlap = intersection_ratio(&root, &rect);
            let bucket = self.options.bucket(overlap);

            if tracked.last_bucket == Some(bucket) {
                continue;
            }
            tracked.last_bucket = Some(bucket);
            entries.push(IntersectionEntry {
                target: tracked.target,
                is_intersecting: bucket > 0,
                ratio: overlap.unwrap_or(0.0),
            });
        }
        entries
    }

    fn check_fail_open(&mut self) -> Vec<IntersectionEntry> {
        let full = self.options.thresholds.len();
        self.tracked
            .iter_mut()
            .filter(|t| t.last_bucket.is_none())
            .map(|t| {
                t.last_bucket = Some(full);
                IntersectionEntry {
                    target: t.target,
                    is_intersecting: true,
                    ratio: 1.0,
                }
            })
            .collect()
    }
}

/// Visible fraction of `rect` inside `root`, `None` if they do not touch.
///
/// Zero-area elements count as fully visible when they touch the root.
fn intersection_ratio(root: &Rect, rect: &Rect) -> Option<f32> {
    let overlap = root.intersect(rect)?;
    let area = rect.area();
    if area <= 0.0 {
        Some(1.0)
    } else {
        Some((overlap.area() / area).min(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_platform::{ElementSpec, HeadlessConfig, HeadlessPage};

    fn page() -> (HeadlessPage, ElementId, ElementId) {
        let mut page = HeadlessPage::new(HeadlessConfig::new(800.0, 600.0));
        let body = page.body();
        let top = page.insert(
            body,
            ElementSpec::new("div").layout(Rect::new(0.0, 100.0, 800.0, 200.0)),
        );
        let below = page.insert(
            body,
            ElementSpec::new("div").layout(Rect::new(0.0, 1000.0, 800.0, 400.0)),
        );
        (page, top, below)
    }

    #[test]
    fn test_first_check_reports_everything() {
        let (page, top, below) = page();
        let mut reporter = IntersectionReporter::new(&page, ObserverOptions::default());
        reporter.observe_all([top, below]);

        let entries = reporter.check(&page);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].target, top);
        assert!(entries[0].is_intersecting);
        assert_eq!(entries[0].ratio, 1.0);
        assert_eq!(entries[1].target, below);
        assert!(!entries[1].is_intersecting);

        // Nothing moved
        assert!(reporter.check(&page).is_empty());
    }

    #[test]
    fn test_reports_only_changes() {
        let (mut page, top, below) = page();
        let mut reporter = IntersectionReporter::new(&page, ObserverOptions::new([0.5]));
        reporter.observe_all([top, below]);
        reporter.check(&page);

        // `below` becomes half visible: 200 of its 400px
        page.set_scroll_y(600.0);
        let entries = reporter.check(&page);
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].is_intersecting);
        assert_eq!(entries[1].target, below);
        assert!(entries[1].is_intersecting);
        assert!((entries[1].ratio - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_threshold_not_reached_is_not_intersecting() {
        let (mut page, _, below) = page();
        let mut reporter = IntersectionReporter::new(&page, ObserverOptions::new([0.5]));
        reporter.observe(below);

        // 100 of 400px visible
        page.set_scroll_y(500.0);
        let entries = reporter.check(&page);
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].is_intersecting);
        assert!((entries[0].ratio - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_root_margin_shrinks_viewport() {
        let (mut page, _, below) = page();
        let margin = RootMargin::parse("0px 0px -50px 0px").unwrap();
        let mut reporter =
            IntersectionReporter::new(&page, ObserverOptions::new([0.12]).with_root_margin(margin));
        reporter.observe(below);

        // 40px of the element is inside the viewport but below the shrunk root
        page.set_scroll_y(440.0);
        assert!(!reporter.check(&page)[0].is_intersecting);

        // 150px in the viewport, 100px inside the root: 25%
        page.set_scroll_y(550.0);
        let entries = reporter.check(&page);
        assert!(entries[0].is_intersecting);
    }

    #[test]
    fn test_unobserve_is_idempotent() {
        let (page, top, below) = page();
        let mut reporter = IntersectionReporter::new(&page, ObserverOptions::default());
        reporter.observe_all([top, below]);

        assert!(reporter.unobserve(top));
        assert!(!reporter.unobserve(top));
        assert!(!reporter.is_observing(top));

        let entries = reporter.check(&page);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].target, below);
    }

    #[test]
    fn test_observe_twice_keeps_one_registration() {
        let (page, top, _) = page();
        let mut reporter = IntersectionReporter::new(&page, ObserverOptions::default());
        reporter.observe(top);
        reporter.observe(top);
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn test_fail_open_reports_once_as_visible() {
        let mut page = HeadlessPage::new(
            HeadlessConfig::new(800.0, 600.0).without_intersection_observer(),
        );
        let body = page.body();
        let far = page.insert(
            body,
            ElementSpec::new("div").layout(Rect::new(0.0, 5000.0, 800.0, 100.0)),
        );

        let mut reporter = IntersectionReporter::new(&page, ObserverOptions::new([0.5]));
        assert_eq!(reporter.mode(), ReporterMode::FailOpen);
        reporter.observe(far);

        let entries = reporter.check(&page);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].is_intersecting);

        page.set_scroll_y(4000.0);
        assert!(reporter.check(&page).is_empty());
    }

    #[test]
    fn test_thresholds_are_normalized() {
        let options = ObserverOptions::new([0.5, 2.0, -1.0, 0.5, f32::NAN]);
        let expected: &[f32] = &[0.0, 0.5, 1.0];
        assert_eq!(options.thresholds(), expected);

        let fallback: &[f32] = &[0.0];
        assert_eq!(ObserverOptions::new(Vec::new()).thresholds(), fallback);
    }
}
