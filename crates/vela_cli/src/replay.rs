//! Scenario replay
//!
//! Builds the scenario's page, initializes the page runtime on it and feeds
//! the steps through [`PageRuntime::dispatch`] the way a browser event loop
//! would, recording a snapshot after every step.

use anyhow::{Context, Result};
use serde::Serialize;
use vela_core::{ElementId, KeyCode, PageEvent};
use vela_page::{PageConfig, PageRuntime, PageSnapshot};
use vela_platform::{HeadlessPage, Page};

use crate::scenario::{Scenario, Step};

/// Snapshot taken after one step
#[derive(Debug, Serialize)]
pub struct StepReport {
    /// 0 is the state right after initialization
    pub step: usize,
    pub action: &'static str,
    /// Whether the runtime intercepted the host's default action
    pub default_prevented: bool,
    pub snapshot: PageSnapshot,
}

pub struct Replayer {
    page: HeadlessPage,
    runtime: PageRuntime<HeadlessPage>,
    /// Current time, advanced by `advance` steps
    now_ms: f32,
}

impl Replayer {
    pub fn new(scenario: &Scenario, config: &PageConfig) -> Result<Self> {
        let mut page = scenario.page.build().context("Failed to build page")?;
        let runtime = PageRuntime::initialize(&mut page, config);
        Ok(Self {
            page,
            runtime,
            now_ms: 0.0,
        })
    }

    pub fn report(&self, step: usize, action: &'static str, default_prevented: bool) -> StepReport {
        StepReport {
            step,
            action,
            default_prevented,
            snapshot: self.runtime.snapshot(&self.page),
        }
    }

    /// Apply one step. Returns whether the default action was prevented.
    pub fn apply(&mut self, step: &Step) -> Result<bool> {
        tracing::debug!(action = step.action(), "replaying step");
        let mut event = match step {
            Step::Click { target } => PageEvent::click(self.find(target)?),
            Step::Key { key, target } => {
                let target = match target {
                    Some(selector) => Some(self.find(selector)?),
                    None => self.page.focused(),
                };
                PageEvent::key_down(KeyCode::from_key_name(key), target)
            }
            Step::Scroll { y } => {
                self.page.set_scroll_y(*y);
                PageEvent::scroll()
            }
            Step::Advance { ms } => {
                self.now_ms += (*ms).max(0.0);
                self.page.advance(*ms);
                // A running smooth scroll moved the page
                PageEvent::scroll()
            }
            Step::Resize { width, height } => {
                self.page.resize(*width, *height);
                PageEvent::resize()
            }
            Step::Submit { form } => PageEvent::submit(self.find(form)?),
            Step::Complete { form } => {
                let form = self.find(form)?;
                if !self.runtime.complete_submission(&mut self.page, form) {
                    tracing::warn!("complete: form has no pending submission");
                }
                return Ok(false);
            }
        };

        event.timestamp = self.now_ms as u64;
        self.runtime.dispatch(&mut self.page, &mut event);
        Ok(event.default_prevented)
    }

    fn find(&self, selector: &str) -> Result<ElementId> {
        self.page
            .find(selector)
            .with_context(|| format!("No element matches `{selector}`"))
    }
}

/// Replay every step, reporting the initial state and each step
pub fn replay(scenario: &Scenario, config: &PageConfig) -> Result<Vec<StepReport>> {
    let mut replayer = Replayer::new(scenario, config)?;
    let mut reports = vec![replayer.report(0, "init", false)];
    for (i, step) in scenario.steps.iter().enumerate() {
        let prevented = replayer
            .apply(step)
            .with_context(|| format!("Step {} ({}) failed", i + 1, step.action()))?;
        reports.push(replayer.report(i + 1, step.action(), prevented));
    }
    Ok(reports)
}

/// Check a scenario without running it: config values, the page and every
/// selector the steps use. Returns the element and step counts.
pub fn check(scenario: &Scenario, config: &PageConfig) -> Result<(usize, usize)> {
    config.validate().context("Invalid page config")?;
    let page = scenario.page.build().context("Failed to build page")?;
    for (i, step) in scenario.steps.iter().enumerate() {
        for selector in step.selectors() {
            page.find(selector)
                .with_context(|| format!("Step {} ({})", i + 1, step.action()))?;
        }
    }
    Ok((page.elements().len(), scenario.steps.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_page::NavState;

    fn demo() -> Scenario {
        Scenario::parse(include_str!("../../../demos/landing.toml")).unwrap()
    }

    #[test]
    fn test_demo_replays() {
        let scenario = demo();
        let config = scenario.page_config(None).unwrap();
        let reports = replay(&scenario, &config).unwrap();
        assert_eq!(reports.len(), scenario.steps.len() + 1);
        assert_eq!(reports[0].snapshot.nav, Some(NavState::Closed));
        assert!(reports.iter().all(|r| r.snapshot.nav_effects.is_some()));
    }

    #[test]
    fn test_demo_checks() {
        let scenario = demo();
        let (elements, steps) = check(&scenario, &PageConfig::default()).unwrap();
        assert!(elements > 2);
        assert_eq!(steps, scenario.steps.len());
    }

    #[test]
    fn test_menu_steps() {
        let scenario = Scenario::parse(
            r##"
[[page.elements]]
tag = "button"
class = "menu-toggle"

[[page.elements]]
tag = "ul"
class = "nav-menu"

[[steps]]
action = "click"
target = ".menu-toggle"

[[steps]]
action = "key"
key = "Escape"
"##,
        )
        .unwrap();
        let reports = replay(&scenario, &PageConfig::default()).unwrap();
        assert_eq!(reports[1].snapshot.nav, Some(NavState::Open));
        assert!(reports[1].snapshot.nav_effects.unwrap().all());
        assert_eq!(reports[2].snapshot.nav, Some(NavState::Closed));
    }

    #[test]
    fn test_unknown_target_fails_with_step() {
        let scenario = Scenario::parse(
            r#"
[[steps]]
action = "click"
target = ".missing"
"#,
        )
        .unwrap();
        let err = replay(&scenario, &PageConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Step 1 (click)"));
        assert!(check(&scenario, &PageConfig::default()).is_err());
    }
}
