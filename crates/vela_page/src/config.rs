//! Page runtime configuration
//!
//! Every selector and constant the components use, with defaults matching a
//! conventional landing page. The CLI loads it from TOML (`page.toml`); any
//! omitted table or key falls back to its default.

use serde::{Deserialize, Serialize};
use vela_core::RootMargin;
use vela_platform::Selector;

use crate::error::{PageError, Result};

/// Top-level runtime configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PageConfig {
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub scroll_spy: ScrollSpyConfig,
    #[serde(default)]
    pub anchors: AnchorConfig,
    #[serde(default)]
    pub mobile_nav: MobileNavConfig,
    #[serde(default)]
    pub back_to_top: BackToTopConfig,
    #[serde(default)]
    pub faq: FaqConfig,
    #[serde(default)]
    pub forms: FormsConfig,
}

impl PageConfig {
    /// Check every selector and margin up front.
    ///
    /// Components also tolerate bad values at initialization (they log and
    /// stay unwired), so this is for reporting problems early.
    pub fn validate(&self) -> Result<()> {
        let selectors = [
            &self.reveal.targets,
            &self.scroll_spy.sections,
            &self.scroll_spy.links,
            &self.anchors.links,
            &self.mobile_nav.toggle,
            &self.mobile_nav.panel,
            &self.mobile_nav.overlay,
            &self.back_to_top.control,
            &self.faq.items,
            &self.faq.question,
            &self.faq.answer,
            &self.forms.forms,
            &self.forms.submit_control,
            &self.forms.required_fields,
        ];
        for source in selectors
            .into_iter()
            .chain(self.anchors.header.iter())
        {
            Selector::parse(source).map_err(|err| PageError::Selector {
                selector: source.clone(),
                source: err,
            })?;
        }

        RootMargin::parse(&self.reveal.root_margin)?;

        let thresholds = [self.reveal.threshold, self.scroll_spy.threshold];
        if let Some(bad) = thresholds.iter().find(|t| !(0.0..=1.0).contains(*t)) {
            return Err(PageError::Threshold(*bad));
        }
        Ok(())
    }
}

/// Parse a configured selector for `component`, logging instead of failing.
///
/// A component whose selector does not parse stays unwired, like one whose
/// elements are missing.
pub(crate) fn compile(source: &str, component: &'static str) -> Option<Selector> {
    match Selector::parse(source) {
        Ok(selector) => Some(selector),
        Err(err) => {
            tracing::warn!(component, selector = source, "skipping: {}", err);
            None
        }
    }
}

/// Reveal-on-scroll targets
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RevealConfig {
    #[serde(default = "default_reveal_targets")]
    pub targets: String,
    /// Fraction of the element that must be visible
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f32,
    /// CSS margin around the viewport, e.g. `"0px 0px -50px 0px"`
    #[serde(default = "default_reveal_margin")]
    pub root_margin: String,
    /// Downward offset while hidden, in px
    #[serde(default = "default_reveal_offset")]
    pub hidden_offset: f32,
    #[serde(default = "default_reveal_transition")]
    pub transition: String,
}

fn default_reveal_targets() -> String {
    ".card, .feature-card, .contact-form, .hero h1, .hero p".to_string()
}

fn default_reveal_threshold() -> f32 {
    0.12
}

fn default_reveal_margin() -> String {
    "0px 0px -50px 0px".to_string()
}

fn default_reveal_offset() -> f32 {
    18.0
}

fn default_reveal_transition() -> String {
    "opacity 0.7s ease, transform 0.7s ease".to_string()
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            targets: default_reveal_targets(),
            threshold: default_reveal_threshold(),
            root_margin: default_reveal_margin(),
            hidden_offset: default_reveal_offset(),
            transition: default_reveal_transition(),
        }
    }
}

/// Active-link tracking
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScrollSpyConfig {
    #[serde(default = "default_spy_sections")]
    pub sections: String,
    #[serde(default = "default_spy_links")]
    pub links: String,
    #[serde(default = "default_spy_threshold")]
    pub threshold: f32,
    /// Class marking the active link
    #[serde(default = "default_active_class")]
    pub active_class: String,
}

fn default_spy_sections() -> String {
    "section[id]".to_string()
}

fn default_spy_links() -> String {
    ".nav-menu a".to_string()
}

fn default_spy_threshold() -> f32 {
    0.5
}

fn default_active_class() -> String {
    "active".to_string()
}

impl Default for ScrollSpyConfig {
    fn default() -> Self {
        Self {
            sections: default_spy_sections(),
            links: default_spy_links(),
            threshold: default_spy_threshold(),
            active_class: default_active_class(),
        }
    }
}

/// Smooth in-page anchor navigation
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnchorConfig {
    #[serde(default = "default_anchor_links")]
    pub links: String,
    /// Header candidates, first match wins
    #[serde(default = "default_headers")]
    pub header: Vec<String>,
    /// Header height when no header element exists
    #[serde(default = "default_header_fallback")]
    pub header_fallback: f32,
    /// Extra gap between the header and the target
    #[serde(default = "default_fixed_margin")]
    pub fixed_margin: f32,
}

fn default_anchor_links() -> String {
    "a[href^=\"#\"]".to_string()
}

fn default_headers() -> Vec<String> {
    vec![".navbar".to_string(), "nav".to_string()]
}

fn default_header_fallback() -> f32 {
    70.0
}

fn default_fixed_margin() -> f32 {
    16.0
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            links: default_anchor_links(),
            header: default_headers(),
            header_fallback: default_header_fallback(),
            fixed_margin: default_fixed_margin(),
        }
    }
}

/// Collapsible navigation panel
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MobileNavConfig {
    #[serde(default = "default_toggle")]
    pub toggle: String,
    #[serde(default = "default_panel")]
    pub panel: String,
    #[serde(default = "default_overlay")]
    pub overlay: String,
    /// Class given to a created overlay
    #[serde(default = "default_overlay_class")]
    pub overlay_class: String,
    /// Id assigned to the panel when it has none
    #[serde(default = "default_panel_id")]
    pub panel_id: String,
    /// Body class while the menu is open
    #[serde(default = "default_body_class")]
    pub body_open_class: String,
}

fn default_toggle() -> String {
    ".menu-toggle".to_string()
}

fn default_panel() -> String {
    ".nav-menu".to_string()
}

fn default_overlay() -> String {
    ".menu-overlay".to_string()
}

fn default_overlay_class() -> String {
    "menu-overlay".to_string()
}

fn default_panel_id() -> String {
    "nav-menu".to_string()
}

fn default_body_class() -> String {
    "menu-open".to_string()
}

impl Default for MobileNavConfig {
    fn default() -> Self {
        Self {
            toggle: default_toggle(),
            panel: default_panel(),
            overlay: default_overlay(),
            overlay_class: default_overlay_class(),
            panel_id: default_panel_id(),
            body_open_class: default_body_class(),
        }
    }
}

/// Scroll-to-top control
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BackToTopConfig {
    #[serde(default = "default_back_to_top")]
    pub control: String,
    /// Shown strictly above this offset
    #[serde(default = "default_back_to_top_threshold")]
    pub threshold: f32,
    #[serde(default = "default_show_class")]
    pub show_class: String,
}

fn default_back_to_top() -> String {
    ".back-to-top".to_string()
}

fn default_back_to_top_threshold() -> f32 {
    400.0
}

fn default_show_class() -> String {
    "show".to_string()
}

impl Default for BackToTopConfig {
    fn default() -> Self {
        Self {
            control: default_back_to_top(),
            threshold: default_back_to_top_threshold(),
            show_class: default_show_class(),
        }
    }
}

/// FAQ accordion
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FaqConfig {
    #[serde(default = "default_faq_items")]
    pub items: String,
    #[serde(default = "default_faq_question")]
    pub question: String,
    #[serde(default = "default_faq_answer")]
    pub answer: String,
}

fn default_faq_items() -> String {
    ".faq-item".to_string()
}

fn default_faq_question() -> String {
    ".faq-question".to_string()
}

fn default_faq_answer() -> String {
    ".faq-answer".to_string()
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            items: default_faq_items(),
            question: default_faq_question(),
            answer: default_faq_answer(),
        }
    }
}

/// Form submission flow and its user-facing strings
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FormsConfig {
    #[serde(default = "default_forms")]
    pub forms: String,
    /// Id of the newsletter form, handled by its own email-only flow
    #[serde(default = "default_newsletter")]
    pub newsletter_id: String,
    #[serde(default = "default_submit_control")]
    pub submit_control: String,
    #[serde(default = "default_required_fields")]
    pub required_fields: String,
    #[serde(default)]
    pub messages: FormMessages,
}

fn default_forms() -> String {
    "form".to_string()
}

fn default_newsletter() -> String {
    "newsletter-form".to_string()
}

fn default_submit_control() -> String {
    "button[type=\"submit\"], input[type=\"submit\"]".to_string()
}

fn default_required_fields() -> String {
    "input[required], textarea[required], select[required]".to_string()
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            forms: default_forms(),
            newsletter_id: default_newsletter(),
            submit_control: default_submit_control(),
            required_fields: default_required_fields(),
            messages: FormMessages::default(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct FormMessages {
    pub sending: String,
    pub sent: String,
    pub subscribing: String,
    pub subscribed: String,
    pub subscribe_label: String,
    pub invalid_email: String,
}

impl Default for FormMessages {
    fn default() -> Self {
        Self {
            sending: "Sending...".to_string(),
            sent: "Your message has been sent!".to_string(),
            subscribing: "Subscribing...".to_string(),
            subscribed: "Thanks! You're subscribed to the newsletter.".to_string(),
            subscribe_label: "Subscribe".to_string(),
            invalid_email: "Please enter a valid email address".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: PageConfig = toml::from_str(
            r#"
[back_to_top]
threshold = 300

[forms.messages]
sent = "Merci !"
"#,
        )
        .unwrap();

        assert_eq!(config.back_to_top.threshold, 300.0);
        assert_eq!(config.back_to_top.control, ".back-to-top");
        assert_eq!(config.back_to_top.show_class, "show");
        assert_eq!(config.forms.messages.sent, "Merci !");
        assert_eq!(config.forms.messages.sending, "Sending...");
        assert_eq!(config.reveal.threshold, 0.12);
        assert_eq!(config.anchors.header, vec![".navbar", "nav"]);
        assert_eq!(config.anchors.header_fallback, 70.0);
        assert_eq!(config.scroll_spy.threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config: PageConfig = toml::from_str("").unwrap();
        assert_eq!(config.mobile_nav.toggle, ".menu-toggle");
        assert_eq!(config.mobile_nav.panel_id, "nav-menu");
        assert_eq!(config.faq.items, ".faq-item");
        assert_eq!(config.forms.newsletter_id, "newsletter-form");
    }

    #[test]
    fn test_multiline_selector_validates() {
        let config: PageConfig = toml::from_str(
            r#"
[reveal]
targets = """
.card,
	.hero h1"""
"#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PageConfig::default();
        config.scroll_spy.threshold = 1.5;
        assert!(matches!(config.validate(), Err(PageError::Threshold(t)) if t == 1.5));

        let mut config = PageConfig::default();
        config.faq.items = ".faq-item[".to_string();
        assert!(matches!(
            config.validate(),
            Err(PageError::Selector { .. })
        ));
    }
}
