//! Declarative page fixtures
//!
//! A serde description of a document that builds a [`HeadlessPage`].
//! Fixtures are what the CLI reads from scenario files:
//!
//! ```toml
//! [viewport]
//! width = 1280
//! height = 800
//!
//! [[elements]]
//! tag = "nav"
//! class = "nav-menu"
//!
//!   [[elements.children]]
//!   tag = "a"
//!   attrs = { href = "#about" }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vela_core::{ElementId, Rect};

use crate::error::{PlatformError, Result};
use crate::headless::{ElementSpec, HeadlessConfig, HeadlessPage};
use crate::page::Page;

/// Top-level page description
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PageFixture {
    #[serde(default)]
    pub viewport: ViewportFixture,
    #[serde(default)]
    pub capabilities: CapabilitiesFixture,
    /// Initial scroll offset
    #[serde(default)]
    pub scroll_y: f32,
    /// Children of `<body>`
    #[serde(default)]
    pub elements: Vec<ElementFixture>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ViewportFixture {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    800.0
}

impl Default for ViewportFixture {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CapabilitiesFixture {
    #[serde(default = "default_true")]
    pub history_api: bool,
    #[serde(default = "default_true")]
    pub intersection_observer: bool,
    #[serde(default = "default_scroll_ms")]
    pub smooth_scroll_ms: f32,
}

fn default_true() -> bool {
    true
}

fn default_scroll_ms() -> f32 {
    400.0
}

impl Default for CapabilitiesFixture {
    fn default() -> Self {
        Self {
            history_api: true,
            intersection_observer: true,
            smooth_scroll_ms: default_scroll_ms(),
        }
    }
}

/// One element and its subtree
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ElementFixture {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Space-separated class list
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// `[x, y, width, height]` in document coordinates
    #[serde(default)]
    pub rect: Option<[f32; 4]>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementFixture>,
}

impl ElementFixture {
    fn spec(&self) -> Result<ElementSpec> {
        if self.tag.trim().is_empty() {
            return Err(PlatformError::Fixture("element with empty tag".into()));
        }
        let mut spec = ElementSpec::new(&self.tag);
        if let Some(id) = &self.id {
            spec = spec.id(id);
        }
        if let Some(class) = &self.class {
            spec = spec.class(class);
        }
        for (name, value) in &self.attrs {
            spec = spec.attr(name, value);
        }
        if let Some([x, y, w, h]) = self.rect {
            if w < 0.0 || h < 0.0 {
                return Err(PlatformError::Fixture(format!(
                    "<{}> has a negative size",
                    self.tag
                )));
            }
            spec = spec.layout(Rect::new(x, y, w, h));
        }
        if let Some(value) = &self.value {
            spec = spec.value(value);
        }
        if let Some(text) = &self.text {
            spec = spec.text(text);
        }
        Ok(spec)
    }

    fn insert_into(&self, page: &mut HeadlessPage, parent: ElementId) -> Result<()> {
        let el = page.insert(parent, self.spec()?);
        for child in &self.children {
            child.insert_into(page, el)?;
        }
        Ok(())
    }
}

impl PageFixture {
    pub fn config(&self) -> HeadlessConfig {
        let mut config = HeadlessConfig::new(self.viewport.width, self.viewport.height);
        config.history_api = self.capabilities.history_api;
        config.intersection_observer = self.capabilities.intersection_observer;
        config.smooth_scroll_ms = self.capabilities.smooth_scroll_ms;
        config
    }

    /// Build the described document
    pub fn build(&self) -> Result<HeadlessPage> {
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(PlatformError::Fixture("viewport must be non-empty".into()));
        }
        let mut page = HeadlessPage::new(self.config());
        let body = page.body();
        for element in &self.elements {
            element.insert_into(&mut page, body)?;
        }
        page.set_scroll_y(self.scroll_y);
        Ok(page)
    }
}
