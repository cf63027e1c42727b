//! Scenario and config file handling

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vela_page::PageConfig;
use vela_platform::PageFixture;

/// A scripted session (scenario.toml)
#[derive(Debug, Deserialize, Serialize)]
pub struct Scenario {
    /// The document to run against
    #[serde(default)]
    pub page: PageFixture,
    /// Runtime configuration; `--config` takes precedence
    #[serde(default)]
    pub config: Option<PageConfig>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One scripted input
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Step {
    /// Click the first element matching `target`
    Click { target: String },
    /// Press a key by DOM name (`Escape`, `Enter`, ...), on `target` or the
    /// focused element
    Key {
        key: String,
        #[serde(default)]
        target: Option<String>,
    },
    /// User scroll to an absolute offset
    Scroll { y: f32 },
    /// Let animations run
    Advance { ms: f32 },
    Resize { width: f32, height: f32 },
    /// Submit a form
    Submit { form: String },
    /// Finish a pending form submission
    Complete { form: String },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Click { .. } => "click",
            Step::Key { .. } => "key",
            Step::Scroll { .. } => "scroll",
            Step::Advance { .. } => "advance",
            Step::Resize { .. } => "resize",
            Step::Submit { .. } => "submit",
            Step::Complete { .. } => "complete",
        }
    }

    /// Selectors this step refers to
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            Step::Click { target } => vec![target.as_str()],
            Step::Key { target, .. } => target.iter().map(String::as_str).collect(),
            Step::Submit { form } | Step::Complete { form } => vec![form.as_str()],
            Step::Scroll { .. } | Step::Advance { .. } | Step::Resize { .. } => Vec::new(),
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The effective runtime config: `override_path` if given, else the
    /// scenario's own `[config]`, else defaults.
    pub fn page_config(&self, override_path: Option<&Path>) -> Result<PageConfig> {
        match override_path {
            Some(path) => load_page_config(path),
            None => Ok(self.config.clone().unwrap_or_default()),
        }
    }
}

/// Load a page.toml
pub fn load_page_config(path: &Path) -> Result<PageConfig> {
    if !path.exists() {
        anyhow::bail!("No config found at {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: PageConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}
