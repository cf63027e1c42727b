//! Page runtime error types
//!
//! Only configuration problems are errors. Missing elements, unresolved
//! anchors and missing host capabilities are handled by the components
//! themselves and never reach the caller.

use thiserror::Error;
use vela_core::MarginError;
use vela_platform::SelectorError;

#[derive(Error, Debug)]
pub enum PageError {
    /// A configured selector does not parse
    #[error("Invalid selector `{selector}`: {source}")]
    Selector {
        selector: String,
        #[source]
        source: SelectorError,
    },

    /// The reveal root margin does not parse
    #[error("Invalid root margin: {0}")]
    RootMargin(#[from] MarginError),

    /// A visibility threshold outside `0.0..=1.0`
    #[error("Visibility threshold {0} is outside 0.0..=1.0")]
    Threshold(f32),
}

/// Result type for page runtime operations
pub type Result<T> = std::result::Result<T, PageError>;
