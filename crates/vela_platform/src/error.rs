//! Platform error types

use thiserror::Error;

use crate::selector::SelectorError;

/// Platform-related errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// A selector string could not be parsed
    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),

    /// A selector matched nothing where an element was required
    #[error("No element matches `{0}`")]
    UnknownElement(String),

    /// A page fixture is malformed
    #[error("Invalid page fixture: {0}")]
    Fixture(String),
}

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;
