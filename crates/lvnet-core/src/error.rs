//! Unified error types for the lvnet workspace
//!
//! [`LvError`] covers every hard failure the engines and loaders can report.
//! Business-rule outcomes (a feeder exceeding its voltage-drop limit, an
//! overloaded pole) are *not* errors; they are fields on the calculation
//! results.
//!
//! # Example
//!
//! ```ignore
//! use lvnet_core::{LvError, LvResult, ReferenceCatalog};
//!
//! fn study(path: &str) -> LvResult<()> {
//!     let catalog = ReferenceCatalog::load(path)?;
//!     let conductor = catalog.conductor(&"cal-70".into())?;
//!     println!("{}", conductor.name);
//!     Ok(())
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Which reference table a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Conductor,
    Pole,
    Lighting,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Conductor => "conductor",
            CatalogKind::Pole => "pole",
            CatalogKind::Lighting => "public-lighting fixture",
        };
        f.write_str(name)
    }
}

/// Unified error type for all lvnet operations.
#[derive(Error, Debug)]
pub enum LvError {
    /// I/O errors (catalog or input files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Malformed input data (negative lengths, non-finite values, missing altitude)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A segment or cable references an id the catalog does not contain
    #[error("Unknown catalog reference: no {kind} with id '{id}'")]
    UnknownReference { kind: CatalogKind, id: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

impl LvError {
    pub fn unknown(kind: CatalogKind, id: impl Into<String>) -> Self {
        LvError::UnknownReference {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LvError::Validation(message.into())
    }
}

/// Convenience type alias for Results using LvError.
pub type LvResult<T> = Result<T, LvError>;

// Conversion from anyhow::Error
impl From<anyhow::Error> for LvError {
    fn from(err: anyhow::Error) -> Self {
        LvError::Other(err.to_string())
    }
}

// Conversion from string-like types for convenience
impl From<String> for LvError {
    fn from(s: String) -> Self {
        LvError::Other(s)
    }
}

impl From<&str> for LvError {
    fn from(s: &str) -> Self {
        LvError::Other(s.to_string())
    }
}

// JSON parsing errors
impl From<serde_json::Error> for LvError {
    fn from(err: serde_json::Error) -> Self {
        LvError::Parse(err.to_string())
    }
}

// TOML parsing errors
impl From<toml::de::Error> for LvError {
    fn from(err: toml::de::Error) -> Self {
        LvError::Parse(err.to_string())
    }
}
