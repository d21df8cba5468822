//! PPCSage Core: page contexts, processed-content types, configuration, errors.

pub mod config;
pub mod content;
pub mod context;
pub mod error;

pub use config::{CacheConfig, PpcSageConfig, ProcessingRules, ScoringWeights};
pub use content::*;
pub use context::{ContentLength, OutputFormat, PageContext, PageType};
pub use error::{Error, Result};
