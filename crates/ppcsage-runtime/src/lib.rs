//! Runtime: page contexts, the content orchestrator and the cached service.
//!
//! `Orchestrator` turns a set of phase documents into page content
//! synchronously. `ContentService` wraps it with the expiring result cache
//! and a processing timeout for async callers.

pub mod contexts;
pub mod orchestrator;
pub mod service;

pub use contexts::ContextTable;
pub use orchestrator::{Orchestrator, NO_CONTENT_SUMMARY};
pub use service::ContentService;
