//! EPG update pipeline
//!
//! [`EpgUpdatePipeline`] drives the [`stages`] over a fetched feed and the
//! persisted snapshot.

pub mod orchestrator;
pub mod stages;

pub use orchestrator::{EpgUpdatePipeline, RunSummary};
