//! Pipeline stages, in execution order:
//!
//! 1. [`normalization`]: shift fresh timestamps to the target offset
//! 2. [`filtering`]: channel classification rules
//! 3. [`merging`]: reconcile history with fresh data
//! 4. [`retention`]: prune stale programmes
//! 5. [`generation`]: order channels and programmes for output

pub mod filtering;
pub mod generation;
pub mod merging;
pub mod normalization;
pub mod retention;

pub use filtering::{ChannelClassifier, ChannelRule};
pub use generation::assemble_guide;
pub use merging::{merge_snapshots, MergeStats, MergedGuide};
pub use normalization::TimeNormalizer;
pub use retention::RetentionPolicy;
