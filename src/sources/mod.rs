//! Feed sources
//!
//! [`FeedFetcher`] is the seam between the pipeline and the network;
//! [`HttpFeedFetcher`] is the production implementation.

pub mod traits;
pub mod xmltv;

pub use traits::FeedFetcher;
pub use xmltv::{decode_feed, HttpFeedFetcher};
