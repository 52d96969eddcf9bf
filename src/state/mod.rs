//! State module for tracking crawl progress
//!
//! This module provides the shared state of a single crawl run.
//!
//! # Components
//!
//! - `VisitedSet`: URLs already claimed for fetching, with an optional cap
//! - `EndpointSet`: deduplicated endpoints accumulated across the run
//! - `PageStatus`: outcome of fetching an individual page or script

mod endpoints;
mod page_state;
mod visited;

// Re-export main types
pub use endpoints::EndpointSet;
pub use page_state::PageStatus;
pub use visited::{Claim, VisitedSet};
