//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageResult`: the fixed-schema record produced for every fetch attempt
//! - `VisitedSet`: the bounded set of URLs ever enqueued in a session

mod page_result;
mod visited;

// Re-export main types
pub use page_result::{PageResult, ROBOTS_BLOCKED};
pub use visited::VisitedSet;
