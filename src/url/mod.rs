//! URL handling module for linkprobe
//!
//! This module provides link resolution and seed normalization, same-site
//! comparison, and the allowed-domain matcher used by batch checks.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{extract_host, robots_url, same_site};
pub use matcher::host_within;
pub use normalize::{normalize_link, normalize_seed};
