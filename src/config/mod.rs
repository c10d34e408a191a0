//! Configuration module for linkprobe
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use linkprobe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkprobe.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CheckConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, RobotsConfig,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, load_or_default, parse_config};
pub use validation::validate;
