//! Configuration module for Endpoint-Ripple
//!
//! This module handles loading, parsing, and validating the optional TOML
//! settings file and the `--headers` argument.
//!
//! # Example
//!
//! ```no_run
//! use endpoint_ripple::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser and validation functions
pub use parser::{load_config, merge_headers, parse_config, parse_headers};
pub use validation::{build_header_map, validate};
