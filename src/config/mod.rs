//! Configuration module for the gallery crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; the defaults describe the production gallery index.
//!
//! # Example
//!
//! ```no_run
//! use gallery_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Snapshots go to: {}", config.crawler.output_dir.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, EmptyOutputPolicy, QueryConfig, RetryConfig, SessionConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, default_config, load_config, load_config_with_hash, parse_config,
};
pub use validation::validate;
