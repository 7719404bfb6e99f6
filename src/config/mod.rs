//! Configuration loading and management for the Benefit Calculation Engine.
//!
//! This module provides the tunable constants of the engine (instalment limits,
//! benefit caps, pay subsidy tiers) and a loader that reads them from YAML.
//!
//! # Example
//!
//! ```no_run
//! use benefit_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! println!("Instalment threshold: {}", loader.config().instalments.threshold);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BenefitCaps, BenefitConfig, InstalmentConfig, PaySubsidyConfig};
