//! VCU Common Library
//!
//! Shared types, timing constants and configuration loading for the cab
//! vigilance unit workspace.
//!
//! # Module Structure
//!
//! - [`consts`] - Clock divider table and fixed timing values
//! - [`config`] - Configuration loading traits and types
//! - [`vigilance`] - State enums, signal records and engine configuration
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use vcu_common::prelude::*;
//!
//! let config = VcuConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod prelude;
pub mod vigilance;
