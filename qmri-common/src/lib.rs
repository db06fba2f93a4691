//! # qMRI Common Library
//!
//! Shared code for the qMRI parameter tools:
//! - Error taxonomy (`Error`, `ErrorKind`)
//! - Configuration loading (TOML bootstrap + environment overrides)
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, ErrorKind, Result};
