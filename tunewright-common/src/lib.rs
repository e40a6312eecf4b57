//! # Tunewright Common Library
//!
//! Shared code for the Tunewright services:
//! - Error taxonomy (`Error` / `Result`)
//! - Configuration loading (ENV / TOML / compiled defaults)

pub mod config;
pub mod error;

pub use error::{Error, Result};
