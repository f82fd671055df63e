//! Core types shared by the global-metadata decoder crates
//!
//! This crate provides the error taxonomy, loader configuration and the
//! [`FormatVersion`] value that gates every schema and decoding decision.

pub mod error;
pub mod types;
pub mod config;

pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
