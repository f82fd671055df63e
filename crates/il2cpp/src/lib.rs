//! IL2CPP global-metadata decoder
//!
//! This crate recovers the header layout of a Unity IL2CPP
//! `global-metadata.dat` blob, resolves its format sub-version and exposes
//! the decoded record arrays, default values, custom attribute indices and
//! metadata usage tables.

pub mod header;
pub mod layout;
pub mod metadata;
pub mod types;
pub mod usage;
pub mod version;

#[cfg(test)]
mod testutil;

pub use header::{Il2CppGlobalMetadataHeader, SectionRange};
pub use metadata::Metadata;
pub use types::*;
pub use usage::MetadataUsage;

use gmeta_core::{Config, Result};
use std::path::Path;

/// Parse IL2CPP metadata from a file
pub fn parse_metadata(path: &Path) -> Result<Metadata> {
    let data = std::fs::read(path)?;
    Metadata::parse(&data)
}

/// Parse IL2CPP metadata from a file with explicit decoder settings
pub fn parse_metadata_with_config(path: &Path, config: &Config) -> Result<Metadata> {
    let data = std::fs::read(path)?;
    Metadata::parse_with_config(&data, config)
}
