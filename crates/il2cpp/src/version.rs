//! Sub-version disambiguation
//!
//! The header only stores the major version. Several incompatible layouts
//! share major 24, so the sub-version is inferred from structural evidence:
//! the header width, the image tokens and the assembly section size.

use crate::header::Il2CppGlobalMetadataHeader;
use crate::layout;
use crate::types::{
    Il2CppAssemblyDefinition, Il2CppImageDefinition, MAX_METADATA_VERSION, MAX_SANE_VERSION,
    METADATA_MAGIC, MIN_METADATA_VERSION,
};
use gmeta_binary_parser::{BinaryReader, Record};
use gmeta_core::{Config, Error, FormatVersion, Result};
use tracing::{debug, info, warn};

/// String literal offset of a 24.2 header, whose width is 264 bytes
pub const V24_2_SENTINEL: u32 = 264;

/// Outcome of version resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    pub version: FormatVersion,
    pub header: Il2CppGlobalMetadataHeader,
    pub images: Vec<Il2CppImageDefinition>,
    /// Version that sizes the assembly array; differs from `version` only at 24.1
    pub assembly_version: FormatVersion,
}

/// Validate the on-disk version number
pub fn check_base_version(version: i32) -> Result<FormatVersion> {
    if !(MIN_METADATA_VERSION..=MAX_SANE_VERSION).contains(&version) {
        return Err(Error::invalid_format(format!(
            "metadata version {} is not a sane value",
            version
        )));
    }
    if version > MAX_METADATA_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(FormatVersion::new(version as u16, 0))
}

fn assembly_stride(version: FormatVersion) -> u32 {
    Il2CppAssemblyDefinition::SCHEMA.size(version) as u32
}

/// Check the image tokens under 24; `None` when the images section is out of bounds
fn images_have_v24_tokens(data: &[u8], header: &Il2CppGlobalMetadataHeader) -> Option<bool> {
    let mut reader = BinaryReader::new(data);
    let stride = Il2CppImageDefinition::SCHEMA.size(FormatVersion::V24);
    let range = header.images;
    let len = range.size as usize / stride * stride;
    if reader.check_range(range.offset as usize, len).is_err() {
        warn!(
            "Images section {:#x}+{:#x} is out of bounds, skipping token probe",
            range.offset, range.size
        );
        return None;
    }

    let images: Vec<Il2CppImageDefinition> = reader
        .read_record_array(range.offset, range.size, FormatVersion::V24)
        .ok()?;
    Some(images.iter().all(|image| image.token == 1))
}

/// Probe for the narrower 24.2 header
fn probe_v24_2(data: &[u8], config: &Config) -> Option<Il2CppGlobalMetadataHeader> {
    match layout::read_header(data, FormatVersion::V24_2, config.reconstruct_header) {
        Ok(header) if header.string_literal.offset == V24_2_SENTINEL => Some(header),
        Ok(_) => None,
        Err(err) => {
            debug!("No 24.2 header: {}", err);
            None
        }
    }
}

/// Resolve the format version and read the header and images under it
pub fn resolve(data: &[u8], config: &Config) -> Result<Resolution> {
    let mut reader = BinaryReader::new(data);
    let sanity = reader.read_u32()?;
    if sanity != METADATA_MAGIC {
        return Err(Error::invalid_format(format!(
            "bad metadata magic {:#010x}, expected {:#010x}",
            sanity, METADATA_MAGIC
        )));
    }
    let base = check_base_version(reader.read_i32()?)?;

    let (mut version, mut header) = match config.force_version {
        Some(forced) => {
            if forced.base() != base {
                warn!("Forcing version {} on a version {} file", forced, base);
            }
            let header = layout::read_header(data, forced, config.reconstruct_header)?;
            (forced, header)
        }
        None if base == FormatVersion::V24 => match probe_v24_2(data, config) {
            Some(header) => {
                debug!("String literals start at {}, refining to 24.2", V24_2_SENTINEL);
                (FormatVersion::V24_2, header)
            }
            None => {
                let header = layout::read_header(data, base, config.reconstruct_header)?;
                if images_have_v24_tokens(data, &header) == Some(false) {
                    debug!("Image tokens differ from 1, refining to 24.1");
                    let refined = FormatVersion::V24_1;
                    let header = if Il2CppGlobalMetadataHeader::word_count(refined)
                        != Il2CppGlobalMetadataHeader::word_count(base)
                    {
                        layout::read_header(data, refined, config.reconstruct_header)?
                    } else {
                        header
                    };
                    (refined, header)
                } else {
                    (base, header)
                }
            }
        },
        None => {
            let header = layout::read_header(data, base, config.reconstruct_header)?;
            (base, header)
        }
    };

    let images: Vec<Il2CppImageDefinition> =
        reader.read_record_array(header.images.offset, header.images.size, version)?;

    if config.force_version.is_none()
        && version == FormatVersion::V24_2
        && ((header.assemblies.size / assembly_stride(version)) as usize) < images.len()
    {
        debug!("Assemblies too small for 24.2 records, refining to 24.4");
        let refined = FormatVersion::V24_4;
        if Il2CppGlobalMetadataHeader::word_count(refined)
            != Il2CppGlobalMetadataHeader::word_count(version)
        {
            header = layout::read_header(data, refined, config.reconstruct_header)?;
        }
        version = refined;
    }

    let narrow = assembly_stride(FormatVersion::V24_4);
    let assembly_version = if version == FormatVersion::V24_1
        && (header.assemblies.size / narrow) as usize == images.len()
    {
        debug!("Assemblies of 24.1 use the 24.4 record width");
        FormatVersion::V24_4
    } else {
        version
    };

    info!("Resolved metadata version {}", version);
    Ok(Resolution {
        version,
        header,
        images,
        assembly_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{assembly, concat, image, MetadataBuilder};
    use gmeta_core::FormatVersion as V;

    fn resolve_default(data: &[u8]) -> Result<Resolution> {
        resolve(data, &Config::default())
    }

    #[test]
    fn test_base_version_bounds() {
        assert!(matches!(check_base_version(5), Err(Error::InvalidFormat(_))));
        assert!(matches!(check_base_version(-1), Err(Error::InvalidFormat(_))));
        assert!(matches!(check_base_version(1001), Err(Error::InvalidFormat(_))));
        assert!(matches!(check_base_version(30), Err(Error::UnsupportedVersion(30))));
        assert!(matches!(check_base_version(1000), Err(Error::UnsupportedVersion(1000))));
        assert_eq!(check_base_version(16).unwrap(), V::V16);
        assert_eq!(check_base_version(29).unwrap(), V::V29);
    }

    #[test]
    fn test_bad_magic() {
        let data = MetadataBuilder::new(V::V24).magic(0xDEADBEEF).build();
        assert!(matches!(resolve_default(&data), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_version_5_and_30() {
        let data = MetadataBuilder::new(V::V20).version_word(5).build();
        assert!(matches!(resolve_default(&data), Err(Error::InvalidFormat(_))));
        let data = MetadataBuilder::new(V::V29).version_word(30).build();
        assert!(matches!(
            resolve_default(&data),
            Err(Error::UnsupportedVersion(30))
        ));
    }

    #[test]
    fn test_plain_24() {
        let data = MetadataBuilder::new(V::V24)
            .section("string", b"abc\0efg\0".to_vec())
            .section("images", image(V::V24, 3, 0, 1, (0, 0)))
            .section("assemblies", assembly(V::V24, 0, 4))
            .build();
        let resolved = resolve_default(&data).unwrap();
        assert_eq!(resolved.version, V::V24);
        assert_eq!(resolved.assembly_version, V::V24);
        assert_eq!(resolved.images.len(), 1);
        assert_eq!(resolved.images[0].type_count, 3);
        assert_eq!(resolved.header.string_literal.offset, 272);
    }

    #[test]
    fn test_image_tokens_refine_to_24_1() {
        // under the 32-byte stride, the second probe record's token lands on
        // the real second image's exported type count
        let data = MetadataBuilder::new(V::V24_1)
            .section("string", b"abc\0efg\0".to_vec())
            .section(
                "images",
                concat([
                    image(V::V24_1, 3, 1, 1, (0, 0)),
                    image(V::V24_1, 5, 0, 1, (0, 0)),
                ]),
            )
            .section("assemblies", assembly(V::V24_1, 0, 4))
            .reverse_header()
            .build();
        let resolved = resolve_default(&data).unwrap();
        assert_eq!(resolved.version, V::V24_1);
        assert_eq!(resolved.assembly_version, V::V24_1);
        assert_eq!(resolved.images.len(), 2);
        assert_eq!(resolved.images[1].type_count, 5);
        assert_eq!(resolved.images[1].token, 1);
    }

    #[test]
    fn test_24_1_with_narrow_assemblies() {
        let data = MetadataBuilder::new(V::V24_1)
            .section("string", b"abc\0efg\0".to_vec())
            .section(
                "images",
                concat([
                    image(V::V24_1, 3, 1, 1, (0, 0)),
                    image(V::V24_1, 5, 0, 1, (0, 0)),
                ]),
            )
            .section(
                "assemblies",
                concat([assembly(V::V24_4, 0, 4), assembly(V::V24_4, 1, 2)]),
            )
            .build();
        let resolved = resolve_default(&data).unwrap();
        assert_eq!(resolved.version, V::V24_1);
        assert_eq!(resolved.assembly_version, V::V24_4);
    }

    #[test]
    fn test_sentinel_refines_to_24_2() {
        let data = MetadataBuilder::new(V::V24_2)
            .version_word(24)
            .section("string", b"abc\0efg\0".to_vec())
            .section("images", image(V::V24_2, 3, 0, 1, (0, 0)))
            .section("assemblies", assembly(V::V24_2, 0, 4))
            .reverse_header()
            .build();
        let resolved = resolve_default(&data).unwrap();
        assert_eq!(resolved.version, V::V24_2);
        assert_eq!(resolved.header.string_literal.offset, V24_2_SENTINEL);
        assert_eq!(resolved.images.len(), 1);
        assert_eq!(resolved.images[0].type_count, 3);
    }

    #[test]
    fn test_sentinel_with_declared_header() {
        let data = MetadataBuilder::new(V::V24_2)
            .version_word(24)
            .section("string", b"abc\0efg\0".to_vec())
            .section("images", image(V::V24_2, 3, 0, 1, (0, 0)))
            .section("assemblies", assembly(V::V24_2, 0, 4))
            .build();
        let config = Config {
            reconstruct_header: false,
            ..Config::default()
        };
        let resolved = resolve(&data, &config).unwrap();
        assert_eq!(resolved.version, V::V24_2);
        assert_eq!(resolved.header.string_literal.offset, V24_2_SENTINEL);
        assert_eq!(resolved.assembly_version, V::V24_2);
        assert_eq!(resolved.images[0].type_count, 3);
    }

    #[test]
    fn test_24_2_refines_to_24_4() {
        let data = MetadataBuilder::new(V::V24_4)
            .version_word(24)
            .section("string", b"abc\0efg\0".to_vec())
            .section(
                "images",
                concat([
                    image(V::V24_4, 3, 0, 1, (0, 0)),
                    image(V::V24_4, 5, 0, 1, (0, 0)),
                ]),
            )
            .section(
                "assemblies",
                concat([assembly(V::V24_4, 0, 4), assembly(V::V24_4, 1, 2)]),
            )
            .build();
        let resolved = resolve_default(&data).unwrap();
        assert_eq!(resolved.version, V::V24_4);
        assert_eq!(resolved.assembly_version, V::V24_4);
    }

    #[test]
    fn test_forced_version_skips_probes() {
        let data = MetadataBuilder::new(V::V24_1)
            .section(
                "images",
                concat([
                    image(V::V24_1, 3, 1, 1, (0, 0)),
                    image(V::V24_1, 5, 1, 1, (0, 0)),
                ]),
            )
            .section(
                "assemblies",
                concat([assembly(V::V24_4, 0, 4), assembly(V::V24_4, 1, 2)]),
            )
            .build();
        // all probe tokens are 1, so detection alone stays at 24
        assert_eq!(resolve_default(&data).unwrap().version, V::V24);

        let config = Config {
            force_version: Some(V::V24_1),
            ..Config::default()
        };
        let resolved = resolve(&data, &config).unwrap();
        assert_eq!(resolved.version, V::V24_1);
        assert_eq!(resolved.assembly_version, V::V24_4);
        assert_eq!(resolved.images.len(), 2);
    }

    #[test]
    fn test_truncated_images_fail_after_probe() {
        // the token probe bails out quietly; the structural read does not
        let mut data = MetadataBuilder::new(V::V24)
            .section("images", image(V::V24, 3, 0, 7, (0, 0)))
            .build();
        data.truncate(data.len() - 4);
        assert!(matches!(
            resolve_default(&data),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
