//! IL2CPP global-metadata.dat parser

use crate::header::Il2CppGlobalMetadataHeader;
use crate::types::*;
use crate::usage::{MetadataUsage, UsageTable};
use crate::version;
use dashmap::DashMap;
use gmeta_binary_parser::BinaryReader;
use gmeta_core::{Config, Error, FormatVersion, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parsed IL2CPP metadata
///
/// Built in one pass by [`Metadata::parse`]; every array and lookup table is
/// final once parsing returns. The string cache is the only state filled in
/// afterwards and is safe to share between threads.
pub struct Metadata {
    /// Raw metadata bytes
    data: Vec<u8>,
    /// Metadata header, sections in declared order
    pub header: Il2CppGlobalMetadataHeader,
    /// Resolved metadata version
    version: FormatVersion,
    pub image_definitions: Vec<Il2CppImageDefinition>,
    pub assembly_definitions: Vec<Il2CppAssemblyDefinition>,
    pub type_definitions: Vec<Il2CppTypeDefinition>,
    pub method_definitions: Vec<Il2CppMethodDefinition>,
    pub parameter_definitions: Vec<Il2CppParameterDefinition>,
    pub field_definitions: Vec<Il2CppFieldDefinition>,
    pub property_definitions: Vec<Il2CppPropertyDefinition>,
    pub event_definitions: Vec<Il2CppEventDefinition>,
    pub generic_containers: Vec<Il2CppGenericContainer>,
    pub generic_parameters: Vec<Il2CppGenericParameter>,
    pub string_literals: Vec<Il2CppStringLiteral>,
    /// Field references (after 16)
    pub field_refs: Vec<Il2CppFieldRef>,
    /// Runtime generic context entries (24.1 and earlier)
    pub rgctx_entries: Vec<Il2CppRgctxDefinition>,
    pub interfaces: Vec<i32>,
    pub nested_types: Vec<i32>,
    pub constraints: Vec<i32>,
    pub vtable_methods: Vec<u32>,
    /// Custom attribute ranges (21 to 28)
    pub attribute_type_ranges: Vec<Il2CppCustomAttributeTypeRange>,
    pub attribute_types: Vec<i32>,
    /// Custom attribute data ranges (29 and later)
    pub attribute_data_ranges: Vec<Il2CppCustomAttributeDataRange>,
    field_default_values: HashMap<i32, Il2CppFieldDefaultValue>,
    parameter_default_values: HashMap<i32, Il2CppParameterDefaultValue>,
    /// Token to attribute index, one map per image (after 24)
    attribute_indices: Vec<HashMap<u32, i32>>,
    usages: Option<UsageTable>,
    string_cache: DashMap<u32, Arc<str>>,
    string_scans: AtomicUsize,
}

fn index_by<T, K, F>(records: Vec<T>, what: &str, key: F) -> HashMap<K, T>
where
    K: std::hash::Hash + Eq + Copy + std::fmt::Display,
    F: Fn(&T) -> K,
{
    let mut map = HashMap::with_capacity(records.len());
    for record in records {
        let k = key(&record);
        if map.insert(k, record).is_some() {
            warn!("Duplicate {} default value for index {}, keeping the last", what, k);
        }
    }
    map
}

impl Metadata {
    /// Parse IL2CPP metadata from raw bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_with_config(data, &Config::default())
    }

    /// Parse IL2CPP metadata with explicit decoder settings
    pub fn parse_with_config(data: &[u8], config: &Config) -> Result<Self> {
        let resolution = version::resolve(data, config)?;
        let version = resolution.version;
        let header = resolution.header;
        info!("Parsing IL2CPP metadata version {}", version);

        let mut reader = BinaryReader::new(data);
        let image_definitions = resolution.images;
        let assembly_definitions = reader.read_record_array(
            header.assemblies.offset,
            header.assemblies.size,
            resolution.assembly_version,
        )?;

        let type_definitions: Vec<Il2CppTypeDefinition> = reader.read_record_array(
            header.type_definitions.offset,
            header.type_definitions.size,
            version,
        )?;
        let method_definitions: Vec<Il2CppMethodDefinition> =
            reader.read_record_array(header.methods.offset, header.methods.size, version)?;
        let parameter_definitions =
            reader.read_record_array(header.parameters.offset, header.parameters.size, version)?;
        let field_definitions: Vec<Il2CppFieldDefinition> =
            reader.read_record_array(header.fields.offset, header.fields.size, version)?;

        let field_default_values = index_by(
            reader.read_record_array(
                header.field_default_values.offset,
                header.field_default_values.size,
                version,
            )?,
            "field",
            |value: &Il2CppFieldDefaultValue| value.field_index,
        );
        let parameter_default_values = index_by(
            reader.read_record_array(
                header.parameter_default_values.offset,
                header.parameter_default_values.size,
                version,
            )?,
            "parameter",
            |value: &Il2CppParameterDefaultValue| value.parameter_index,
        );

        let property_definitions =
            reader.read_record_array(header.properties.offset, header.properties.size, version)?;
        let interfaces =
            reader.read_record_array(header.interfaces.offset, header.interfaces.size, version)?;
        let nested_types = reader.read_record_array(
            header.nested_types.offset,
            header.nested_types.size,
            version,
        )?;
        let event_definitions =
            reader.read_record_array(header.events.offset, header.events.size, version)?;
        let generic_containers = reader.read_record_array(
            header.generic_containers.offset,
            header.generic_containers.size,
            version,
        )?;
        let generic_parameters = reader.read_record_array(
            header.generic_parameters.offset,
            header.generic_parameters.size,
            version,
        )?;
        let constraints = reader.read_record_array(
            header.generic_parameter_constraints.offset,
            header.generic_parameter_constraints.size,
            version,
        )?;
        let vtable_methods = reader.read_record_array(
            header.vtable_methods.offset,
            header.vtable_methods.size,
            version,
        )?;
        let string_literals = reader.read_record_array(
            header.string_literal.offset,
            header.string_literal.size,
            version,
        )?;

        let mut field_refs = Vec::new();
        let mut usages = None;
        if version > FormatVersion::V16 {
            field_refs = reader.read_record_array(
                header.field_refs.offset,
                header.field_refs.size,
                version,
            )?;
            if version < FormatVersion::V27 {
                let lists: Vec<Il2CppMetadataUsageList> = reader.read_record_array(
                    header.metadata_usage_lists.offset,
                    header.metadata_usage_lists.size,
                    version,
                )?;
                let pairs: Vec<Il2CppMetadataUsagePair> = reader.read_record_array(
                    header.metadata_usage_pairs.offset,
                    header.metadata_usage_pairs.size,
                    version,
                )?;
                usages = Some(UsageTable::build(&lists, &pairs, version)?);
            }
        }

        let mut attribute_type_ranges: Vec<Il2CppCustomAttributeTypeRange> = Vec::new();
        let mut attribute_types = Vec::new();
        let mut attribute_data_ranges: Vec<Il2CppCustomAttributeDataRange> = Vec::new();
        if version > FormatVersion::V20 && version < FormatVersion::V29 {
            attribute_type_ranges = reader.read_record_array(
                header.attributes_info.offset,
                header.attributes_info.size,
                version,
            )?;
            attribute_types = reader.read_record_array(
                header.attribute_types.offset,
                header.attribute_types.size,
                version,
            )?;
        }
        if version >= FormatVersion::V29 {
            attribute_data_ranges = reader.read_record_array(
                header.attribute_data_range.offset,
                header.attribute_data_range.size,
                version,
            )?;
        }

        let attribute_indices = if version > FormatVersion::V24 {
            let tokens: Vec<u32> = if version >= FormatVersion::V29 {
                attribute_data_ranges.iter().map(|range| range.token).collect()
            } else {
                attribute_type_ranges.iter().map(|range| range.token).collect()
            };
            build_attribute_indices(&image_definitions, &tokens)?
        } else {
            Vec::new()
        };

        let rgctx_entries = if version <= FormatVersion::V24_1 {
            reader.read_record_array(
                header.rgctx_entries.offset,
                header.rgctx_entries.size,
                version,
            )?
        } else {
            Vec::new()
        };

        info!(
            "Parsed {} images, {} types, {} methods, {} fields",
            image_definitions.len(),
            type_definitions.len(),
            method_definitions.len(),
            field_definitions.len()
        );

        Ok(Self {
            data: data.to_vec(),
            header,
            version,
            image_definitions,
            assembly_definitions,
            type_definitions,
            method_definitions,
            parameter_definitions,
            field_definitions,
            property_definitions,
            event_definitions,
            generic_containers,
            generic_parameters,
            string_literals,
            field_refs,
            rgctx_entries,
            interfaces,
            nested_types,
            constraints,
            vtable_methods,
            attribute_type_ranges,
            attribute_types,
            attribute_data_ranges,
            field_default_values,
            parameter_default_values,
            attribute_indices,
            usages,
            string_cache: DashMap::new(),
            string_scans: AtomicUsize::new(0),
        })
    }

    /// Resolved metadata version
    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Get a string from the string table
    ///
    /// `index` is relative to the start of the string section. Each distinct
    /// index is scanned once; later calls return the cached string.
    pub fn string_at(&self, index: u32) -> Result<Arc<str>> {
        if let Some(cached) = self.string_cache.get(&index) {
            return Ok(Arc::clone(cached.value()));
        }

        let entry = self.string_cache.entry(index).or_try_insert_with(|| {
            let offset = self.header.string.offset as usize + index as usize;
            let value = BinaryReader::new(&self.data).read_cstring_at(offset)?;
            self.string_scans.fetch_add(1, Ordering::Relaxed);
            Ok::<_, Error>(Arc::from(value))
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Number of string table scans performed so far
    pub fn string_scan_count(&self) -> usize {
        self.string_scans.load(Ordering::Relaxed)
    }

    /// Get a string literal, decoded as UTF-8
    pub fn string_literal_at(&self, index: usize) -> Result<String> {
        let literal = self
            .string_literals
            .get(index)
            .ok_or_else(|| Error::not_found(format!("string literal {}", index)))?;
        let offset =
            i64::from(self.header.string_literal_data.offset) + i64::from(literal.data_index);
        let offset = usize::try_from(offset).map_err(|_| Error::OutOfBounds {
            offset: 0,
            len: literal.length as usize,
            available: self.data.len(),
        })?;

        let mut reader = BinaryReader::new(&self.data);
        reader.seek(offset)?;
        let bytes = reader.read_bytes(literal.length as usize)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn field_default_value(&self, field_index: i32) -> Option<&Il2CppFieldDefaultValue> {
        self.field_default_values.get(&field_index)
    }

    pub fn parameter_default_value(
        &self,
        parameter_index: i32,
    ) -> Option<&Il2CppParameterDefaultValue> {
        self.parameter_default_values.get(&parameter_index)
    }

    /// Absolute offset of a default value blob; `None` if it falls outside u32
    pub fn default_value_data_offset(&self, index: i32) -> Option<u32> {
        let offset = i64::from(self.header.field_and_parameter_default_value_data.offset)
            + i64::from(index);
        u32::try_from(offset).ok()
    }

    /// Custom attribute index of `token` within an image
    ///
    /// Up to 24 the index stored on the member is already the answer. Later
    /// versions index attributes by token per image; `None` means the token
    /// carries no attributes.
    pub fn custom_attribute_index(
        &self,
        image_index: usize,
        provided_index: i32,
        token: u32,
    ) -> Option<i32> {
        if self.version <= FormatVersion::V24 {
            return Some(provided_index);
        }
        self.attribute_indices
            .get(image_index)?
            .get(&token)
            .copied()
    }

    /// Decoded usages of one kind; `None` if the version has no usage tables
    pub fn usage_table(&self, usage: MetadataUsage) -> Option<&BTreeMap<u32, u32>> {
        self.usages.as_ref().map(|table| table.get(usage))
    }

    /// One past the highest usage destination, or 0 without usage tables
    pub fn total_usage_count(&self) -> u64 {
        self.usages.as_ref().map_or(0, UsageTable::total_count)
    }
}

/// Map each image's attribute window onto the shared token array
fn build_attribute_indices(
    images: &[Il2CppImageDefinition],
    tokens: &[u32],
) -> Result<Vec<HashMap<u32, i32>>> {
    images
        .iter()
        .enumerate()
        .map(|(image_index, image)| {
            let window = usize::try_from(image.custom_attribute_start)
                .ok()
                .and_then(|start| {
                    let end = start.checked_add(image.custom_attribute_count as usize)?;
                    Some(start..end)
                })
                .filter(|window| window.end <= tokens.len())
                .ok_or_else(|| {
                    Error::invalid_format(format!(
                        "image {} attribute window {}+{} exceeds {} ranges",
                        image_index,
                        image.custom_attribute_start,
                        image.custom_attribute_count,
                        tokens.len()
                    ))
                })?;

            let mut map = HashMap::with_capacity(window.len());
            for index in window {
                if map.insert(tokens[index], index as i32).is_some() {
                    warn!(
                        "Duplicate attribute token {:#010x} in image {}",
                        tokens[index], image_index
                    );
                }
            }
            debug!("Image {}: {} attribute ranges", image_index, map.len());
            Ok(map)
        })
        .collect()
}
