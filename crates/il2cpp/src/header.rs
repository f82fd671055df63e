//! Global metadata header

use gmeta_binary_parser::{
    BinaryReader, FieldCursor, FieldSpec, ParseResult, Record, RecordSchema,
};
use gmeta_core::{Error, FormatVersion, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Byte range of one section within the metadata blob
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionRange {
    pub offset: u32,
    pub size: u32,
}

impl SectionRange {
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// A zero offset or zero size means the section is not present
    pub fn is_absent(&self) -> bool {
        self.offset == 0 || self.size == 0
    }

    /// One past the last byte of the section
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }
}

impl Record for SectionRange {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "SectionRange",
        fields: &[FieldSpec::u32("offset"), FieldSpec::u32("size")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            offset: fields.u32()?,
            size: fields.u32()?,
        })
    }
}

const fn section(name: &'static str) -> FieldSpec {
    FieldSpec::record(name, SectionRange::SCHEMA)
}

/// Number of sections declared across all versions
pub const SECTION_COUNT: usize = 36;

/// Global metadata header
///
/// After the `sanity`/`version` prefix the header is a run of
/// `(offset, size)` pairs, one per section present in the version. The
/// on-disk order of those words does not follow the declared order; see
/// [`crate::layout`] for how the pairs are recovered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppGlobalMetadataHeader {
    pub sanity: u32,
    pub version: i32,
    pub string_literal: SectionRange,
    pub string_literal_data: SectionRange,
    pub string: SectionRange,
    pub events: SectionRange,
    pub properties: SectionRange,
    pub methods: SectionRange,
    pub parameter_default_values: SectionRange,
    pub field_default_values: SectionRange,
    pub field_and_parameter_default_value_data: SectionRange,
    pub field_marshaled_sizes: SectionRange,
    pub parameters: SectionRange,
    pub fields: SectionRange,
    pub generic_parameters: SectionRange,
    pub generic_parameter_constraints: SectionRange,
    pub generic_containers: SectionRange,
    pub nested_types: SectionRange,
    pub interfaces: SectionRange,
    pub vtable_methods: SectionRange,
    pub interface_offsets: SectionRange,
    pub type_definitions: SectionRange,
    pub rgctx_entries: SectionRange,
    pub images: SectionRange,
    pub assemblies: SectionRange,
    pub metadata_usage_lists: SectionRange,
    pub metadata_usage_pairs: SectionRange,
    pub field_refs: SectionRange,
    pub referenced_assemblies: SectionRange,
    pub attributes_info: SectionRange,
    pub attribute_types: SectionRange,
    pub attribute_data: SectionRange,
    pub attribute_data_range: SectionRange,
    pub unresolved_virtual_call_parameter_types: SectionRange,
    pub unresolved_virtual_call_parameter_ranges: SectionRange,
    pub windows_runtime_type_names: SectionRange,
    pub windows_runtime_strings: SectionRange,
    pub exported_type_definitions: SectionRange,
}

impl Il2CppGlobalMetadataHeader {
    /// Header width in bytes under `version`
    pub fn byte_size(version: FormatVersion) -> usize {
        Self::SCHEMA.size(version)
    }

    /// Header width in u32 words under `version`, prefix included
    pub fn word_count(version: FormatVersion) -> usize {
        Self::byte_size(version) / 4
    }

    /// Read the header with its words taken in declared order
    pub fn read_declared(data: &[u8], version: FormatVersion) -> ParseResult<Self> {
        let mut reader = BinaryReader::new(data);
        let mut fields = FieldCursor::new(&mut reader, Self::SCHEMA, version);
        let header = Self::read(&mut fields)?;
        fields.finish()?;
        Ok(header)
    }

    fn section_specs() -> impl Iterator<Item = &'static FieldSpec> {
        Self::SCHEMA.fields.iter().skip(2)
    }

    fn ranges(&self) -> [&SectionRange; SECTION_COUNT] {
        [
            &self.string_literal,
            &self.string_literal_data,
            &self.string,
            &self.events,
            &self.properties,
            &self.methods,
            &self.parameter_default_values,
            &self.field_default_values,
            &self.field_and_parameter_default_value_data,
            &self.field_marshaled_sizes,
            &self.parameters,
            &self.fields,
            &self.generic_parameters,
            &self.generic_parameter_constraints,
            &self.generic_containers,
            &self.nested_types,
            &self.interfaces,
            &self.vtable_methods,
            &self.interface_offsets,
            &self.type_definitions,
            &self.rgctx_entries,
            &self.images,
            &self.assemblies,
            &self.metadata_usage_lists,
            &self.metadata_usage_pairs,
            &self.field_refs,
            &self.referenced_assemblies,
            &self.attributes_info,
            &self.attribute_types,
            &self.attribute_data,
            &self.attribute_data_range,
            &self.unresolved_virtual_call_parameter_types,
            &self.unresolved_virtual_call_parameter_ranges,
            &self.windows_runtime_type_names,
            &self.windows_runtime_strings,
            &self.exported_type_definitions,
        ]
    }

    fn ranges_mut(&mut self) -> [&mut SectionRange; SECTION_COUNT] {
        [
            &mut self.string_literal,
            &mut self.string_literal_data,
            &mut self.string,
            &mut self.events,
            &mut self.properties,
            &mut self.methods,
            &mut self.parameter_default_values,
            &mut self.field_default_values,
            &mut self.field_and_parameter_default_value_data,
            &mut self.field_marshaled_sizes,
            &mut self.parameters,
            &mut self.fields,
            &mut self.generic_parameters,
            &mut self.generic_parameter_constraints,
            &mut self.generic_containers,
            &mut self.nested_types,
            &mut self.interfaces,
            &mut self.vtable_methods,
            &mut self.interface_offsets,
            &mut self.type_definitions,
            &mut self.rgctx_entries,
            &mut self.images,
            &mut self.assemblies,
            &mut self.metadata_usage_lists,
            &mut self.metadata_usage_pairs,
            &mut self.field_refs,
            &mut self.referenced_assemblies,
            &mut self.attributes_info,
            &mut self.attribute_types,
            &mut self.attribute_data,
            &mut self.attribute_data_range,
            &mut self.unresolved_virtual_call_parameter_types,
            &mut self.unresolved_virtual_call_parameter_ranges,
            &mut self.windows_runtime_type_names,
            &mut self.windows_runtime_strings,
            &mut self.exported_type_definitions,
        ]
    }

    /// Named section ranges present in `version`, in declared order
    pub fn sections(&self, version: FormatVersion) -> IndexMap<&'static str, SectionRange> {
        Self::section_specs()
            .zip(self.ranges())
            .filter(|(spec, _)| spec.applies_to(version))
            .map(|(spec, range)| (spec.name, *range))
            .collect()
    }

    /// Overwrite the sections present in `version` with `ranges`, in declared order
    ///
    /// Sections absent from `version` are reset to empty.
    pub fn set_sections(&mut self, version: FormatVersion, ranges: &[SectionRange]) -> Result<()> {
        let present = Self::section_specs()
            .filter(|spec| spec.applies_to(version))
            .count();
        if present != ranges.len() {
            return Err(Error::parse(format!(
                "header {} has {} sections, got {} ranges",
                version,
                present,
                ranges.len()
            )));
        }

        let mut next = ranges.iter();
        for (spec, slot) in Self::section_specs().zip(self.ranges_mut()) {
            *slot = if spec.applies_to(version) {
                next.next().copied().unwrap_or_default()
            } else {
                SectionRange::default()
            };
        }
        Ok(())
    }
}

impl Record for Il2CppGlobalMetadataHeader {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppGlobalMetadataHeader",
        fields: &[
            FieldSpec::u32("sanity"),
            FieldSpec::i32("version"),
            section("string_literal"),
            section("string_literal_data"),
            section("string"),
            section("events"),
            section("properties"),
            section("methods"),
            section("parameter_default_values"),
            section("field_default_values"),
            section("field_and_parameter_default_value_data"),
            section("field_marshaled_sizes"),
            section("parameters"),
            section("fields"),
            section("generic_parameters"),
            section("generic_parameter_constraints"),
            section("generic_containers"),
            section("nested_types"),
            section("interfaces"),
            section("vtable_methods"),
            section("interface_offsets"),
            section("type_definitions"),
            section("rgctx_entries").until(FormatVersion::V24_1),
            section("images"),
            section("assemblies"),
            section("metadata_usage_lists").between(FormatVersion::V19, FormatVersion::V26),
            section("metadata_usage_pairs").between(FormatVersion::V19, FormatVersion::V26),
            section("field_refs").since(FormatVersion::V19),
            section("referenced_assemblies").since(FormatVersion::V20),
            section("attributes_info").between(FormatVersion::V21, FormatVersion::V28),
            section("attribute_types").between(FormatVersion::V21, FormatVersion::V28),
            section("attribute_data").since(FormatVersion::V29),
            section("attribute_data_range").since(FormatVersion::V29),
            section("unresolved_virtual_call_parameter_types").since(FormatVersion::V22),
            section("unresolved_virtual_call_parameter_ranges").since(FormatVersion::V22),
            section("windows_runtime_type_names").since(FormatVersion::V23),
            section("windows_runtime_strings").since(FormatVersion::V27),
            section("exported_type_definitions").since(FormatVersion::V24),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            sanity: fields.u32()?,
            version: fields.i32()?,
            string_literal: fields.record()?,
            string_literal_data: fields.record()?,
            string: fields.record()?,
            events: fields.record()?,
            properties: fields.record()?,
            methods: fields.record()?,
            parameter_default_values: fields.record()?,
            field_default_values: fields.record()?,
            field_and_parameter_default_value_data: fields.record()?,
            field_marshaled_sizes: fields.record()?,
            parameters: fields.record()?,
            fields: fields.record()?,
            generic_parameters: fields.record()?,
            generic_parameter_constraints: fields.record()?,
            generic_containers: fields.record()?,
            nested_types: fields.record()?,
            interfaces: fields.record()?,
            vtable_methods: fields.record()?,
            interface_offsets: fields.record()?,
            type_definitions: fields.record()?,
            rgctx_entries: fields.record()?,
            images: fields.record()?,
            assemblies: fields.record()?,
            metadata_usage_lists: fields.record()?,
            metadata_usage_pairs: fields.record()?,
            field_refs: fields.record()?,
            referenced_assemblies: fields.record()?,
            attributes_info: fields.record()?,
            attribute_types: fields.record()?,
            attribute_data: fields.record()?,
            attribute_data_range: fields.record()?,
            unresolved_virtual_call_parameter_types: fields.record()?,
            unresolved_virtual_call_parameter_ranges: fields.record()?,
            windows_runtime_type_names: fields.record()?,
            windows_runtime_strings: fields.record()?,
            exported_type_definitions: fields.record()?,
        })
    }
}
