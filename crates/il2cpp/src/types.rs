//! IL2CPP structure definitions
//!
//! These structures mirror the IL2CPP runtime metadata format. Each record
//! declares its field table once in its [`Record::SCHEMA`]; the version ranges
//! there decide both the record width and which fields are read.

use gmeta_binary_parser::{FieldCursor, FieldSpec, ParseResult, Record, RecordSchema};
use gmeta_core::FormatVersion;
use serde::{Deserialize, Serialize};

/// IL2CPP metadata magic number
pub const METADATA_MAGIC: u32 = 0xFAB11BAF;

/// Oldest metadata version this decoder understands
pub const MIN_METADATA_VERSION: i32 = 16;
/// Newest metadata version this decoder understands
pub const MAX_METADATA_VERSION: i32 = 29;
/// Version numbers above this are not metadata at all
pub const MAX_SANE_VERSION: i32 = 1000;

const V19: FormatVersion = FormatVersion::V19;
const V20: FormatVersion = FormatVersion::V20;
const V21: FormatVersion = FormatVersion::V21;
const V22: FormatVersion = FormatVersion::V22;
const V24: FormatVersion = FormatVersion::V24;
const V24_1: FormatVersion = FormatVersion::V24_1;
const V24_3: FormatVersion = FormatVersion::V24_3;
const V24_5: FormatVersion = FormatVersion::V24_5;

/// Image definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppImageDefinition {
    pub name_index: u32,
    pub assembly_index: i32,
    pub type_start: i32,
    pub type_count: u32,
    pub exported_type_start: i32,
    pub exported_type_count: u32,
    pub entry_point_index: i32,
    pub token: u32,
    pub custom_attribute_start: i32,
    pub custom_attribute_count: u32,
}

impl Record for Il2CppImageDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppImageDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::i32("assembly_index"),
            FieldSpec::i32("type_start"),
            FieldSpec::u32("type_count"),
            FieldSpec::i32("exported_type_start").since(V24),
            FieldSpec::u32("exported_type_count").since(V24),
            FieldSpec::i32("entry_point_index"),
            FieldSpec::u32("token").since(V19),
            FieldSpec::i32("custom_attribute_start").since(V24_1),
            FieldSpec::u32("custom_attribute_count").since(V24_1),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            assembly_index: fields.i32()?,
            type_start: fields.i32()?,
            type_count: fields.u32()?,
            exported_type_start: fields.i32()?,
            exported_type_count: fields.u32()?,
            entry_point_index: fields.i32()?,
            token: fields.u32()?,
            custom_attribute_start: fields.i32()?,
            custom_attribute_count: fields.u32()?,
        })
    }
}

/// Assembly name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppAssemblyNameDefinition {
    pub name_index: u32,
    pub culture_index: u32,
    pub hash_value_index: i32,
    pub public_key_index: u32,
    pub hash_alg: u32,
    pub hash_len: i32,
    pub flags: u32,
    pub major: i32,
    pub minor: i32,
    pub build: i32,
    pub revision: i32,
    pub public_key_token: [u8; 8],
}

impl Record for Il2CppAssemblyNameDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppAssemblyNameDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::u32("culture_index"),
            FieldSpec::i32("hash_value_index").until(V24_3),
            FieldSpec::u32("public_key_index"),
            FieldSpec::u32("hash_alg"),
            FieldSpec::i32("hash_len"),
            FieldSpec::u32("flags"),
            FieldSpec::i32("major"),
            FieldSpec::i32("minor"),
            FieldSpec::i32("build"),
            FieldSpec::i32("revision"),
            FieldSpec::bytes("public_key_token", 8),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            culture_index: fields.u32()?,
            hash_value_index: fields.i32()?,
            public_key_index: fields.u32()?,
            hash_alg: fields.u32()?,
            hash_len: fields.i32()?,
            flags: fields.u32()?,
            major: fields.i32()?,
            minor: fields.i32()?,
            build: fields.i32()?,
            revision: fields.i32()?,
            public_key_token: fields.bytes::<8>()?,
        })
    }
}

/// Assembly definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppAssemblyDefinition {
    pub image_index: i32,
    pub token: u32,
    pub custom_attribute_index: i32,
    pub referenced_assembly_start: i32,
    pub referenced_assembly_count: i32,
    pub aname: Il2CppAssemblyNameDefinition,
}

impl Record for Il2CppAssemblyDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppAssemblyDefinition",
        fields: &[
            FieldSpec::i32("image_index"),
            FieldSpec::u32("token").since(V24_1),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::i32("referenced_assembly_start").since(V20),
            FieldSpec::i32("referenced_assembly_count").since(V20),
            FieldSpec::record("aname", Il2CppAssemblyNameDefinition::SCHEMA),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            image_index: fields.i32()?,
            token: fields.u32()?,
            custom_attribute_index: fields.i32()?,
            referenced_assembly_start: fields.i32()?,
            referenced_assembly_count: fields.i32()?,
            aname: fields.record()?,
        })
    }
}

/// Type definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppTypeDefinition {
    pub name_index: u32,
    pub namespace_index: u32,
    pub custom_attribute_index: i32,
    pub byval_type_index: i32,
    pub byref_type_index: i32,
    pub declaring_type_index: i32,
    pub parent_index: i32,
    pub element_type_index: i32,
    pub rgctx_start_index: i32,
    pub rgctx_count: i32,
    pub generic_container_index: i32,
    pub delegate_wrapper_from_managed_to_native_index: i32,
    pub marshaling_functions_index: i32,
    pub ccw_function_index: i32,
    pub guid_index: i32,
    pub flags: u32,
    pub field_start: i32,
    pub method_start: i32,
    pub event_start: i32,
    pub property_start: i32,
    pub nested_types_start: i32,
    pub interfaces_start: i32,
    pub vtable_start: i32,
    pub interface_offsets_start: i32,
    pub method_count: u16,
    pub property_count: u16,
    pub field_count: u16,
    pub event_count: u16,
    pub nested_type_count: u16,
    pub vtable_count: u16,
    pub interfaces_count: u16,
    pub interface_offsets_count: u16,
    pub bitfield: u32,
    pub token: u32,
}

impl Record for Il2CppTypeDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppTypeDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::u32("namespace_index"),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::i32("byval_type_index"),
            FieldSpec::i32("byref_type_index").until(V24_5),
            FieldSpec::i32("declaring_type_index"),
            FieldSpec::i32("parent_index"),
            FieldSpec::i32("element_type_index"),
            FieldSpec::i32("rgctx_start_index").until(V24_1),
            FieldSpec::i32("rgctx_count").until(V24_1),
            FieldSpec::i32("generic_container_index"),
            FieldSpec::i32("delegate_wrapper_from_managed_to_native_index").until(V22),
            FieldSpec::i32("marshaling_functions_index").until(V22),
            FieldSpec::i32("ccw_function_index").between(V21, V22),
            FieldSpec::i32("guid_index").between(V21, V22),
            FieldSpec::u32("flags"),
            FieldSpec::i32("field_start"),
            FieldSpec::i32("method_start"),
            FieldSpec::i32("event_start"),
            FieldSpec::i32("property_start"),
            FieldSpec::i32("nested_types_start"),
            FieldSpec::i32("interfaces_start"),
            FieldSpec::i32("vtable_start"),
            FieldSpec::i32("interface_offsets_start"),
            FieldSpec::u16("method_count"),
            FieldSpec::u16("property_count"),
            FieldSpec::u16("field_count"),
            FieldSpec::u16("event_count"),
            FieldSpec::u16("nested_type_count"),
            FieldSpec::u16("vtable_count"),
            FieldSpec::u16("interfaces_count"),
            FieldSpec::u16("interface_offsets_count"),
            FieldSpec::u32("bitfield"),
            FieldSpec::u32("token"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            namespace_index: fields.u32()?,
            custom_attribute_index: fields.i32()?,
            byval_type_index: fields.i32()?,
            byref_type_index: fields.i32()?,
            declaring_type_index: fields.i32()?,
            parent_index: fields.i32()?,
            element_type_index: fields.i32()?,
            rgctx_start_index: fields.i32()?,
            rgctx_count: fields.i32()?,
            generic_container_index: fields.i32()?,
            delegate_wrapper_from_managed_to_native_index: fields.i32()?,
            marshaling_functions_index: fields.i32()?,
            ccw_function_index: fields.i32()?,
            guid_index: fields.i32()?,
            flags: fields.u32()?,
            field_start: fields.i32()?,
            method_start: fields.i32()?,
            event_start: fields.i32()?,
            property_start: fields.i32()?,
            nested_types_start: fields.i32()?,
            interfaces_start: fields.i32()?,
            vtable_start: fields.i32()?,
            interface_offsets_start: fields.i32()?,
            method_count: fields.u16()?,
            property_count: fields.u16()?,
            field_count: fields.u16()?,
            event_count: fields.u16()?,
            nested_type_count: fields.u16()?,
            vtable_count: fields.u16()?,
            interfaces_count: fields.u16()?,
            interface_offsets_count: fields.u16()?,
            bitfield: fields.u32()?,
            token: fields.u32()?,
        })
    }
}

/// Method definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppMethodDefinition {
    pub name_index: u32,
    pub declaring_type: i32,
    pub return_type: i32,
    pub parameter_start: i32,
    pub custom_attribute_index: i32,
    pub generic_container_index: i32,
    pub method_index: i32,
    pub invoker_index: i32,
    pub delegate_wrapper_index: i32,
    pub rgctx_start_index: i32,
    pub rgctx_count: i32,
    pub token: u32,
    pub flags: u16,
    pub iflags: u16,
    pub slot: u16,
    pub parameter_count: u16,
}

impl Record for Il2CppMethodDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppMethodDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::i32("declaring_type"),
            FieldSpec::i32("return_type"),
            FieldSpec::i32("parameter_start"),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::i32("generic_container_index"),
            FieldSpec::i32("method_index").until(V24_1),
            FieldSpec::i32("invoker_index").until(V24_1),
            FieldSpec::i32("delegate_wrapper_index").until(V24_1),
            FieldSpec::i32("rgctx_start_index").until(V24_1),
            FieldSpec::i32("rgctx_count").until(V24_1),
            FieldSpec::u32("token"),
            FieldSpec::u16("flags"),
            FieldSpec::u16("iflags"),
            FieldSpec::u16("slot"),
            FieldSpec::u16("parameter_count"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            declaring_type: fields.i32()?,
            return_type: fields.i32()?,
            parameter_start: fields.i32()?,
            custom_attribute_index: fields.i32()?,
            generic_container_index: fields.i32()?,
            method_index: fields.i32()?,
            invoker_index: fields.i32()?,
            delegate_wrapper_index: fields.i32()?,
            rgctx_start_index: fields.i32()?,
            rgctx_count: fields.i32()?,
            token: fields.u32()?,
            flags: fields.u16()?,
            iflags: fields.u16()?,
            slot: fields.u16()?,
            parameter_count: fields.u16()?,
        })
    }
}

/// Parameter definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppParameterDefinition {
    pub name_index: u32,
    pub token: u32,
    pub custom_attribute_index: i32,
    pub type_index: i32,
}

impl Record for Il2CppParameterDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppParameterDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::u32("token"),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::i32("type_index"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            token: fields.u32()?,
            custom_attribute_index: fields.i32()?,
            type_index: fields.i32()?,
        })
    }
}

/// Field definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppFieldDefinition {
    pub name_index: u32,
    pub type_index: i32,
    pub custom_attribute_index: i32,
    pub token: u32,
}

impl Record for Il2CppFieldDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppFieldDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::i32("type_index"),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::u32("token").since(V19),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            type_index: fields.i32()?,
            custom_attribute_index: fields.i32()?,
            token: fields.u32()?,
        })
    }
}

/// Default value of a constant field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppFieldDefaultValue {
    pub field_index: i32,
    pub type_index: i32,
    pub data_index: i32,
}

impl Record for Il2CppFieldDefaultValue {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppFieldDefaultValue",
        fields: &[
            FieldSpec::i32("field_index"),
            FieldSpec::i32("type_index"),
            FieldSpec::i32("data_index"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            field_index: fields.i32()?,
            type_index: fields.i32()?,
            data_index: fields.i32()?,
        })
    }
}

/// Default value of an optional parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppParameterDefaultValue {
    pub parameter_index: i32,
    pub type_index: i32,
    pub data_index: i32,
}

impl Record for Il2CppParameterDefaultValue {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppParameterDefaultValue",
        fields: &[
            FieldSpec::i32("parameter_index"),
            FieldSpec::i32("type_index"),
            FieldSpec::i32("data_index"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            parameter_index: fields.i32()?,
            type_index: fields.i32()?,
            data_index: fields.i32()?,
        })
    }
}

/// Property definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppPropertyDefinition {
    pub name_index: u32,
    pub get: i32,
    pub set: i32,
    pub attrs: u32,
    pub custom_attribute_index: i32,
    pub token: u32,
}

impl Record for Il2CppPropertyDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppPropertyDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::i32("get"),
            FieldSpec::i32("set"),
            FieldSpec::u32("attrs"),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::u32("token").since(V19),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            get: fields.i32()?,
            set: fields.i32()?,
            attrs: fields.u32()?,
            custom_attribute_index: fields.i32()?,
            token: fields.u32()?,
        })
    }
}

/// Event definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppEventDefinition {
    pub name_index: u32,
    pub type_index: i32,
    pub add: i32,
    pub remove: i32,
    pub raise: i32,
    pub custom_attribute_index: i32,
    pub token: u32,
}

impl Record for Il2CppEventDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppEventDefinition",
        fields: &[
            FieldSpec::u32("name_index"),
            FieldSpec::i32("type_index"),
            FieldSpec::i32("add"),
            FieldSpec::i32("remove"),
            FieldSpec::i32("raise"),
            FieldSpec::i32("custom_attribute_index").until(V24),
            FieldSpec::u32("token").since(V19),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            name_index: fields.u32()?,
            type_index: fields.i32()?,
            add: fields.i32()?,
            remove: fields.i32()?,
            raise: fields.i32()?,
            custom_attribute_index: fields.i32()?,
            token: fields.u32()?,
        })
    }
}

/// Generic container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppGenericContainer {
    pub owner_index: i32,
    pub type_argc: i32,
    pub is_method: i32,
    pub generic_parameter_start: i32,
}

impl Record for Il2CppGenericContainer {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppGenericContainer",
        fields: &[
            FieldSpec::i32("owner_index"),
            FieldSpec::i32("type_argc"),
            FieldSpec::i32("is_method"),
            FieldSpec::i32("generic_parameter_start"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            owner_index: fields.i32()?,
            type_argc: fields.i32()?,
            is_method: fields.i32()?,
            generic_parameter_start: fields.i32()?,
        })
    }
}

/// Generic parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppGenericParameter {
    pub owner_index: i32,
    pub name_index: u32,
    pub constraints_start: i16,
    pub constraints_count: i16,
    pub num: u16,
    pub flags: u16,
}

impl Record for Il2CppGenericParameter {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppGenericParameter",
        fields: &[
            FieldSpec::i32("owner_index"),
            FieldSpec::u32("name_index"),
            FieldSpec::i16("constraints_start"),
            FieldSpec::i16("constraints_count"),
            FieldSpec::u16("num"),
            FieldSpec::u16("flags"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            owner_index: fields.i32()?,
            name_index: fields.u32()?,
            constraints_start: fields.i16()?,
            constraints_count: fields.i16()?,
            num: fields.u16()?,
            flags: fields.u16()?,
        })
    }
}

/// String literal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppStringLiteral {
    pub length: u32,
    pub data_index: i32,
}

impl Record for Il2CppStringLiteral {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppStringLiteral",
        fields: &[FieldSpec::u32("length"), FieldSpec::i32("data_index")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            length: fields.u32()?,
            data_index: fields.i32()?,
        })
    }
}

/// Field reference
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppFieldRef {
    pub type_index: i32,
    pub field_index: i32,
}

impl Record for Il2CppFieldRef {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppFieldRef",
        fields: &[FieldSpec::i32("type_index"), FieldSpec::i32("field_index")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            type_index: fields.i32()?,
            field_index: fields.i32()?,
        })
    }
}

/// Custom attribute range of one metadata token (before 29)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppCustomAttributeTypeRange {
    pub token: u32,
    pub start: i32,
    pub count: i32,
}

impl Record for Il2CppCustomAttributeTypeRange {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppCustomAttributeTypeRange",
        fields: &[
            FieldSpec::u32("token").since(V24_1),
            FieldSpec::i32("start"),
            FieldSpec::i32("count"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            token: fields.u32()?,
            start: fields.i32()?,
            count: fields.i32()?,
        })
    }
}

/// Custom attribute data range of one metadata token (29 and later)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppCustomAttributeDataRange {
    pub token: u32,
    pub start_offset: u32,
}

impl Record for Il2CppCustomAttributeDataRange {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppCustomAttributeDataRange",
        fields: &[FieldSpec::u32("token"), FieldSpec::u32("start_offset")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            token: fields.u32()?,
            start_offset: fields.u32()?,
        })
    }
}

/// Window into the metadata usage pair array
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppMetadataUsageList {
    pub start: u32,
    pub count: u32,
}

impl Record for Il2CppMetadataUsageList {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppMetadataUsageList",
        fields: &[FieldSpec::u32("start"), FieldSpec::u32("count")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            start: fields.u32()?,
            count: fields.u32()?,
        })
    }
}

/// Packed metadata usage: a destination slot and an encoded source index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppMetadataUsagePair {
    pub destination_index: u32,
    pub encoded_source_index: u32,
}

impl Record for Il2CppMetadataUsagePair {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppMetadataUsagePair",
        fields: &[
            FieldSpec::u32("destination_index"),
            FieldSpec::u32("encoded_source_index"),
        ],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            destination_index: fields.u32()?,
            encoded_source_index: fields.u32()?,
        })
    }
}

/// Kind of a runtime generic context entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Il2CppRgctxDataType {
    #[default]
    Invalid,
    Type,
    Class,
    Method,
    Array,
    Unknown(i32),
}

impl From<i32> for Il2CppRgctxDataType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Invalid,
            1 => Self::Type,
            2 => Self::Class,
            3 => Self::Method,
            4 => Self::Array,
            other => Self::Unknown(other),
        }
    }
}

/// Runtime generic context entry (24.1 and earlier)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Il2CppRgctxDefinition {
    pub data_type: Il2CppRgctxDataType,
    pub data: i32,
}

impl Il2CppRgctxDefinition {
    /// Method index for `Method` entries
    pub fn method_index(&self) -> Option<i32> {
        (self.data_type == Il2CppRgctxDataType::Method).then_some(self.data)
    }

    /// Type index for `Type` and `Class` entries
    pub fn type_index(&self) -> Option<i32> {
        matches!(
            self.data_type,
            Il2CppRgctxDataType::Type | Il2CppRgctxDataType::Class
        )
        .then_some(self.data)
    }
}

impl Record for Il2CppRgctxDefinition {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "Il2CppRGCTXDefinition",
        fields: &[FieldSpec::i32("type"), FieldSpec::i32("data")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        Ok(Self {
            data_type: Il2CppRgctxDataType::from(fields.i32()?),
            data: fields.i32()?,
        })
    }
}
