//! Synthetic metadata blobs for tests

use crate::header::Il2CppGlobalMetadataHeader;
use crate::types::METADATA_MAGIC;
use byteorder::{LittleEndian, WriteBytesExt};
use gmeta_binary_parser::Record;
use gmeta_core::FormatVersion;

/// Little-endian byte encoder
#[derive(Debug, Default, Clone)]
pub struct Words(Vec<u8>);

impl Words {
    pub fn u32(mut self, value: u32) -> Self {
        self.0.write_u32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.0.write_i32::<LittleEndian>(value).unwrap();
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.0.extend_from_slice(value);
        self
    }

    /// Append `count` zero u32 words
    pub fn zeros(mut self, count: usize) -> Self {
        self.0.resize(self.0.len() + count * 4, 0);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// Lays named sections back to back after a header of the given layout
#[derive(Debug, Clone)]
pub struct MetadataBuilder {
    layout: FormatVersion,
    magic: u32,
    version_word: i32,
    sections: Vec<(&'static str, Vec<u8>)>,
    reverse_header: bool,
}

impl MetadataBuilder {
    pub fn new(layout: FormatVersion) -> Self {
        Self {
            layout,
            magic: METADATA_MAGIC,
            version_word: i32::from(layout.major()),
            sections: Vec::new(),
            reverse_header: false,
        }
    }

    pub fn magic(mut self, magic: u32) -> Self {
        self.magic = magic;
        self
    }

    pub fn version_word(mut self, version: i32) -> Self {
        self.version_word = version;
        self
    }

    pub fn section(mut self, name: &'static str, bytes: Vec<u8>) -> Self {
        self.sections.push((name, bytes));
        self
    }

    /// Store the section words in reverse of the declared order
    pub fn reverse_header(mut self) -> Self {
        self.reverse_header = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let header = Il2CppGlobalMetadataHeader::SCHEMA;
        let names: Vec<&'static str> = header
            .present_fields(self.layout)
            .skip(2)
            .map(|field| field.name)
            .collect();
        for (name, _) in &self.sections {
            assert!(
                names.contains(name),
                "section {} is not part of layout {}",
                name,
                self.layout
            );
        }

        let mut pos = header.size(self.layout);
        let mut words = Vec::new();
        let mut body = Vec::new();
        for name in names {
            let bytes = self
                .sections
                .iter()
                .find(|(section, _)| *section == name)
                .map(|(_, bytes)| bytes.as_slice())
                .unwrap_or_default();
            words.push(pos as u32);
            words.push(bytes.len() as u32);
            body.extend_from_slice(bytes);
            pos += bytes.len();
        }
        if self.reverse_header {
            words.reverse();
        }

        let mut out = Words::default().u32(self.magic).i32(self.version_word);
        for word in words {
            out = out.u32(word);
        }
        out.bytes(&body).into_bytes()
    }
}

/// Image record; `layout` decides which fields are written
pub fn image(
    layout: FormatVersion,
    type_count: u32,
    exported_type_count: u32,
    token: u32,
    custom_attributes: (i32, u32),
) -> Vec<u8> {
    let mut w = Words::default().u32(0).i32(0).i32(0).u32(type_count);
    if layout >= FormatVersion::V24 {
        w = w.i32(0).u32(exported_type_count);
    }
    w = w.i32(-1);
    if layout >= FormatVersion::V19 {
        w = w.u32(token);
    }
    if layout >= FormatVersion::V24_1 {
        w = w.i32(custom_attributes.0).u32(custom_attributes.1);
    }
    w.into_bytes()
}

/// Assembly record; `layout` decides which fields are written
pub fn assembly(layout: FormatVersion, image_index: i32, major: i32) -> Vec<u8> {
    let mut w = Words::default().i32(image_index);
    if layout >= FormatVersion::V24_1 {
        w = w.u32(0x2000_0001);
    }
    if layout <= FormatVersion::V24 {
        w = w.i32(-1);
    }
    if layout >= FormatVersion::V20 {
        w = w.i32(0).i32(0);
    }
    // name, culture
    w = w.u32(0).u32(0);
    if layout <= FormatVersion::V24_3 {
        w = w.i32(-1);
    }
    w.u32(0)
        .u32(0)
        .i32(0)
        .u32(0)
        .i32(major)
        .i32(0)
        .i32(0)
        .i32(0)
        .bytes(&[0xAB; 8])
        .into_bytes()
}

pub fn concat(parts: impl IntoIterator<Item = Vec<u8>>) -> Vec<u8> {
    parts.into_iter().flatten().collect()
}
