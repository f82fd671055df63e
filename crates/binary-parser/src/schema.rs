//! Version-conditioned record layouts
//!
//! A [`RecordSchema`] is the single source of truth for how wide a record is
//! under a given [`FormatVersion`]. Record decoders never hard-code widths:
//! they pull their fields through a [`FieldCursor`], which walks the schema in
//! declared order, reads the fields present in the version and hands back
//! defaults for the ones that are not.

use crate::reader::BinaryReader;
use crate::{ParseError, ParseResult};
use gmeta_core::FormatVersion;

/// Storage kind of a single declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U32,
    I32,
    U16,
    I16,
    /// Inline fixed-length byte array
    Bytes(usize),
    /// Nested record, sized recursively
    Record(&'static RecordSchema),
}

impl FieldKind {
    pub fn size(&self, version: FormatVersion) -> usize {
        match self {
            FieldKind::U32 | FieldKind::I32 => 4,
            FieldKind::U16 | FieldKind::I16 => 2,
            FieldKind::Bytes(len) => *len,
            FieldKind::Record(schema) => schema.size(version),
        }
    }
}

/// A declared field with its inclusive version range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub since: Option<FormatVersion>,
    pub until: Option<FormatVersion>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            since: None,
            until: None,
        }
    }

    pub const fn u32(name: &'static str) -> Self {
        Self::new(name, FieldKind::U32)
    }

    pub const fn i32(name: &'static str) -> Self {
        Self::new(name, FieldKind::I32)
    }

    pub const fn u16(name: &'static str) -> Self {
        Self::new(name, FieldKind::U16)
    }

    pub const fn i16(name: &'static str) -> Self {
        Self::new(name, FieldKind::I16)
    }

    pub const fn bytes(name: &'static str, len: usize) -> Self {
        Self::new(name, FieldKind::Bytes(len))
    }

    pub const fn record(name: &'static str, schema: &'static RecordSchema) -> Self {
        Self::new(name, FieldKind::Record(schema))
    }

    /// First version that carries the field
    pub const fn since(mut self, version: FormatVersion) -> Self {
        self.since = Some(version);
        self
    }

    /// Last version that carries the field
    pub const fn until(mut self, version: FormatVersion) -> Self {
        self.until = Some(version);
        self
    }

    pub const fn between(self, since: FormatVersion, until: FormatVersion) -> Self {
        self.since(since).until(until)
    }

    pub fn applies_to(&self, version: FormatVersion) -> bool {
        self.since.map_or(true, |min| version >= min)
            && self.until.map_or(true, |max| version <= max)
    }
}

/// Ordered field table of one record type
#[derive(Debug, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl RecordSchema {
    /// Total byte width of the record under `version`
    pub fn size(&self, version: FormatVersion) -> usize {
        self.present_fields(version)
            .map(|field| field.kind.size(version))
            .sum()
    }

    /// Fields carried by `version`, in declared order
    pub fn present_fields(
        &self,
        version: FormatVersion,
    ) -> impl Iterator<Item = &'static FieldSpec> + '_ {
        self.fields
            .iter()
            .filter(move |field| field.applies_to(version))
    }
}

/// A Rust type decoded from a schema-described record
pub trait Record: Sized {
    const SCHEMA: &'static RecordSchema;

    /// Decode one record; must pull every declared field exactly once, in order
    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self>;
}

/// Walks a record schema while reading, one declared field per call
pub struct FieldCursor<'r, 'a> {
    reader: &'r mut BinaryReader<'a>,
    schema: &'static RecordSchema,
    version: FormatVersion,
    next: usize,
}

impl<'r, 'a> FieldCursor<'r, 'a> {
    pub fn new(
        reader: &'r mut BinaryReader<'a>,
        schema: &'static RecordSchema,
        version: FormatVersion,
    ) -> Self {
        Self {
            reader,
            schema,
            version,
            next: 0,
        }
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    /// Advance to the next declared field, returning whether it is present
    fn advance(&mut self, accepts: impl FnOnce(&FieldKind) -> bool) -> ParseResult<bool> {
        let field = self
            .schema
            .fields
            .get(self.next)
            .ok_or_else(|| ParseError::schema_mismatch(self.schema.name, "<end of record>"))?;
        if !accepts(&field.kind) {
            return Err(ParseError::schema_mismatch(self.schema.name, field.name));
        }
        self.next += 1;
        Ok(field.applies_to(self.version))
    }

    pub fn u32(&mut self) -> ParseResult<u32> {
        if self.advance(|kind| *kind == FieldKind::U32)? {
            self.reader.read_u32()
        } else {
            Ok(0)
        }
    }

    pub fn i32(&mut self) -> ParseResult<i32> {
        if self.advance(|kind| *kind == FieldKind::I32)? {
            self.reader.read_i32()
        } else {
            Ok(0)
        }
    }

    pub fn u16(&mut self) -> ParseResult<u16> {
        if self.advance(|kind| *kind == FieldKind::U16)? {
            self.reader.read_u16()
        } else {
            Ok(0)
        }
    }

    pub fn i16(&mut self) -> ParseResult<i16> {
        if self.advance(|kind| *kind == FieldKind::I16)? {
            self.reader.read_i16()
        } else {
            Ok(0)
        }
    }

    pub fn bytes<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        if self.advance(|kind| *kind == FieldKind::Bytes(N))? {
            self.reader.read_array::<N>()
        } else {
            Ok([0u8; N])
        }
    }

    pub fn record<T: Record + Default>(&mut self) -> ParseResult<T> {
        let present = self.advance(|kind| {
            matches!(kind, FieldKind::Record(schema) if schema.name == T::SCHEMA.name)
        })?;
        if !present {
            return Ok(T::default());
        }
        let mut nested = FieldCursor::new(&mut *self.reader, T::SCHEMA, self.version);
        let value = T::read(&mut nested)?;
        nested.finish()?;
        Ok(value)
    }

    /// Fail if the decoder left declared fields unread
    pub fn finish(self) -> ParseResult<()> {
        match self.schema.fields.get(self.next) {
            Some(field) => Err(ParseError::schema_mismatch(self.schema.name, field.name)),
            None => Ok(()),
        }
    }
}

impl Record for u32 {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "uint32",
        fields: &[FieldSpec::u32("value")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        fields.u32()
    }
}

impl Record for i32 {
    const SCHEMA: &'static RecordSchema = &RecordSchema {
        name: "int32",
        fields: &[FieldSpec::i32("value")],
    };

    fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
        fields.i32()
    }
}
