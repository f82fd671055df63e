//! Positioned little-endian reader over an immutable buffer

use crate::schema::{FieldCursor, Record};
use crate::{ParseError, ParseResult};
use byteorder::{ByteOrder, LittleEndian};
use gmeta_core::FormatVersion;
use tracing::trace;

/// Helper to read primitives and record arrays from byte slices
///
/// Every read is bounds-checked against the backing buffer and fails with
/// [`ParseError::OutOfBounds`] instead of panicking.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Move the cursor; seeking to the very end of the buffer is allowed
    pub fn seek(&mut self, offset: usize) -> ParseResult<()> {
        if offset > self.data.len() {
            return Err(ParseError::out_of_bounds(offset, 0, self.data.len()));
        }
        self.offset = offset;
        Ok(())
    }

    /// Check that `len` bytes starting at `offset` lie inside the buffer
    pub fn check_range(&self, offset: usize, len: usize) -> ParseResult<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(()),
            _ => Err(ParseError::out_of_bounds(offset, len, self.data.len())),
        }
    }

    fn take(&mut self, count: usize) -> ParseResult<&'a [u8]> {
        self.check_range(self.offset, count)?;
        let bytes = &self.data[self.offset..self.offset + count];
        self.offset += count;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> ParseResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> ParseResult<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> ParseResult<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> ParseResult<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> ParseResult<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_bytes(&mut self, count: usize) -> ParseResult<&'a [u8]> {
        self.take(count)
    }

    pub fn read_array<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read `count` consecutive u32 words from the current position
    pub fn read_words(&mut self, count: usize) -> ParseResult<Vec<u32>> {
        let bytes = self.take(count.saturating_mul(4))?;
        let mut words = vec![0u32; count];
        LittleEndian::read_u32_into(bytes, &mut words);
        Ok(words)
    }

    /// Read a null-terminated string at `offset` without moving the cursor
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn read_cstring_at(&self, offset: usize) -> ParseResult<String> {
        let tail = self
            .data
            .get(offset..)
            .ok_or_else(|| ParseError::out_of_bounds(offset, 1, self.data.len()))?;
        let len = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(ParseError::UnterminatedString(offset))?;
        Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
    }

    /// Read a section as an array of version-sized records
    ///
    /// The element count is `byte_size / T::SCHEMA.size(version)`; trailing
    /// bytes that do not fill a whole record are ignored. A zero offset or
    /// zero size marks an absent section and yields an empty array without
    /// touching the buffer.
    pub fn read_record_array<T: Record>(
        &mut self,
        offset: u32,
        byte_size: u32,
        version: FormatVersion,
    ) -> ParseResult<Vec<T>> {
        let stride = T::SCHEMA.size(version);
        if offset == 0 || byte_size == 0 || stride == 0 {
            return Ok(Vec::new());
        }

        let count = byte_size as usize / stride;
        let start = offset as usize;
        self.check_range(start, count * stride)?;
        self.seek(start)?;

        trace!(
            "Reading {} x {} ({} bytes each) at {:#x}",
            count,
            T::SCHEMA.name,
            stride,
            start
        );

        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            let mut fields = FieldCursor::new(self, T::SCHEMA, version);
            let record = T::read(&mut fields)?;
            fields.finish()?;
            result.push(record);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, RecordSchema};

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        left: u32,
        extra: u16,
        right: i16,
    }

    impl Record for Pair {
        const SCHEMA: &'static RecordSchema = &RecordSchema {
            name: "Pair",
            fields: &[
                FieldSpec::u32("left"),
                FieldSpec::u16("extra").since(FormatVersion::V24),
                FieldSpec::i16("right"),
            ],
        };

        fn read(fields: &mut FieldCursor<'_, '_>) -> ParseResult<Self> {
            Ok(Self {
                left: fields.u32()?,
                extra: fields.u16()?,
                right: fields.i16()?,
            })
        }
    }

    #[test]
    fn test_little_endian_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0x34, 0x12];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_i16().unwrap(), -1);
        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [0u8; 3];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(
            reader.read_u32(),
            Err(ParseError::out_of_bounds(0, 4, 3))
        );
        // failed reads do not advance
        assert_eq!(reader.offset(), 0);
        assert!(reader.seek(4).is_err());
        assert!(reader.seek(3).is_ok());
    }

    #[test]
    fn test_cstring_keeps_position() {
        let data = b"abc\0hello\0tail";
        let mut reader = BinaryReader::new(data);
        reader.seek(2).unwrap();
        assert_eq!(reader.read_cstring_at(4).unwrap(), "hello");
        assert_eq!(reader.read_cstring_at(3).unwrap(), "");
        assert_eq!(reader.offset(), 2);
        assert_eq!(
            reader.read_cstring_at(10),
            Err(ParseError::UnterminatedString(10))
        );
        assert!(matches!(
            reader.read_cstring_at(100),
            Err(ParseError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_record_array_is_sized_by_version() {
        let mut data = vec![0u8; 4];
        // two 8-byte records under 24: left, extra, right
        data.extend_from_slice(&[1, 0, 0, 0, 7, 0, 2, 0]);
        data.extend_from_slice(&[3, 0, 0, 0, 8, 0, 0xFE, 0xFF]);

        let mut reader = BinaryReader::new(&data);
        let pairs: Vec<Pair> = reader
            .read_record_array(4, 16, FormatVersion::V24)
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                Pair { left: 1, extra: 7, right: 2 },
                Pair { left: 3, extra: 8, right: -2 },
            ]
        );

        // the same bytes are 6-byte records before 24
        let pairs: Vec<Pair> = reader
            .read_record_array(4, 16, FormatVersion::V23)
            .unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], Pair { left: 1, extra: 0, right: 7 });
        assert_eq!(pairs[1].left, 0x0003_0002);
    }

    #[test]
    fn test_absent_section_is_empty() {
        let mut reader = BinaryReader::new(&[]);
        let pairs: Vec<Pair> = reader
            .read_record_array(0x100, 0, FormatVersion::V24)
            .unwrap();
        assert!(pairs.is_empty());
        let pairs: Vec<Pair> = reader.read_record_array(0, 64, FormatVersion::V24).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_truncated_section_fails() {
        let data = [0u8; 12];
        let mut reader = BinaryReader::new(&data);
        let result: ParseResult<Vec<Pair>> = reader.read_record_array(4, 16, FormatVersion::V24);
        assert!(matches!(result, Err(ParseError::OutOfBounds { .. })));
    }

    #[test]
    fn test_read_words() {
        let data = [1, 0, 0, 0, 2, 0, 0, 0];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_words(2).unwrap(), vec![1, 2]);
        assert!(reader.read_words(1).is_err());
    }
}
