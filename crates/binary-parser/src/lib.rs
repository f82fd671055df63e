//! Byte-level readers for the global-metadata decoder
//!
//! [`BinaryReader`] is a bounds-checked little-endian cursor over an immutable
//! buffer. [`RecordSchema`] describes how wide a record is under a given
//! [`FormatVersion`](gmeta_core::FormatVersion), and [`Record`] ties a Rust
//! type to its schema so arrays of it can be read with
//! [`BinaryReader::read_record_array`].

pub mod error;
pub mod reader;
pub mod schema;

pub use error::{ParseError, ParseResult};
pub use reader::BinaryReader;
pub use schema::{FieldCursor, FieldKind, FieldSpec, Record, RecordSchema};
