//! Error types for binary parsing

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Read out of bounds: {len} bytes at {offset:#x}, buffer holds {available}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("Unterminated string at {0:#x}")]
    UnterminatedString(usize),

    #[error("Schema mismatch in {record}: field `{field}` read as the wrong kind")]
    SchemaMismatch {
        record: &'static str,
        field: &'static str,
    },
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

impl ParseError {
    pub fn out_of_bounds(offset: usize, len: usize, available: usize) -> Self {
        Self::OutOfBounds {
            offset,
            len,
            available,
        }
    }

    pub fn schema_mismatch(record: &'static str, field: &'static str) -> Self {
        Self::SchemaMismatch { record, field }
    }
}

impl From<ParseError> for gmeta_core::Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::OutOfBounds {
                offset,
                len,
                available,
            } => gmeta_core::Error::OutOfBounds {
                offset,
                len,
                available,
            },
            other => gmeta_core::Error::parse(other.to_string()),
        }
    }
}
