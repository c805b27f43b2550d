use thiserror::Error;

/// A required field was missing or had the wrong shape.
///
/// Unrecognized variants are never an error; they decode to their first key
/// (or `unknown`). This is only returned when a field the report needs is
/// absent or a resource path cannot be split.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("field `{field}` has no second path segment: {value:?}")]
    MissingSegment { field: &'static str, value: String },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
