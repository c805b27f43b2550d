use serde_json::{Map, Value};

use super::{DecodeError, DecodeResult};

pub type Object = Map<String, Value>;

/// The first key of a JSON object, in wire order.
///
/// Variant records from the activity API carry exactly one populated key, so
/// the first key doubles as the variant name when the variant is not one we
/// decode further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FirstKey {
    Key(String),
    Unknown,
}

impl FirstKey {
    pub fn of(object: &Object) -> Self {
        object
            .keys()
            .next()
            .map_or(Self::Unknown, |key| Self::Key(key.clone()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Key(key) => key,
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FirstKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub(crate) fn as_object<'a>(value: &'a Value, field: &'static str) -> DecodeResult<&'a Object> {
    value.as_object().ok_or(DecodeError::WrongType {
        field,
        expected: "an object",
    })
}

pub(crate) fn as_array<'a>(value: &'a Value, field: &'static str) -> DecodeResult<&'a [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(DecodeError::WrongType {
            field,
            expected: "an array",
        })
}

pub(crate) fn as_string(value: &Value, field: &'static str) -> DecodeResult<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(DecodeError::WrongType {
            field,
            expected: "a string",
        })
}

pub(crate) fn required<'a>(object: &'a Object, key: &str, field: &'static str) -> DecodeResult<&'a Value> {
    object.get(key).ok_or(DecodeError::MissingField(field))
}

/// Second `/`-separated segment of a resource name, e.g. `people/123` -> `123`.
pub(crate) fn second_segment(path: &str, field: &'static str) -> DecodeResult<String> {
    path.split('/')
        .nth(1)
        .map(str::to_string)
        .ok_or_else(|| DecodeError::MissingSegment {
            field,
            value: path.to_string(),
        })
}
