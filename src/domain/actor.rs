use serde_json::Value;

use super::keys::{as_object, FirstKey};
use super::{DecodeResult, UserRef};

/// Who performed an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    User(UserRef),
    /// `anonymous`, `administrator`, `system`, `impersonation`, ...
    Other(FirstKey),
}

impl Actor {
    pub fn decode(value: &Value) -> DecodeResult<Self> {
        let object = as_object(value, "actors[]")?;
        match object.get("user") {
            Some(user) => Ok(Self::User(UserRef::decode(user)?)),
            None => Ok(Self::Other(FirstKey::of(object))),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::User(user) => user.label(),
            Self::Other(kind) => kind.as_str(),
        }
    }
}
