use serde_json::Value;

use super::keys::{as_object, as_string, required, second_segment, FirstKey};
use super::DecodeResult;

/// A person as referenced by the activity API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    Known(KnownUser),
    /// `deletedUser`, `unknownUser`, or any variant added later.
    Other(FirstKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownUser {
    /// Second segment of the `people/ACCOUNT_ID` resource name.
    pub person_id: String,
}

impl UserRef {
    pub fn decode(value: &Value) -> DecodeResult<Self> {
        let object = as_object(value, "user")?;
        match object.get("knownUser") {
            Some(known) => {
                let known = as_object(known, "knownUser")?;
                let person_name = as_string(
                    required(known, "personName", "knownUser.personName")?,
                    "knownUser.personName",
                )?;
                let person_id = second_segment(&person_name, "knownUser.personName")?;
                Ok(Self::Known(KnownUser { person_id }))
            }
            None => Ok(Self::Other(FirstKey::of(object))),
        }
    }

    /// Person id for known users, otherwise the variant name.
    pub fn label(&self) -> &str {
        match self {
            Self::Known(user) => &user.person_id,
            Self::Other(kind) => kind.as_str(),
        }
    }
}
