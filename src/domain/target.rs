use serde_json::Value;

use super::keys::{as_object, as_string, required, second_segment, FirstKey};
use super::{DecodeResult, UserRef};

/// What an activity was performed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    DriveItem(DriveItem),
    /// `drive`, `fileComment`, ...
    Other(FirstKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriveItem {
    /// Second segment of the `items/ITEM_ID` resource name.
    pub item_id: String,
    /// `None` when the owner is a shared drive or a domain rather than a user.
    pub owner: Option<UserRef>,
}

impl Target {
    pub fn decode(value: &Value) -> DecodeResult<Self> {
        let object = as_object(value, "targets[]")?;
        let Some(item) = object.get("driveItem") else {
            return Ok(Self::Other(FirstKey::of(object)));
        };
        let item = as_object(item, "driveItem")?;

        let name = match item.get("name") {
            Some(name) => as_string(name, "driveItem.name")?,
            None => "unknown".to_string(),
        };
        let item_id = second_segment(&name, "driveItem.name")?;

        let owner = as_object(required(item, "owner", "driveItem.owner")?, "driveItem.owner")?;
        let owner = owner.get("user").map(UserRef::decode).transpose()?;

        Ok(Self::DriveItem(DriveItem { item_id, owner }))
    }

    /// `<item id>\t*\t<owner id>` for drive items, `<variant>:unknown` otherwise.
    pub fn label(&self) -> String {
        match self {
            Self::DriveItem(item) => {
                let owner = item.owner.as_ref().map_or("Unknown", UserRef::label);
                format!("{}\t*\t{}", item.item_id, owner)
            }
            Self::Other(kind) => format!("{}:unknown", kind),
        }
    }
}
