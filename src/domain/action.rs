use serde_json::Value;

use super::keys::{as_array, as_object, as_string, required, FirstKey, Object};
use super::{DecodeResult, UserRef};

/// The primary action of an activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionDetail {
    /// `subtype` is the creation kind: `new`, `upload`, `copy`.
    Create { subtype: FirstKey },
    PermissionChange(PermissionChange),
    Other(FirstKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PermissionChange {
    pub added: Option<Vec<PermissionEntry>>,
    pub removed: Option<Vec<PermissionEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEntry {
    pub role: String,
    pub user: UserRef,
}

impl ActionDetail {
    pub fn decode(value: &Value) -> DecodeResult<Self> {
        let object = as_object(value, "primaryActionDetail")?;

        // permissionChange takes precedence over create when both are set
        if let Some(change) = object.get("permissionChange") {
            let change = as_object(change, "permissionChange")?;
            return Ok(Self::PermissionChange(PermissionChange {
                added: decode_entries(change, "addedPermissions", "permissionChange.addedPermissions")?,
                removed: decode_entries(
                    change,
                    "removedPermissions",
                    "permissionChange.removedPermissions",
                )?,
            }));
        }
        if let Some(create) = object.get("create") {
            let create = as_object(create, "create")?;
            return Ok(Self::Create {
                subtype: FirstKey::of(create),
            });
        }
        Ok(Self::Other(FirstKey::of(object)))
    }

    pub fn label(&self) -> String {
        match self {
            Self::Create { subtype } => format!("create:{}", subtype),
            Self::PermissionChange(change) => change.label(),
            Self::Other(kind) => kind.to_string(),
        }
    }
}

impl PermissionChange {
    /// `PermissionChange-to:<roles>-from:<roles>-for:<users>`.
    ///
    /// The `-for:` users come from the removed list whenever it is present,
    /// even if permissions were also added.
    pub fn label(&self) -> String {
        let mut label = String::from("PermissionChange");
        let mut users = String::new();

        if let Some(added) = &self.added {
            label.push_str("-to:");
            label.push_str(&roles(added));
            users = user_ids(added);
        }
        if let Some(removed) = &self.removed {
            label.push_str("-from:");
            label.push_str(&roles(removed));
            users = user_ids(removed);
        }

        label.push_str("-for:");
        label.push_str(&users);
        label
    }
}

fn roles(entries: &[PermissionEntry]) -> String {
    entries.iter().map(|entry| entry.role.as_str()).collect()
}

fn user_ids(entries: &[PermissionEntry]) -> String {
    entries.iter().map(|entry| entry.user.label()).collect()
}

fn decode_entries(
    change: &Object,
    key: &str,
    field: &'static str,
) -> DecodeResult<Option<Vec<PermissionEntry>>> {
    let Some(entries) = change.get(key) else {
        return Ok(None);
    };
    as_array(entries, field)?
        .iter()
        .map(PermissionEntry::decode)
        .collect::<DecodeResult<Vec<_>>>()
        .map(Some)
}

impl PermissionEntry {
    pub fn decode(value: &Value) -> DecodeResult<Self> {
        let object = as_object(value, "permission")?;
        let role = as_string(required(object, "role", "permission.role")?, "permission.role")?;
        let user = UserRef::decode(required(object, "user", "permission.user")?)?;
        Ok(Self { role, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DecodeError;
    use serde_json::json;

    fn permission(role: &str, person: &str) -> Value {
        json!({"role": role, "user": {"knownUser": {"personName": format!("people/{person}")}}})
    }

    fn label(detail: Value) -> String {
        ActionDetail::decode(&detail).expect("decode").label()
    }

    #[test]
    fn create_uses_nested_kind() {
        assert_eq!(label(json!({"create": {"new": {}}})), "create:new");
        assert_eq!(label(json!({"create": {"copy": {"originalObject": {}}}})), "create:copy");
        assert_eq!(label(json!({"create": {}})), "create:unknown");
    }

    #[test]
    fn other_actions_use_their_key() {
        assert_eq!(label(json!({"edit": {}})), "edit");
        assert_eq!(label(json!({"move": {"addedParents": []}})), "move");
        assert_eq!(label(json!({})), "unknown");
    }

    #[test]
    fn added_permission() {
        let detail = json!({"permissionChange": {"addedPermissions": [permission("writer", "abc123")]}});
        assert_eq!(label(detail), "PermissionChange-to:writer-for:abc123");
    }

    #[test]
    fn removed_users_replace_added_users() {
        let detail = json!({"permissionChange": {
            "addedPermissions": [permission("writer", "xyz")],
            "removedPermissions": [permission("reader", "abc123")]
        }});
        assert_eq!(
            label(detail),
            "PermissionChange-to:writer-from:reader-for:abc123"
        );
    }

    #[test]
    fn roles_and_users_concatenate_without_separator() {
        let detail = json!({"permissionChange": {"removedPermissions": [
            permission("reader", "a1"),
            permission("commenter", "b2")
        ]}});
        assert_eq!(label(detail), "PermissionChange-from:readercommenter-for:a1b2");
    }

    #[test]
    fn empty_permission_change_still_has_for_segment() {
        assert_eq!(label(json!({"permissionChange": {}})), "PermissionChange-for:");
    }

    #[test]
    fn non_person_permission_targets_use_variant_name() {
        let detail = json!({"permissionChange": {"addedPermissions": [
            {"role": "reader", "user": {"unknownUser": {}}}
        ]}});
        assert_eq!(label(detail), "PermissionChange-to:reader-for:unknownUser");
    }

    #[test]
    fn permission_without_user_fails() {
        let detail = json!({"permissionChange": {"addedPermissions": [{"role": "writer", "anyone": {}}]}});
        let err = ActionDetail::decode(&detail).unwrap_err();
        assert_eq!(err, DecodeError::MissingField("permission.user"));
    }
}
