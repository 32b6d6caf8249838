//! Primary-role derivation.
//!
//! The external provider's user metadata may carry a `roles` list, a singular
//! `role`, both, or neither. Recognized names are picked by priority
//! (`admin` > `manager` > `employee`), never by position.

use std::str::FromStr;

use serde_json::Value;

use super::model::Role;

/// Raw role names declared in `metadata`, in declaration order.
fn candidates(metadata: Option<&Value>) -> Vec<String> {
    let Some(metadata) = metadata else {
        return Vec::new();
    };

    let mut names: Vec<String> = match metadata.get("roles") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    if let Some(role) = metadata.get("role").and_then(Value::as_str) {
        names.push(role.to_string());
    }
    names
}

/// Recognized roles in `metadata`, highest priority first, deduplicated.
pub fn recognized_roles(metadata: Option<&Value>) -> Vec<Role> {
    let mut roles: Vec<Role> = candidates(metadata)
        .iter()
        .filter_map(|name| Role::from_str(name.trim()).ok())
        .collect();
    roles.sort_unstable_by(|a, b| b.cmp(a));
    roles.dedup();
    roles
}

/// Highest-priority recognized role, or `employee` when none is recognized.
pub fn derive_primary_role(metadata: Option<&Value>) -> Role {
    recognized_roles(metadata)
        .first()
        .copied()
        .unwrap_or_default()
}
