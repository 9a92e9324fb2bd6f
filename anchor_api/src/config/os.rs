use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PRIMARY_GROUP;

/// Configuration for a specific user.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct User {
    /// Username
    pub username: String,

    /// Primary group to add the user to. Defaults to `users`.
    #[serde(
        default,
        rename = "primarygroup",
        alias = "primaryGroup",
        skip_serializing_if = "Option::is_none"
    )]
    pub primary_group: Option<String>,

    /// List of secondary groups to add the user to.
    #[serde(
        default,
        rename = "secondarygroups",
        alias = "secondaryGroups",
        skip_serializing_if = "Option::is_none"
    )]
    pub secondary_groups: Option<Vec<String>>,
}

impl User {
    /// Returns the primary group, falling back to the default group.
    pub fn primary_group(&self) -> &str {
        self.primary_group.as_deref().unwrap_or(DEFAULT_PRIMARY_GROUP)
    }
}
