use serde::{Deserialize, Serialize};

/// Static validation errors, detected before anything is provisioned.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidConfigurationError {
    #[error("Partition number {number} is used more than once on disk '{disk}'")]
    DuplicatePartitionNumber { disk: String, number: u32 },

    #[error("Disk '{disk}' is listed more than once")]
    DuplicateDisk { disk: String },

    #[error("Volume group name '{group}' is used more than once")]
    DuplicateVolumeGroup { group: String },

    #[error("Volume group '{group}' has no physical volumes")]
    EmptyVolumeGroup { group: String },

    #[error("Logical volume name '{volume}' is used more than once in volume group '{group}'")]
    DuplicateLogicalVolume { volume: String, group: String },

    #[error("Mount point '{path}' must be an absolute path")]
    RelativeMountPoint { path: String },

    #[error("Localization must list at least one locale")]
    EmptyLocalization,

    #[error("Username '{username}' is used more than once")]
    DuplicateUser { username: String },

    #[error("Boot entry path '{path}' must be an absolute path")]
    RelativeBootEntryPath { path: String },
}
