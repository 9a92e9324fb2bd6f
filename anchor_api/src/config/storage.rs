use std::fmt::{self, Display};

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display as StrumDisplay, IntoStaticStr};

use crate::{constants::LOGICAL_VOLUME_SIZE_ALL_FREE, is_default};

/// Per disk configuration.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Disk {
    /// Device path of the disk, e.g. `/dev/sda`.
    pub path: String,

    /// Whether to create a fresh, empty GPT before partitioning.
    #[serde(default, skip_serializing_if = "is_default")]
    pub wipe: bool,

    /// Partitions to create on the disk, in order.
    #[serde(default)]
    pub partitions: Vec<Partition>,
}

/// A single GPT partition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Partition {
    /// Partition number, unique per disk.
    pub number: u32,

    /// First sector of the partition.
    pub start: PartitionBound,

    /// Last sector of the partition.
    pub end: PartitionBound,

    /// GPT type code, e.g. `ef00` or `8300`. Purely numeric codes may be
    /// written as numbers.
    #[serde(rename = "type", deserialize_with = "type_code_from_scalar")]
    pub type_code: String,

    /// Human readable partition name.
    pub name: String,
}

fn type_code_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TypeCode {
        Number(u64),
        Code(String),
    }

    Ok(match TypeCode::deserialize(deserializer)? {
        TypeCode::Number(number) => number.to_string(),
        TypeCode::Code(code) => code,
    })
}

/// Start or end of a partition, either a sector number or an sgdisk
/// expression such as `+512M` or `-0`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PartitionBound {
    Sector(u64),
    Expression(String),
}

impl Display for PartitionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionBound::Sector(sector) => write!(f, "{sector}"),
            PartitionBound::Expression(expression) => f.write_str(expression),
        }
    }
}

/// An LVM volume group and the logical volumes carved out of it.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VolumeGroup {
    /// Name of the volume group, unique across the configuration.
    pub name: String,

    /// Block devices initialized as physical volumes and pooled into the group.
    pub physical: Vec<String>,

    /// Logical volumes to create, in order.
    #[serde(default)]
    pub logical: Vec<LogicalVolume>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LogicalVolume {
    pub name: String,

    pub size: LogicalVolumeSize,

    /// Physical volume to allocate the logical volume from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

/// Size of a logical volume.
///
/// Serialized as a plain string: the sentinel `100%FREE` selects all the free
/// space left in the group, anything else is passed through as an absolute
/// size (e.g. `20G`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum LogicalVolumeSize {
    Absolute(String),
    AllFree,
}

impl From<String> for LogicalVolumeSize {
    fn from(value: String) -> Self {
        if value == LOGICAL_VOLUME_SIZE_ALL_FREE {
            LogicalVolumeSize::AllFree
        } else {
            LogicalVolumeSize::Absolute(value)
        }
    }
}

impl From<LogicalVolumeSize> for String {
    fn from(value: LogicalVolumeSize) -> Self {
        value.to_string()
    }
}

impl Display for LogicalVolumeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalVolumeSize::Absolute(size) => f.write_str(size),
            LogicalVolumeSize::AllFree => f.write_str(LOGICAL_VOLUME_SIZE_ALL_FREE),
        }
    }
}

/// A block device to format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FormatSpec {
    pub path: String,

    #[serde(rename = "format")]
    pub kind: FilesystemKind,
}

/// Filesystems the installer knows how to create.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, StrumDisplay, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FilesystemKind {
    /// # FAT32
    ///
    /// Typically used for the EFI system partition.
    #[serde(rename = "fat")]
    #[strum(serialize = "fat")]
    Fat32,

    /// # ext4
    Ext4,

    /// # Swap
    ///
    /// Initialized as a swap area and enabled right away.
    Swap,
}

/// A device to mount and where to mount it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MountSpec {
    pub device: String,

    /// Mount point as seen from the installer host, e.g. `/mnt/boot`.
    pub path: String,
}
