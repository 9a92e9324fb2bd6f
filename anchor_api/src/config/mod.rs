use std::{collections::HashSet, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

pub(crate) mod bootloader;
pub(crate) mod error;
pub(crate) mod os;
pub(crate) mod storage;

pub use bootloader::{BootEntry, BootLoader, RootDevice, RootDeviceKind};
pub use error::InvalidConfigurationError;
pub use os::User;
pub use storage::{
    Disk, FilesystemKind, FormatSpec, LogicalVolume, LogicalVolumeSize, MountSpec, Partition,
    PartitionBound, VolumeGroup,
};

use crate::error::{AnchorError, ConfigurationError, ReportError};

/// The configuration document. Every fragment is optional; the pipeline
/// skips the work a missing fragment would have driven.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Configuration {
    /// Disks to (optionally) wipe and partition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disks: Option<Vec<Disk>>,

    /// LVM volume groups to create on top of the partitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lvm: Option<Vec<VolumeGroup>>,

    /// Filesystems to create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Vec<FormatSpec>>,

    /// Devices to mount, in order. Parents must come before children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<Vec<MountSpec>>,

    /// Packages to bootstrap into the target root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,

    /// systemd units to enable in the target root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Time zone name under /usr/share/zoneinfo, e.g. `Europe/Paris`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Locales to generate. The first one becomes the default `LANG`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization: Option<Vec<String>>,

    /// `KEY=value` lines appended to /etc/environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,

    /// Lines appended to /etc/hosts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootloader: Option<BootLoader>,
}

/// Which configuration fragments must be present before provisioning starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InstallPolicy {
    /// Require `disks`, `format` and `mount`.
    pub require_storage: bool,

    /// Require `packages`.
    pub require_packages: bool,
}

impl Configuration {
    /// Loads a configuration document. Files ending in `.json` are parsed as
    /// JSON, everything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AnchorError> {
        let path = path.as_ref();
        debug!("Loading configuration from '{}'", path.display());
        let contents =
            std::fs::read_to_string(path).structured(ConfigurationError::Load {
                path: path.display().to_string(),
            })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, AnchorError> {
        serde_json::from_str(contents).structured(ConfigurationError::Parse)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, AnchorError> {
        serde_yaml::from_str(contents).structured(ConfigurationError::Parse)
    }

    /// Returns the keys required by the policy that are absent, in document
    /// order.
    pub fn missing_keys(&self, policy: InstallPolicy) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if policy.require_storage {
            if self.disks.is_none() {
                missing.push("disks");
            }
            if self.format.is_none() {
                missing.push("format");
            }
            if self.mount.is_none() {
                missing.push("mount");
            }
        }
        if policy.require_packages && self.packages.is_none() {
            missing.push("packages");
        }
        missing
    }

    /// Fails on the first key the policy requires that is absent.
    pub fn check_required_keys(&self, policy: InstallPolicy) -> Result<(), AnchorError> {
        match self.missing_keys(policy).first() {
            Some(key) => Err(AnchorError::new(ConfigurationError::MissingKey {
                key: key.to_string(),
            })),
            None => Ok(()),
        }
    }

    /// Whether anything has to be configured inside the target root.
    pub fn configures_target(&self) -> bool {
        self.packages.is_some()
            || self.services.is_some()
            || self.hostname.is_some()
            || self.timezone.is_some()
            || self.localization.is_some()
            || self.environment.is_some()
            || self.users.is_some()
            || self.hosts.is_some()
            || self.bootloader.is_some()
    }

    /// Whether the boot root device is an LVM logical volume.
    pub fn has_lvm_root(&self) -> bool {
        self.bootloader
            .as_ref()
            .is_some_and(|loader| loader.root().is_lvm())
    }

    /// Static validation of the configuration.
    pub fn validate(&self) -> Result<(), InvalidConfigurationError> {
        self.validate_disks()?;
        self.validate_lvm()?;

        for mount in self.mount.iter().flatten() {
            if !Path::new(&mount.path).is_absolute() {
                return Err(InvalidConfigurationError::RelativeMountPoint {
                    path: mount.path.clone(),
                });
            }
        }

        if self
            .localization
            .as_ref()
            .is_some_and(|locales| locales.is_empty())
        {
            return Err(InvalidConfigurationError::EmptyLocalization);
        }

        let mut usernames = HashSet::new();
        for user in self.users.iter().flatten() {
            if !usernames.insert(user.username.as_str()) {
                return Err(InvalidConfigurationError::DuplicateUser {
                    username: user.username.clone(),
                });
            }
        }

        if let Some(BootLoader::SystemdBoot(entry)) = &self.bootloader {
            if !Path::new(&entry.path).is_absolute() {
                return Err(InvalidConfigurationError::RelativeBootEntryPath {
                    path: entry.path.clone(),
                });
            }
        }

        Ok(())
    }

    fn validate_disks(&self) -> Result<(), InvalidConfigurationError> {
        let mut disks = HashSet::new();
        for disk in self.disks.iter().flatten() {
            if !disks.insert(disk.path.as_str()) {
                return Err(InvalidConfigurationError::DuplicateDisk {
                    disk: disk.path.clone(),
                });
            }

            let mut numbers = HashSet::new();
            for partition in disk.partitions.iter() {
                if !numbers.insert(partition.number) {
                    return Err(InvalidConfigurationError::DuplicatePartitionNumber {
                        disk: disk.path.clone(),
                        number: partition.number,
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_lvm(&self) -> Result<(), InvalidConfigurationError> {
        let mut groups = HashSet::new();
        for group in self.lvm.iter().flatten() {
            if !groups.insert(group.name.as_str()) {
                return Err(InvalidConfigurationError::DuplicateVolumeGroup {
                    group: group.name.clone(),
                });
            }

            if group.physical.is_empty() {
                return Err(InvalidConfigurationError::EmptyVolumeGroup {
                    group: group.name.clone(),
                });
            }

            let mut volumes = HashSet::new();
            for volume in group.logical.iter() {
                if !volumes.insert(volume.name.as_str()) {
                    return Err(InvalidConfigurationError::DuplicateLogicalVolume {
                        volume: volume.name.clone(),
                        group: group.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
