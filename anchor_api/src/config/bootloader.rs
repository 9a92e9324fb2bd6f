use serde::{Deserialize, Serialize};

/// Boot loader to install into the target root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BootLoader {
    /// # systemd-boot
    ///
    /// UEFI boot manager installed with `bootctl`, plus one loader entry.
    SystemdBoot(BootEntry),
}

impl BootLoader {
    /// Returns the root device the loaded kernel will boot from.
    pub fn root(&self) -> &RootDevice {
        match self {
            BootLoader::SystemdBoot(entry) => &entry.root,
        }
    }
}

/// A boot loader entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BootEntry {
    /// Location of the entry file, relative to the target root, e.g.
    /// `/boot/loader/entries/arch.conf`.
    pub path: String,

    pub title: String,

    /// Kernel image, relative to the ESP.
    pub kernel: String,

    /// Microcode image loaded before the base initrd.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucode: Option<String>,

    pub root: RootDevice,

    /// Additional kernel command line options.
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RootDevice {
    #[serde(rename = "type")]
    pub kind: RootDeviceKind,

    /// Device path passed as `root=` on the kernel command line.
    pub path: String,
}

impl RootDevice {
    /// Whether the root filesystem lives on an LVM logical volume, in which
    /// case the initrd must activate volume groups before mounting it.
    pub fn is_lvm(&self) -> bool {
        self.kind == RootDeviceKind::Lvm
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RootDeviceKind {
    /// A partition or other plain block device.
    #[default]
    #[serde(alias = "partition")]
    Plain,

    /// An LVM logical volume.
    Lvm,
}
