use std::path::Path;

use log::info;

use anchor_api::{
    config::{Configuration, InstallPolicy},
    error::{AnchorError, AnchorResultExt, ConfigurationError},
};
use osutils::exe::CommandRunner;

pub mod cli;
mod engine;
mod logging;
mod preflight;
mod subsystems;

pub use engine::InstallContext;
pub use logging::{background_log::BackgroundLog, multilog::MultiLogger};
pub use preflight::{check_dependencies, report_dependencies, required_dependencies};

/// Anchor version as provided by environment variables at build time
pub const ANCHOR_VERSION: &str = match option_env!("ANCHOR_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// A loaded, complete and valid installation plan.
#[derive(Debug)]
pub struct Anchor {
    config: Configuration,
}

impl Anchor {
    /// Loads the configuration at `path` and checks it against the policy.
    pub fn new(path: impl AsRef<Path>, policy: InstallPolicy) -> Result<Self, AnchorError> {
        let config =
            Configuration::load(path.as_ref()).message("Failed to load configuration")?;
        Self::from_configuration(config, policy)
    }

    /// Checks the required keys, then validates the configuration.
    pub fn from_configuration(
        config: Configuration,
        policy: InstallPolicy,
    ) -> Result<Self, AnchorError> {
        config.check_required_keys(policy)?;
        config
            .validate()
            .map_err(|e| AnchorError::new(ConfigurationError::from(e)))?;
        Ok(Self { config })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Runs every configured stage against `target_root`, first making sure
    /// the host tools they need are present unless `skip_preflight` is set.
    pub fn install(
        &self,
        target_root: impl AsRef<Path>,
        runner: &dyn CommandRunner,
        skip_preflight: bool,
    ) -> Result<(), AnchorError> {
        if skip_preflight {
            info!("Skipping host dependency check");
        } else {
            check_dependencies(&self.config).message("Host is missing required tools")?;
        }

        engine::install(&InstallContext::new(
            &self.config,
            target_root.as_ref(),
            runner,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use indoc::indoc;

    use anchor_api::{
        config::InvalidConfigurationError,
        error::{ErrorKind, VolumeManagementError},
    };
    use osutils::testutils::MockRunner;

    use super::*;

    const LVM_ROOT: &str = indoc! {"
        disks:
          - path: /dev/sda
            wipe: true
            partitions:
              - {number: 1, start: 0, end: '+512M', type: ef00, name: boot}
              - {number: 2, start: 0, end: 0, type: '8e00', name: lvm}
        lvm:
          - name: vg0
            physical: [/dev/sda2]
            logical:
              - {name: swap, size: 4G}
              - {name: root, size: 100%FREE}
        format:
          - {path: /dev/sda1, format: fat}
          - {path: /dev/vg0/swap, format: swap}
          - {path: /dev/vg0/root, format: ext4}
        mount:
          - {device: /dev/vg0/root, path: /mnt}
          - {device: /dev/sda1, path: /mnt/boot}
        packages: [base, linux, lvm2]
        hostname: anchor
        localization: [en_US.UTF-8]
        bootloader:
          type: systemd-boot
          path: /boot/loader/entries/arch.conf
          title: Arch Linux
          kernel: vmlinuz-linux
          root: {type: lvm, path: /dev/vg0/root}
          options: [rw]
    "};

    fn anchor(contents: &str, policy: InstallPolicy) -> Result<Anchor, AnchorError> {
        Anchor::from_configuration(Configuration::from_yaml(contents).unwrap(), policy)
    }

    #[test]
    fn test_install_lvm_root() {
        let anchor = anchor(LVM_ROOT, InstallPolicy::default()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("etc")).unwrap();
        fs::write(
            root.join("etc/mkinitcpio.conf"),
            "HOOKS=(base udev autodetect block filesystems fsck)\n",
        )
        .unwrap();
        let runner = MockRunner::new().with_output("UUID=1 / ext4 rw 0 1\n");

        anchor.install(root, &runner, true).unwrap();

        let r = root.display();
        let invocations = runner.invocations();
        assert_eq!(
            invocations[..8],
            [
                "sgdisk -o /dev/sda",
                "sgdisk -n 1:0:+512M -t 1:ef00 -c 1:boot /dev/sda",
                "sgdisk -n 2:0:0 -t 2:8e00 -c 2:lvm /dev/sda",
                "pvcreate /dev/sda2",
                "vgcreate vg0 /dev/sda2",
                "lvcreate -L 4G vg0 -n swap",
                "lvcreate -l 100%FREE vg0 -n root",
                "mkfs.fat -F32 /dev/sda1",
            ]
        );
        assert!(invocations.contains(&format!("pacstrap {r} base linux lvm2")));

        let bootctl = format!("arch-chroot {r} bootctl install");
        let mkinitcpio = format!("arch-chroot {r} mkinitcpio -p linux");
        let bootctl_index = invocations.iter().position(|i| *i == bootctl).unwrap();
        assert_eq!(invocations.iter().filter(|i| **i == mkinitcpio).count(), 1);
        assert_eq!(invocations.last().unwrap(), &mkinitcpio);
        assert!(bootctl_index < invocations.len() - 1);

        assert_eq!(
            fs::read_to_string(root.join("etc/mkinitcpio.conf")).unwrap(),
            "HOOKS=(base udev autodetect block lvm2 filesystems fsck)\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("boot/loader/entries/arch.conf")).unwrap(),
            indoc! {"
                title Arch Linux
                linux /vmlinuz-linux
                initrd /initramfs-linux.img
                options root=/dev/vg0/root rw
            "}
        );
        assert_eq!(fs::read_to_string(root.join("etc/hostname")).unwrap(), "anchor\n");
    }

    #[test]
    fn test_install_stage_failure() {
        let anchor = anchor(LVM_ROOT, InstallPolicy::default()).unwrap();
        let runner = MockRunner::new().failing_on("vgcreate");

        let error = anchor.install("/mnt", &runner, true).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::VolumeManagement(VolumeManagementError::VolumeGroup {
                group: "vg0".into()
            })
        );
        assert_eq!(runner.invocations().last().unwrap(), "vgcreate vg0 /dev/sda2");
        assert!(format!("{error:?}").contains("Stage 'storage' failed"));
    }

    #[test]
    fn test_policy() {
        let error = anchor(
            "packages: [base]\n",
            InstallPolicy {
                require_storage: true,
                require_packages: false,
            },
        )
        .unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Configuration(ConfigurationError::MissingKey {
                key: "disks".into()
            })
        );

        let error = anchor(
            "hostname: anchor\n",
            InstallPolicy {
                require_storage: false,
                require_packages: true,
            },
        )
        .unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Configuration(ConfigurationError::MissingKey {
                key: "packages".into()
            })
        );

        anchor(
            LVM_ROOT,
            InstallPolicy {
                require_storage: true,
                require_packages: true,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_invalid_configuration() {
        let error = anchor(
            indoc! {"
                mount:
                  - {device: /dev/sda1, path: boot}
            "},
            InstallPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Configuration(ConfigurationError::Invalid(
                InvalidConfigurationError::RelativeMountPoint {
                    path: "boot".into()
                }
            ))
        );
    }

    #[test]
    fn test_new_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("config.yaml");
        fs::write(&yaml, LVM_ROOT).unwrap();
        let anchor = Anchor::new(&yaml, InstallPolicy::default()).unwrap();
        assert!(anchor.configuration().has_lvm_root());

        let json = dir.path().join("config.json");
        fs::write(&json, r#"{"hostname": "anchor"}"#).unwrap();
        let anchor = Anchor::new(&json, InstallPolicy::default()).unwrap();
        assert_eq!(anchor.configuration().hostname.as_deref(), Some("anchor"));

        let error = Anchor::new(dir.path().join("missing.yaml"), InstallPolicy::default())
            .unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::Configuration(ConfigurationError::Load { .. })
        ));

        fs::write(&json, "{ not json").unwrap();
        let error = Anchor::new(&json, InstallPolicy::default()).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Configuration(ConfigurationError::Parse)
        );
    }
}
