use log::info;

use anchor_api::{
    config::{LogicalVolume, LogicalVolumeSize, VolumeGroup},
    constants::LOGICAL_VOLUME_SIZE_ALL_FREE,
    error::{AnchorError, ReportError, VolumeManagementError},
};
use osutils::dependencies::{Command, Dependency};

use crate::engine::InstallContext;

/// Creates physical volumes, volume groups and logical volumes, group by
/// group. `vgcreate` receives each physical volume as a separate argument.
#[tracing::instrument(name = "lvm_creation", skip_all)]
pub fn create_volumes(ctx: &InstallContext, groups: &[VolumeGroup]) -> Result<(), AnchorError> {
    for group in groups {
        for device in &group.physical {
            info!("Creating physical volume on '{device}'");
            ctx.runner
                .run(&Dependency::Pvcreate.cmd().with_arg(device))
                .structured(VolumeManagementError::PhysicalVolume {
                    device: device.clone(),
                })?;
        }

        info!("Creating volume group '{}'", group.name);
        ctx.runner
            .run(&vgcreate_command(group))
            .structured(VolumeManagementError::VolumeGroup {
                group: group.name.clone(),
            })?;

        for volume in &group.logical {
            info!(
                "Creating logical volume '{}' ({}) on group '{}'",
                volume.name, volume.size, group.name
            );
            ctx.runner
                .run(&lvcreate_command(&group.name, volume))
                .structured(VolumeManagementError::LogicalVolume {
                    volume: volume.name.clone(),
                    group: group.name.clone(),
                })?;
        }
    }
    Ok(())
}

fn vgcreate_command(group: &VolumeGroup) -> Command {
    Dependency::Vgcreate
        .cmd()
        .with_arg(&group.name)
        .with_args(&group.physical)
}

fn lvcreate_command(group: &str, volume: &LogicalVolume) -> Command {
    let mut command = Dependency::Lvcreate.cmd();
    match &volume.size {
        LogicalVolumeSize::AllFree => command.args(["-l", LOGICAL_VOLUME_SIZE_ALL_FREE]),
        LogicalVolumeSize::Absolute(size) => command.args(["-L", size.as_str()]),
    };
    command.args([group, "-n", volume.name.as_str()]);
    if let Some(device) = &volume.device {
        command.arg(device);
    }
    command
}

#[cfg(test)]
mod tests {
    use anchor_api::{config::Configuration, error::ErrorKind};
    use osutils::testutils::MockRunner;

    use super::*;

    fn group() -> VolumeGroup {
        VolumeGroup {
            name: "vg0".into(),
            physical: vec!["/dev/sda2".into(), "/dev/sdb1".into()],
            logical: vec![
                LogicalVolume {
                    name: "swap".into(),
                    size: LogicalVolumeSize::Absolute("8G".into()),
                    device: Some("/dev/sdb1".into()),
                },
                LogicalVolume {
                    name: "root".into(),
                    size: LogicalVolumeSize::AllFree,
                    device: None,
                },
            ],
        }
    }

    #[test]
    fn test_create_volumes() {
        let config = Configuration::default();
        let runner = MockRunner::new();
        let ctx = InstallContext::new(&config, "/mnt", &runner);

        create_volumes(&ctx, &[group()]).unwrap();
        assert_eq!(
            runner.invocations(),
            vec![
                "pvcreate /dev/sda2",
                "pvcreate /dev/sdb1",
                "vgcreate vg0 /dev/sda2 /dev/sdb1",
                "lvcreate -L 8G vg0 -n swap /dev/sdb1",
                "lvcreate -l 100%FREE vg0 -n root",
            ]
        );
    }

    #[test]
    fn test_vgcreate_arguments() {
        let command = vgcreate_command(&group());
        assert_eq!(
            command.get_args(),
            ["vg0", "/dev/sda2", "/dev/sdb1"].map(std::ffi::OsString::from)
        );
    }

    #[test]
    fn test_size_flags() {
        let all_free = lvcreate_command(
            "vg0",
            &LogicalVolume {
                name: "home".into(),
                size: LogicalVolumeSize::AllFree,
                device: None,
            },
        );
        assert!(all_free.render_command().contains(" -l 100%FREE "));
        assert!(!all_free.render_command().contains(" -L "));

        let absolute = lvcreate_command(
            "vg0",
            &LogicalVolume {
                name: "home".into(),
                size: LogicalVolumeSize::Absolute("100G".into()),
                device: None,
            },
        );
        assert!(absolute.render_command().contains(" -L 100G "));
        assert!(!absolute.render_command().contains(" -l "));
    }

    #[test]
    fn test_volume_group_failure() {
        let config = Configuration::default();
        let runner = MockRunner::new().failing_on("vgcreate");
        let ctx = InstallContext::new(&config, "/mnt", &runner);

        let error = create_volumes(&ctx, &[group()]).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::VolumeManagement(VolumeManagementError::VolumeGroup {
                group: "vg0".into()
            })
        );
        assert_eq!(runner.invocations().len(), 3);
    }

    #[test]
    fn test_logical_volume_failure() {
        let config = Configuration::default();
        let runner = MockRunner::new().failing_on("-n root");
        let ctx = InstallContext::new(&config, "/mnt", &runner);

        let error = create_volumes(&ctx, &[group()]).unwrap_err();
        assert_eq!(
            error.kind().to_string(),
            "Failed to create logical volume 'root' on group 'vg0'"
        );
    }
}
