use log::info;

use anchor_api::{
    config::{Disk, Partition},
    error::{AnchorError, PartitionTableError, ReportError},
};
use osutils::dependencies::{Command, Dependency};

use crate::engine::InstallContext;

/// Wipes (when requested) and partitions every disk, in document order.
#[tracing::instrument(name = "partitions_creation", skip_all)]
pub fn create_partitions(ctx: &InstallContext, disks: &[Disk]) -> Result<(), AnchorError> {
    for disk in disks {
        if disk.wipe {
            info!("Wiping disk '{}'", disk.path);
            ctx.runner
                .run(&wipe_command(disk))
                .structured(PartitionTableError::Wipe {
                    disk: disk.path.clone(),
                })?;
        }

        for partition in &disk.partitions {
            info!(
                "Creating partition {} '{}' on disk '{}'",
                partition.number, partition.name, disk.path
            );
            ctx.runner
                .run(&partition_command(disk, partition))
                .structured(PartitionTableError::Partition {
                    disk: disk.path.clone(),
                })?;
        }
    }
    Ok(())
}

/// Replaces the partition table of the disk with a fresh, empty GPT.
fn wipe_command(disk: &Disk) -> Command {
    Dependency::Sgdisk.cmd().with_args(["-o", disk.path.as_str()])
}

fn partition_command(disk: &Disk, partition: &Partition) -> Command {
    let number = partition.number;
    Dependency::Sgdisk.cmd().with_args([
        "-n".to_string(),
        format!("{number}:{}:{}", partition.start, partition.end),
        "-t".to_string(),
        format!("{number}:{}", partition.type_code),
        "-c".to_string(),
        format!("{number}:{}", partition.name),
        disk.path.clone(),
    ])
}

#[cfg(test)]
mod tests {
    use anchor_api::{
        config::{Configuration, PartitionBound},
        error::ErrorKind,
    };
    use osutils::testutils::MockRunner;

    use super::*;

    fn disk(wipe: bool) -> Disk {
        Disk {
            path: "/dev/nvme0n1".into(),
            wipe,
            partitions: vec![
                Partition {
                    number: 1,
                    start: PartitionBound::Sector(2048),
                    end: PartitionBound::Expression("+1G".into()),
                    type_code: "ef00".into(),
                    name: "esp".into(),
                },
                Partition {
                    number: 2,
                    start: PartitionBound::Sector(0),
                    end: PartitionBound::Expression("-0".into()),
                    type_code: "8e00".into(),
                    name: "system lvm".into(),
                },
            ],
        }
    }

    #[test]
    fn test_create_partitions() {
        let config = Configuration::default();
        let runner = MockRunner::new();
        let ctx = InstallContext::new(&config, "/mnt", &runner);

        create_partitions(&ctx, &[disk(false)]).unwrap();
        assert_eq!(
            runner.invocations(),
            vec![
                "sgdisk -n 1:2048:+1G -t 1:ef00 -c 1:esp /dev/nvme0n1",
                "sgdisk -n 2:0:-0 -t 2:8e00 -c '2:system lvm' /dev/nvme0n1",
            ]
        );
    }

    #[test]
    fn test_wipe_failure() {
        let config = Configuration::default();
        let runner = MockRunner::new().failing_on("sgdisk -o");
        let ctx = InstallContext::new(&config, "/mnt", &runner);

        let error = create_partitions(&ctx, &[disk(true)]).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::PartitionTable(PartitionTableError::Wipe {
                disk: "/dev/nvme0n1".into()
            })
        );
        assert_eq!(error.kind().to_string(), "Failed to wipe '/dev/nvme0n1'");
        assert_eq!(runner.invocations(), vec!["sgdisk -o /dev/nvme0n1"]);
    }
}
