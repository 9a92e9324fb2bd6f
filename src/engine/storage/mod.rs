use log::debug;

use anchor_api::{config::Configuration, error::AnchorError};
use osutils::dependencies::Dependency;

use super::{InstallContext, Stage};

pub mod filesystem;
pub mod lvm;
pub mod mount;
pub mod partitioning;

/// Partitions disks and lays out LVM on top of them.
#[derive(Default, Debug)]
pub struct StorageStage;
impl Stage for StorageStage {
    fn name(&self) -> &'static str {
        "storage"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.disks.is_some() || config.lvm.is_some()
    }

    fn dependencies(&self, config: &Configuration) -> Vec<Dependency> {
        let mut dependencies = Vec::new();
        if config.disks.is_some() {
            dependencies.push(Dependency::Sgdisk);
        }
        if config.lvm.is_some() {
            dependencies.extend([
                Dependency::Pvcreate,
                Dependency::Vgcreate,
                Dependency::Lvcreate,
            ]);
        }
        dependencies
    }

    #[tracing::instrument(name = "storage_provision", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        if let Some(disks) = &ctx.config.disks {
            partitioning::create_partitions(ctx, disks)?;
        } else {
            debug!("No disks configured, skipping partitioning");
        }

        if let Some(groups) = &ctx.config.lvm {
            lvm::create_volumes(ctx, groups)?;
        }

        Ok(())
    }
}
