use anchor_api::{
    config::{BootLoader, Configuration},
    error::AnchorError,
};
use osutils::dependencies::Dependency;

use super::{InstallContext, Stage};

pub mod systemd_boot;

/// Installs the boot loader into the target root.
#[derive(Default, Debug)]
pub struct BootStage;
impl Stage for BootStage {
    fn name(&self) -> &'static str {
        "boot"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.bootloader.is_some()
    }

    /// `bootctl` runs inside the target root, only `arch-chroot` is needed on
    /// the host.
    fn dependencies(&self, _config: &Configuration) -> Vec<Dependency> {
        vec![Dependency::ArchChroot]
    }

    #[tracing::instrument(name = "boot_configuration", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        match &ctx.config.bootloader {
            Some(BootLoader::SystemdBoot(entry)) => systemd_boot::install(ctx, entry),
            None => Ok(()),
        }
    }
}
