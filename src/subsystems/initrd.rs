use log::info;

use anchor_api::{
    config::Configuration,
    constants::{FILESYSTEMS_INITRD_HOOK, LVM_INITRD_HOOK, MKINITCPIO_CONF_RELATIVE_PATH},
    error::{AnchorError, AnchorResultExt},
};
use osutils::{dependencies::Dependency, mkinitcpio};

use crate::engine::{InstallContext, Stage};

/// Rebuilds the initrd with LVM support when the root filesystem lives on a
/// logical volume. Runs after the boot loader is in place.
#[derive(Default, Debug)]
pub struct InitrdStage;
impl Stage for InitrdStage {
    fn name(&self) -> &'static str {
        "initrd"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.has_lvm_root()
    }

    fn dependencies(&self, _config: &Configuration) -> Vec<Dependency> {
        vec![Dependency::ArchChroot]
    }

    #[tracing::instrument(name = "initrd_regeneration", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        info!("Enabling initrd hook '{LVM_INITRD_HOOK}'");
        mkinitcpio::add_hook_to_file(
            &ctx.target_path(MKINITCPIO_CONF_RELATIVE_PATH),
            LVM_INITRD_HOOK,
            FILESYSTEMS_INITRD_HOOK,
        )
        .message("Failed to enable LVM initrd hook")?;

        info!("Regenerating initrd");
        mkinitcpio::regenerate(&ctx.chroot()).message("Failed to regenerate initrd")
    }
}
