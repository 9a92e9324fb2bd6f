use log::info;

use anchor_api::{
    config::{Configuration, MountSpec},
    error::{AnchorError, MountError, ReportError},
};
use osutils::dependencies::Dependency;

use crate::engine::{InstallContext, Stage};

/// Creates mount points and mounts devices, in document order. Parents must
/// be listed before their children.
#[derive(Default, Debug)]
pub struct MountStage;
impl Stage for MountStage {
    fn name(&self) -> &'static str {
        "mount"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.mount.is_some()
    }

    fn dependencies(&self, _config: &Configuration) -> Vec<Dependency> {
        vec![Dependency::Mkdir, Dependency::Mount]
    }

    #[tracing::instrument(name = "mount", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        for spec in ctx.config.mount.iter().flatten() {
            mount(ctx, spec)?;
        }
        Ok(())
    }
}

fn mount(ctx: &InstallContext, spec: &MountSpec) -> Result<(), AnchorError> {
    ctx.runner
        .run(&Dependency::Mkdir.cmd().with_args(["-p", spec.path.as_str()]))
        .structured(MountError::CreateMountPoint {
            path: spec.path.clone(),
        })?;

    info!("Mounting '{}' to '{}'", spec.device, spec.path);
    ctx.runner
        .run(
            &Dependency::Mount
                .cmd()
                .with_args([spec.device.as_str(), spec.path.as_str()]),
        )
        .structured(MountError::Mount {
            device: spec.device.clone(),
            path: spec.path.clone(),
        })
}
