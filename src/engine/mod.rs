use std::time::Instant;

use log::{debug, info};

use anchor_api::{
    config::Configuration,
    error::{AnchorError, AnchorResultExt},
};
use osutils::dependencies::Dependency;

use crate::subsystems::{initrd::InitrdStage, osconfig::OsConfigStage};

mod context;

// Anchor stages
pub mod boot;
pub mod bootstrap;
pub mod storage;

pub use context::InstallContext;

use self::{
    boot::BootStage,
    bootstrap::BootstrapStage,
    storage::{filesystem::FilesystemStage, mount::MountStage, StorageStage},
};

/// One ordered phase of the installation.
pub(crate) trait Stage {
    fn name(&self) -> &'static str;

    /// Whether the configuration asks for anything this stage does. Stages
    /// that are not configured are skipped.
    fn is_configured(&self, config: &Configuration) -> bool;

    /// External tools this stage will invoke for the given configuration.
    fn dependencies(&self, config: &Configuration) -> Vec<Dependency>;

    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError>;
}

/// All stages, in execution order.
pub(crate) fn stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(StorageStage),
        Box::new(FilesystemStage),
        Box::new(MountStage),
        Box::new(BootstrapStage),
        Box::new(OsConfigStage),
        Box::new(BootStage),
        Box::new(InitrdStage),
    ]
}

/// Runs every configured stage in order, stopping at the first failure.
#[tracing::instrument(skip_all)]
pub fn install(ctx: &InstallContext) -> Result<(), AnchorError> {
    info!(
        "Installing into target root '{}'",
        ctx.target_root.display()
    );
    let install_start = Instant::now();

    for stage in stages() {
        let name = stage.name();
        if !stage.is_configured(ctx.config) {
            debug!(stage = name; "Skipping stage '{name}': not configured");
            continue;
        }

        info!(stage = name; "Starting stage '{name}'");
        let stage_start = Instant::now();
        stage
            .run(ctx)
            .message(format!("Stage '{name}' failed"))?;
        tracing::info!(
            metric_name = "stage_duration_secs",
            stage = name,
            value = stage_start.elapsed().as_secs_f64()
        );
        debug!(stage = name; "Finished stage '{name}'");
    }

    tracing::info!(
        metric_name = "install_duration_secs",
        value = install_start.elapsed().as_secs_f64()
    );
    info!("Installation complete");
    Ok(())
}
