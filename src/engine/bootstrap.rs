use log::info;

use anchor_api::{
    config::Configuration,
    error::{AnchorError, BootstrapError, ReportError},
};
use osutils::dependencies::Dependency;

use super::{InstallContext, Stage};

/// Installs the base package set into the target root.
#[derive(Default, Debug)]
pub struct BootstrapStage;
impl Stage for BootstrapStage {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.packages.is_some()
    }

    fn dependencies(&self, _config: &Configuration) -> Vec<Dependency> {
        vec![Dependency::Pacstrap]
    }

    #[tracing::instrument(name = "bootstrap", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        let packages = ctx.config.packages.as_deref().unwrap_or_default();
        info!(
            "Installing {} package(s) into '{}'",
            packages.len(),
            ctx.target_root.display()
        );
        ctx.runner
            .run(
                &Dependency::Pacstrap
                    .cmd()
                    .with_arg(&ctx.target_root)
                    .with_args(packages),
            )
            .structured(BootstrapError::Pacstrap)
    }
}
