use log::info;

use anchor_api::{
    config::{Configuration, FilesystemKind, FormatSpec},
    error::{AnchorError, FormatError, ReportError},
};
use osutils::dependencies::{Command, Dependency};

use crate::engine::{InstallContext, Stage};

/// Creates filesystems and enables swap areas.
#[derive(Default, Debug)]
pub struct FilesystemStage;
impl Stage for FilesystemStage {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.format.is_some()
    }

    fn dependencies(&self, config: &Configuration) -> Vec<Dependency> {
        let mut dependencies = Vec::new();
        for spec in config.format.iter().flatten() {
            match spec.kind {
                FilesystemKind::Fat32 => dependencies.push(Dependency::MkfsFat),
                FilesystemKind::Ext4 => dependencies.push(Dependency::MkfsExt4),
                FilesystemKind::Swap => {
                    dependencies.extend([Dependency::Mkswap, Dependency::Swapon])
                }
            }
        }
        dependencies
    }

    #[tracing::instrument(name = "filesystems_creation", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        for spec in ctx.config.format.iter().flatten() {
            create_filesystem(ctx, spec)?;
        }
        Ok(())
    }
}

fn mkfs_command(spec: &FormatSpec) -> Command {
    let command = match spec.kind {
        FilesystemKind::Fat32 => Dependency::MkfsFat.cmd().with_arg("-F32"),
        FilesystemKind::Ext4 => Dependency::MkfsExt4.cmd().with_arg("-F"),
        FilesystemKind::Swap => Dependency::Mkswap.cmd(),
    };
    command.with_arg(&spec.path)
}

fn create_filesystem(ctx: &InstallContext, spec: &FormatSpec) -> Result<(), AnchorError> {
    info!("Formatting '{}' as {}", spec.path, spec.kind);
    ctx.runner
        .run(&mkfs_command(spec))
        .structured(FormatError::Format {
            path: spec.path.clone(),
            kind: spec.kind.to_string(),
        })?;

    if spec.kind == FilesystemKind::Swap {
        info!("Enabling swap on '{}'", spec.path);
        ctx.runner
            .run(&Dependency::Swapon.cmd().with_arg(&spec.path))
            .structured(FormatError::EnableSwap {
                path: spec.path.clone(),
            })?;
    }
    Ok(())
}
