use log::{debug, info};

use anchor_api::{
    config::Configuration,
    constants::{
        ENVIRONMENT_RELATIVE_PATH, FSTAB_RELATIVE_PATH, HOSTS_RELATIVE_PATH, LOCALTIME_PATH,
        SUDOERS_DROP_IN_RELATIVE_PATH, SUDOERS_RULE, ZONEINFO_DIRECTORY,
    },
    error::{AnchorError, AnchorResultExt, ReportError, TargetConfigurationError},
};
use osutils::{dependencies::Dependency, files};

use crate::engine::{InstallContext, Stage};

mod hostname;
mod locale;
mod users;

/// Configures the bootstrapped system: identity, time, locale, users,
/// services, name resolution, sudo policy and the filesystem table.
#[derive(Default, Debug)]
pub struct OsConfigStage;
impl Stage for OsConfigStage {
    fn name(&self) -> &'static str {
        "os-config"
    }

    fn is_configured(&self, config: &Configuration) -> bool {
        config.configures_target()
    }

    /// Everything but `genfstab` runs inside the target root.
    fn dependencies(&self, _config: &Configuration) -> Vec<Dependency> {
        vec![Dependency::ArchChroot, Dependency::Genfstab]
    }

    #[tracing::instrument(name = "osconfig_configuration", skip_all)]
    fn run(&self, ctx: &InstallContext) -> Result<(), AnchorError> {
        let config = ctx.config;

        if let Some(services) = &config.services {
            enable_services(ctx, services).message("Failed to enable services")?;
        }

        if let Some(hostname) = &config.hostname {
            hostname::set_up_hostname(ctx, hostname).message("Failed to set up hostname")?;
        }

        if let Some(timezone) = &config.timezone {
            set_up_timezone(ctx, timezone).message("Failed to set up time zone")?;
        }

        if let Some(locales) = &config.localization {
            locale::set_up_locales(ctx, locales).message("Failed to set up localization")?;
        }

        if let Some(environment) = &config.environment {
            info!("Setting up global environment");
            files::append_file(
                ctx.target_path(ENVIRONMENT_RELATIVE_PATH),
                files::lines_to_content(environment).as_bytes(),
            )
            .message("Failed to set up environment")?;
        }

        if let Some(users) = &config.users {
            users::set_up_users(&ctx.chroot(), users).message("Failed to set up users")?;
        }

        set_up_sudo(ctx).message("Failed to set up sudo policy")?;

        generate_fstab(ctx).message("Failed to generate filesystem table")?;

        if let Some(hosts) = &config.hosts {
            info!("Setting up hosts file");
            files::append_file(
                ctx.target_path(HOSTS_RELATIVE_PATH),
                files::lines_to_content(hosts).as_bytes(),
            )
            .message("Failed to set up hosts file")?;
        }

        Ok(())
    }
}

fn enable_services(ctx: &InstallContext, services: &[String]) -> Result<(), AnchorError> {
    if services.is_empty() {
        debug!("No services to enable");
        return Ok(());
    }

    info!("Enabling services: {}", services.join(", "));
    ctx.chroot().run(
        &Dependency::Systemctl
            .cmd()
            .with_arg("enable")
            .with_args(services),
    )
}

fn set_up_timezone(ctx: &InstallContext, timezone: &str) -> Result<(), AnchorError> {
    info!("Setting time zone to '{timezone}'");
    let chroot = ctx.chroot();
    chroot.run(&Dependency::Ln.cmd().with_args([
        "-sf".to_string(),
        format!("{ZONEINFO_DIRECTORY}/{timezone}"),
        LOCALTIME_PATH.to_string(),
    ]))?;
    chroot.run(&Dependency::Hwclock.cmd().with_arg("--systohc"))
}

/// Grants members of the sudo group full privileges, with a password.
fn set_up_sudo(ctx: &InstallContext) -> Result<(), AnchorError> {
    info!("Setting up sudo policy");
    files::create_new_file(
        ctx.target_path(SUDOERS_DROP_IN_RELATIVE_PATH),
        format!("{SUDOERS_RULE}\n").as_bytes(),
    )
}

fn generate_fstab(ctx: &InstallContext) -> Result<(), AnchorError> {
    info!("Generating filesystem table");
    let command = Dependency::Genfstab
        .cmd()
        .with_arg("-U")
        .with_arg(&ctx.target_root);
    let fstab = ctx
        .runner
        .output(&command)
        .structured(TargetConfigurationError::CaptureOutput {
            command: command.render_command(),
        })?;

    files::append_file(ctx.target_path(FSTAB_RELATIVE_PATH), fstab.as_bytes())
}
