use log::{info, warn};

use anchor_api::{config::User, error::AnchorError};
use osutils::{
    chroot::Chroot,
    dependencies::{Command, Dependency, DependencyError},
};

pub(super) fn set_up_users(chroot: &Chroot, users: &[User]) -> Result<(), AnchorError> {
    for user in users {
        info!("Creating user '{}'", user.username);
        chroot.run(&useradd_command(user))?;
        set_password(chroot, &user.username)?;
    }
    Ok(())
}

fn useradd_command(user: &User) -> Command {
    let mut command = Dependency::Useradd.cmd();
    command.args(["-m", "-g", user.primary_group()]);
    if let Some(groups) = &user.secondary_groups {
        command.args(["-G".to_string(), groups.join(",")]);
    }
    command.arg(&user.username);
    command
}

/// Prompts for the user's password until `passwd` succeeds. Only a `passwd`
/// that ran and failed is retried; a command that cannot be started is
/// reported.
fn set_password(chroot: &Chroot, username: &str) -> Result<(), AnchorError> {
    let command = Dependency::Passwd.cmd().with_arg(username);
    loop {
        info!("Setting password for user '{username}'");
        match chroot.try_run(&command) {
            Ok(()) => return Ok(()),
            Err(e) if matches!(*e, DependencyError::ExecutionFailed { .. }) => {
                warn!("Failed to set password for user '{username}', retrying: {e}")
            }
            Err(e) => return Err(chroot.command_error(&command, e)),
        }
    }
}
