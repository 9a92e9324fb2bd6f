use std::path::{Path, PathBuf};

use log::trace;

use anchor_api::error::{AnchorError, ChrootError};

use crate::{
    dependencies::{Command, Dependency, DependencyError},
    exe::CommandRunner,
};

/// Runs commands inside the target root through `arch-chroot`.
///
/// `arch-chroot` takes care of the special directories (`/dev`, `/proc`,
/// `/sys`, ...) for the duration of each command, so there is nothing to
/// enter or exit here.
pub struct Chroot<'a> {
    root: PathBuf,
    runner: &'a dyn CommandRunner,
}

impl<'a> Chroot<'a> {
    pub fn new(root: impl Into<PathBuf>, runner: &'a dyn CommandRunner) -> Self {
        Self {
            root: root.into(),
            runner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Wraps a command as `arch-chroot <root> <command...>`.
    pub fn wrap(&self, command: &Command) -> Command {
        Dependency::ArchChroot
            .cmd()
            .with_arg(&self.root)
            .with_arg(command.dependency().name())
            .with_args(command.get_args())
    }

    /// Runs a command inside the target root.
    pub fn run(&self, command: &Command) -> Result<(), AnchorError> {
        self.try_run(command)
            .map_err(|e| self.command_error(command, e))
    }

    /// Like [`Chroot::run`], but hands back the execution error itself so
    /// callers can tell a failing command from one that could not start.
    pub fn try_run(&self, command: &Command) -> Result<(), Box<DependencyError>> {
        trace!(
            "Running '{}' in '{}'",
            command.render_command(),
            self.root.display()
        );
        self.runner.run(&self.wrap(command))
    }

    /// Reports a failure of `command` as a chrooted-command fault.
    pub fn command_error(&self, command: &Command, error: Box<DependencyError>) -> AnchorError {
        AnchorError::with_source(
            ChrootError::Command {
                command: self.wrap(command).render_command(),
            },
            error.into(),
        )
    }
}
