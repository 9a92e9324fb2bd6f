use std::{
    ffi::{OsStr, OsString},
    io,
    path::PathBuf,
};

use strum_macros::IntoStaticStr;

use anchor_api::error::{AnchorError, ExecutionEnvironmentError};

#[derive(Debug, thiserror::Error)]
pub enum DependencyError {
    #[error("Failed to find dependency '{dependency}': {source}")]
    NotFound {
        dependency: Dependency,
        #[source]
        source: which::Error,
    },

    #[error("Failed to execute dependency '{dependency}': {inner}")]
    CouldNotExecute {
        dependency: Dependency,
        #[source]
        inner: io::Error,
    },

    #[error("Dependency '{dependency}' finished unsuccessfully: {explanation}\nCmdline: {rendered_command}")]
    ExecutionFailed {
        dependency: Dependency,
        rendered_command: String,
        explanation: String,
    },
}

impl DependencyError {
    /// Returns the dependency that failed.
    pub fn dependency(&self) -> Dependency {
        match self {
            DependencyError::NotFound { dependency, .. }
            | DependencyError::CouldNotExecute { dependency, .. }
            | DependencyError::ExecutionFailed { dependency, .. } => *dependency,
        }
    }
}

/// Enum of runtime and test dependencies used in the code base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Dependency {
    #[strum(serialize = "arch-chroot")]
    ArchChroot,
    Bootctl,
    Genfstab,
    Hwclock,
    #[strum(serialize = "ln")]
    Ln,
    #[strum(serialize = "locale-gen")]
    LocaleGen,
    Lvcreate,
    Mkdir,
    #[strum(serialize = "mkfs.ext4")]
    MkfsExt4,
    #[strum(serialize = "mkfs.fat")]
    MkfsFat,
    Mkinitcpio,
    Mkswap,
    Mount,
    Pacstrap,
    Passwd,
    Pvcreate,
    Sed,
    Sgdisk,
    Swapon,
    Systemctl,
    Useradd,
    Vgcreate,
    // Test dependencies
    #[cfg(test)]
    #[strum(serialize = "doesnotexist")]
    DoesNotExist,
    #[cfg(test)]
    Echo,
    #[cfg(test)]
    False,
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.into())
    }
}

impl Dependency {
    /// Gets the name of the dependency
    ///
    /// For example, Dependency::MkfsFat => "mkfs.fat"
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Checks if the dependency is present in the system
    pub fn exists(&self) -> bool {
        self.path().is_ok()
    }

    /// Gets the path of the dependency
    pub fn path(&self) -> Result<PathBuf, Box<DependencyError>> {
        which::which(self.name()).map_err(|source| {
            Box::new(DependencyError::NotFound {
                dependency: *self,
                source,
            })
        })
    }

    /// Converts the dependency to a new Command instance
    /// (Note this does not create a std::process::Command instance)
    pub fn cmd(&self) -> Command {
        Command {
            dependency: *self,
            args: vec![],
        }
    }
}

/// Fails with an `ExecutionEnvironment` error naming every dependency that is
/// not present on the system.
pub fn check_present<'a>(
    dependencies: impl IntoIterator<Item = &'a Dependency>,
) -> Result<(), AnchorError> {
    let missing = dependencies
        .into_iter()
        .filter(|dependency| !dependency.exists())
        .map(|dependency| dependency.name())
        .collect::<Vec<_>>();

    if missing.is_empty() {
        return Ok(());
    }

    Err(AnchorError::new(
        ExecutionEnvironmentError::MissingDependencies {
            binaries: missing.join(", "),
        },
    ))
}

/// An invocation of a dependency. Executed through a
/// [`CommandRunner`](crate::exe::CommandRunner).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    dependency: Dependency,
    args: Vec<OsString>,
}

impl Command {
    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn with_arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.arg(arg);
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg.as_ref());
        }
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args(args);
        self
    }

    pub fn dependency(&self) -> Dependency {
        self.dependency
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Renders the command line, quoting arguments that contain spaces.
    pub fn render_command(&self) -> String {
        if self.args.is_empty() {
            self.dependency.to_string()
        } else {
            format!(
                "{} {}",
                self.dependency,
                self.args
                    .iter()
                    .map(|arg| arg.to_string_lossy())
                    .map(|arg| if arg.contains(' ') {
                        format!("'{arg}'")
                    } else {
                        arg.into()
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
    }
}
