use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::PathBuf,
};

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use anchor_api::{
    config::InstallPolicy,
    constants::{CONFIG_PATH_DEFAULT, TARGET_ROOT_PATH_DEFAULT},
};

use crate::ANCHOR_VERSION;

#[derive(Parser, Debug)]
#[clap(version = ANCHOR_VERSION)]
pub struct Cli {
    /// Logging verbosity [OFF, ERROR, WARN, INFO, DEBUG, TRACE]
    #[arg(global = true, short, long, default_value_t = LevelFilter::Debug)]
    pub verbosity: LevelFilter,

    /// Also write the full log, one JSON object per line, to this file
    #[arg(global = true, long)]
    pub log_file: Option<PathBuf>,

    /// Write stage timing metrics, one JSON object per line, to this file
    #[arg(global = true, long)]
    pub metrics_file: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Which configuration keys must be present.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyArgs {
    /// Require the disks, format and mount sections
    #[clap(long)]
    pub strict: bool,

    /// Require the packages section
    #[clap(long)]
    pub require_packages: bool,
}

impl From<PolicyArgs> for InstallPolicy {
    fn from(args: PolicyArgs) -> Self {
        InstallPolicy {
            require_storage: args.strict,
            require_packages: args.require_packages,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Partition, format and mount the disks, then install and configure a
    /// new system into the target root
    Install {
        /// The configuration to apply
        #[clap(index = 1, default_value = CONFIG_PATH_DEFAULT)]
        config: PathBuf,

        /// Where the new root filesystem is mounted
        #[clap(long, default_value = TARGET_ROOT_PATH_DEFAULT)]
        target_root: PathBuf,

        #[clap(flatten)]
        policy: PolicyArgs,

        /// Do not check for required host tools before starting
        #[clap(long)]
        skip_preflight: bool,

        /// Path to save an eventual fatal error
        #[clap(short, long)]
        error: Option<PathBuf>,
    },

    /// Load and validate a configuration without touching the system
    Validate {
        /// Path to the configuration file
        #[clap(index = 1, default_value = CONFIG_PATH_DEFAULT)]
        config: PathBuf,

        #[clap(flatten)]
        policy: PolicyArgs,
    },

    /// Report which host tools the configuration needs and whether they are
    /// installed
    #[clap(name = "check-dependencies")]
    CheckDependencies {
        /// Path to the configuration file
        #[clap(index = 1, default_value = CONFIG_PATH_DEFAULT)]
        config: PathBuf,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Install { .. } => "install",
            Commands::Validate { .. } => "validate",
            Commands::CheckDependencies { .. } => "check-dependencies",
        }
    }
}

impl Display for Commands {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn test_install_defaults() {
        let cli = Cli::try_parse_from(["anchor", "install"]).unwrap();
        assert_eq!(cli.verbosity, LevelFilter::Debug);
        assert!(cli.log_file.is_none());
        assert!(cli.metrics_file.is_none());

        let Commands::Install {
            config,
            target_root,
            policy,
            skip_preflight,
            error,
        } = cli.command
        else {
            panic!("Expected install command");
        };
        assert_eq!(config, Path::new("config.json"));
        assert_eq!(target_root, Path::new("/mnt"));
        assert_eq!(InstallPolicy::from(policy), InstallPolicy::default());
        assert!(!skip_preflight);
        assert!(error.is_none());
    }

    #[test]
    fn test_install_flags() {
        let cli = Cli::try_parse_from([
            "anchor",
            "install",
            "/etc/anchor.yaml",
            "--target-root",
            "/target",
            "--strict",
            "--require-packages",
            "--skip-preflight",
            "-e",
            "/tmp/error.yaml",
            "-v",
            "trace",
            "--log-file",
            "/var/log/anchor.jsonl",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, LevelFilter::Trace);
        assert_eq!(cli.log_file.as_deref(), Some(Path::new("/var/log/anchor.jsonl")));
        assert_eq!(cli.command.name(), "install");

        let Commands::Install {
            config,
            target_root,
            policy,
            skip_preflight,
            error,
        } = cli.command
        else {
            panic!("Expected install command");
        };
        assert_eq!(config, Path::new("/etc/anchor.yaml"));
        assert_eq!(target_root, Path::new("/target"));
        assert_eq!(
            InstallPolicy::from(policy),
            InstallPolicy {
                require_storage: true,
                require_packages: true
            }
        );
        assert!(skip_preflight);
        assert_eq!(error.as_deref(), Some(Path::new("/tmp/error.yaml")));
    }

    #[test]
    fn test_other_commands() {
        let cli = Cli::try_parse_from(["anchor", "validate", "c.yaml", "--strict"]).unwrap();
        assert_eq!(cli.command.to_string(), "validate");
        assert!(matches!(
            cli.command,
            Commands::Validate {
                policy: PolicyArgs {
                    strict: true,
                    require_packages: false
                },
                ..
            }
        ));

        let cli = Cli::try_parse_from(["anchor", "check-dependencies", "--metrics-file", "m.jsonl"])
            .unwrap();
        assert_eq!(cli.command.to_string(), "check-dependencies");
        assert_eq!(cli.metrics_file.as_deref(), Some(Path::new("m.jsonl")));
    }

    #[test]
    fn test_rejects_unknown() {
        Cli::try_parse_from(["anchor", "update"]).unwrap_err();
        Cli::try_parse_from(["anchor", "validate", "--target-root", "/mnt"]).unwrap_err();
    }
}
