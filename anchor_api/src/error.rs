use std::fmt::{Debug, Write};
use std::{borrow::Cow, panic::Location};

use serde::{ser::SerializeStruct, Deserialize, Serialize};
use strum_macros::IntoStaticStr;

use crate::config::InvalidConfigurationError;

/// The configuration document could not be used.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigurationError {
    #[error("Missing required configuration key '{key}'")]
    MissingKey { key: String },
    #[error("Failed to load configuration file from '{path}'")]
    Load { path: String },
    #[error("Failed to parse configuration")]
    Parse,
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] InvalidConfigurationError),
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum PartitionTableError {
    #[error("Failed to wipe '{disk}'")]
    Wipe { disk: String },
    #[error("Failed to partition '{disk}'")]
    Partition { disk: String },
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum VolumeManagementError {
    #[error("Failed to create physical volume on '{device}'")]
    PhysicalVolume { device: String },
    #[error("Failed to create volume group '{group}'")]
    VolumeGroup { group: String },
    #[error("Failed to create logical volume '{volume}' on group '{group}'")]
    LogicalVolume { volume: String, group: String },
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum FormatError {
    #[error("Failed to format '{path}' as {kind}")]
    Format { path: String, kind: String },
    #[error("Failed to enable swap at '{path}'")]
    EnableSwap { path: String },
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum MountError {
    #[error("Failed to create mount point '{path}'")]
    CreateMountPoint { path: String },
    #[error("Failed to mount '{device}' to '{path}'")]
    Mount { device: String, path: String },
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum BootstrapError {
    #[error("Failed to install packages to the target root")]
    Pacstrap,
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ChrootError {
    #[error("Failed to run command: {command}")]
    Command { command: String },
}

/// A file under the target root could not be read or written.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum TargetConfigurationError {
    #[error("Target root is already configured, '{path}' exists")]
    AlreadyConfigured { path: String },
    #[error("Failed to write '{path}'")]
    WriteFile { path: String },
    #[error("Failed to read '{path}'")]
    ReadFile { path: String },
    #[error("Failed to capture output of '{command}'")]
    CaptureOutput { command: String },
}

/// The installer cannot run because the host is missing something it needs.
#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionEnvironmentError {
    #[error("Required binaries are missing from PATH: {binaries}")]
    MissingDependencies { binaries: String },
}

#[derive(Debug, Eq, thiserror::Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum InternalError {
    #[error("Internal error: {0}")]
    Internal(&'static str),
    #[error("Anchor panicked: {0}")]
    Panic(String),
}

/// Each variant of `ErrorKind` corresponds to the stage or concern that
/// produced the error.
#[derive(Debug, Eq, thiserror::Error, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "kebab-case")]
pub enum ErrorKind {
    /// The configuration document is missing, malformed or incomplete.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Wiping or partitioning a disk failed.
    #[error(transparent)]
    PartitionTable(#[from] PartitionTableError),

    /// Creating physical volumes, volume groups or logical volumes failed.
    #[error(transparent)]
    VolumeManagement(#[from] VolumeManagementError),

    /// Creating a filesystem or enabling swap failed.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Creating a mount point or mounting a device failed.
    #[error(transparent)]
    Mount(#[from] MountError),

    /// Installing the base package set failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// A command executed inside the target root failed.
    #[error(transparent)]
    Chroot(#[from] ChrootError),

    /// Reading or writing a file in the target root failed.
    #[error(transparent)]
    TargetConfiguration(#[from] TargetConfigurationError),

    /// The host running the installer is misconfigured.
    #[error(transparent)]
    ExecutionEnvironment(#[from] ExecutionEnvironmentError),

    /// A bug in the installer.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

#[derive(Debug)]
struct AnchorErrorInner {
    kind: ErrorKind,
    location: &'static Location<'static>,
    source: Option<anyhow::Error>,
    context: Vec<(Cow<'static, str>, &'static Location<'static>)>,
}

pub struct AnchorError(Box<AnchorErrorInner>);
impl AnchorError {
    #[track_caller]
    pub fn new(kind: impl Into<ErrorKind>) -> Self {
        AnchorError(Box::new(AnchorErrorInner {
            kind: kind.into(),
            location: Location::caller(),
            source: None,
            context: Vec::new(),
        }))
    }

    #[track_caller]
    pub fn with_source(kind: impl Into<ErrorKind>, source: anyhow::Error) -> Self {
        AnchorError(Box::new(AnchorErrorInner {
            kind: kind.into(),
            location: Location::caller(),
            source: Some(source),
            context: Vec::new(),
        }))
    }

    #[track_caller]
    pub fn internal(message: &'static str) -> Self {
        Self::new(InternalError::Internal(message))
    }

    pub fn unstructured(self, context: impl Into<Cow<'static, str>>) -> anyhow::Error {
        match self.0.source {
            Some(source) => source.context(self.0.kind).context(context.into()),
            None => anyhow::Error::from(self.0.kind).context(context.into()),
        }
    }

    /// Returns a reference to the inner ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.0.kind
    }
}

pub trait ReportError<T, K> {
    /// Convert this error into a structured AnchorError.
    fn structured(self, kind: K) -> Result<T, AnchorError>;
}

impl<T, K> ReportError<T, K> for Option<T>
where
    K: Into<ErrorKind>,
{
    #[track_caller]
    fn structured(self, kind: K) -> Result<T, AnchorError> {
        match self {
            Some(t) => Ok(t),
            None => Err(AnchorError::new(kind)),
        }
    }
}

impl<T, E, K> ReportError<T, K> for Result<T, E>
where
    E: Into<anyhow::Error>,
    K: Into<ErrorKind>,
{
    #[track_caller]
    fn structured(self, kind: K) -> Result<T, AnchorError> {
        match self {
            Ok(o) => Ok(o),
            Err(e) => Err(AnchorError::with_source(kind, e.into())),
        }
    }
}

pub trait AnchorResultExt<T> {
    /// Attach a context message to the error.
    fn message(self, context: impl Into<Cow<'static, str>>) -> Result<T, AnchorError>;

    /// Convert the error into an unstructured error.
    fn unstructured(self, context: impl Into<Cow<'static, str>>) -> Result<T, anyhow::Error>;
}
impl<T> AnchorResultExt<T> for Result<T, AnchorError> {
    #[track_caller]
    fn message(mut self, context: impl Into<Cow<'static, str>>) -> Result<T, AnchorError> {
        if let Err(ref mut e) = self {
            e.0.context.push((context.into(), Location::caller()));
        }
        self
    }

    fn unstructured(self, context: impl Into<Cow<'static, str>>) -> Result<T, anyhow::Error> {
        self.map_err(|e| e.unstructured(context))
    }
}

impl Serialize for AnchorError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("anchor-error", 5)?;
        state.serialize_field("message", &self.0.kind.to_string())?;
        match self.0.kind {
            ErrorKind::Configuration(ref e) => state.serialize_field("error", e)?,
            ErrorKind::PartitionTable(ref e) => state.serialize_field("error", e)?,
            ErrorKind::VolumeManagement(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Format(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Mount(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Bootstrap(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Chroot(ref e) => state.serialize_field("error", e)?,
            ErrorKind::TargetConfiguration(ref e) => state.serialize_field("error", e)?,
            ErrorKind::ExecutionEnvironment(ref e) => state.serialize_field("error", e)?,
            ErrorKind::Internal(ref e) => state.serialize_field("error", e)?,
        }
        state.serialize_field("category", <&str>::from(&self.0.kind))?;
        state.serialize_field(
            "location",
            &format!("{}:{}", self.0.location.file(), self.0.location.line()),
        )?;
        match self.0.source {
            Some(ref e) => state.serialize_field("cause", &Some(format!("{:?}", e)))?,
            None => state.serialize_field("cause", &None::<String>)?,
        }
        state.end()
    }
}

impl Debug for AnchorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.0.kind,
            self.0.location.file(),
            self.0.location.line()
        )?;

        if !self.0.context.is_empty() {
            writeln!(f, "\n\nContext:")?;
            for (i, (context, location)) in self.0.context.iter().enumerate() {
                for (j, line) in context.split('\n').enumerate() {
                    if j == 0 {
                        write!(f, "{: >5}: ", i)?;
                    } else {
                        f.write_str("\n       ")?;
                    }
                    f.write_str(line)?;
                }
                writeln!(f, " at {}:{}", location.file(), location.line())?;
            }
        }

        if let Some(ref source) = self.0.source {
            writeln!(f, "\n\nCaused by:")?;
            let mut index = 0;
            let mut source: Option<&dyn std::error::Error> = Some(source.as_ref());
            while let Some(e) = source {
                for (i, line) in e.to_string().split('\n').enumerate() {
                    if i == 0 {
                        write!(f, "{: >5}: ", index)?;
                    } else {
                        f.write_str("\n       ")?;
                    }
                    f.write_str(line)?;
                }
                f.write_char('\n')?;
                source = e.source();
                index += 1;
            }
        }
        Ok(())
    }
}
