use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind as IoErrorKind, Write},
    path::Path,
};

use anyhow::{Context, Error};
use log::trace;

use anchor_api::error::{AnchorError, ReportError, TargetConfigurationError};

/// Creates all directories in a path if they don't exist
pub fn create_dirs<S>(path: S) -> Result<(), Error>
where
    S: AsRef<Path>,
{
    std::fs::create_dir_all(path.as_ref()).context(format!(
        "Could not create path: {}",
        path.as_ref().display()
    ))
}

fn write_error(path: &Path) -> TargetConfigurationError {
    TargetConfigurationError::WriteFile {
        path: path.display().to_string(),
    }
}

/// Creates a new file with the given contents, creating parent directories
/// as needed. Fails with `AlreadyConfigured` if the file already exists.
pub fn create_new_file<S>(path: S, contents: &[u8]) -> Result<(), AnchorError>
where
    S: AsRef<Path>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        create_dirs(parent).structured(write_error(path))?;
    }

    trace!("Creating '{}'", path.display());
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == IoErrorKind::AlreadyExists => {
            return Err(AnchorError::with_source(
                TargetConfigurationError::AlreadyConfigured {
                    path: path.display().to_string(),
                },
                e.into(),
            ));
        }
        Err(e) => return Err(AnchorError::with_source(write_error(path), e.into())),
    };

    file.write_all(contents).structured(write_error(path))
}

/// Appends to a file, creating it if it doesn't exist.
pub fn append_file<S>(path: S, contents: &[u8]) -> Result<(), AnchorError>
where
    S: AsRef<Path>,
{
    let path = path.as_ref();
    trace!("Appending to '{}'", path.display());
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .and_then(|mut file| file.write_all(contents))
        .structured(write_error(path))
}

/// Reads the content of a file
pub fn read_file<S>(path: S) -> Result<String, AnchorError>
where
    S: AsRef<Path>,
{
    let path = path.as_ref();
    std::fs::read_to_string(path).structured(TargetConfigurationError::ReadFile {
        path: path.display().to_string(),
    })
}

/// Replaces the contents of an existing file.
pub fn rewrite_file<S>(path: S, contents: &[u8]) -> Result<(), AnchorError>
where
    S: AsRef<Path>,
{
    let path = path.as_ref();
    trace!("Rewriting '{}'", path.display());
    File::create(path)
        .and_then(|mut file| file.write_all(contents))
        .structured(write_error(path))
}

/// Joins lines with newlines, terminating the last one.
pub fn lines_to_content<S>(lines: &[S]) -> String
where
    S: AsRef<str>,
{
    lines.iter().fold(String::new(), |mut content, line| {
        content.push_str(line.as_ref());
        content.push('\n');
        content
    })
}
