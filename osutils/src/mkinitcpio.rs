use std::{borrow::Cow, path::Path};

use anyhow::{bail, Error};
use log::debug;
use regex::{Captures, Regex};

use anchor_api::{
    constants::MKINITCPIO_PRESET,
    error::{AnchorError, ReportError, TargetConfigurationError},
};

use crate::{chroot::Chroot, dependencies::Dependency, files};

/// Inserts `hook` into the active `HOOKS=(...)` array of an mkinitcpio
/// configuration, right before `before` when that hook is present and at the
/// end otherwise. Returns the configuration untouched if `hook` is already
/// listed.
pub fn add_hook<'a>(config: &'a str, hook: &str, before: &str) -> Result<Cow<'a, str>, Error> {
    let re = Regex::new(r"(?m)^HOOKS=\(([^)]*)\)")?;
    let Some(captures) = re.captures(config) else {
        bail!("No HOOKS array found in mkinitcpio configuration");
    };

    if captures[1].split_whitespace().any(|existing| existing == hook) {
        debug!("Initrd hook '{hook}' is already enabled");
        return Ok(Cow::Borrowed(config));
    }

    Ok(re.replace(config, |captures: &Captures| {
        let mut hooks = captures[1].split_whitespace().collect::<Vec<_>>();
        match hooks.iter().position(|existing| *existing == before) {
            Some(index) => hooks.insert(index, hook),
            None => hooks.push(hook),
        }
        format!("HOOKS=({})", hooks.join(" "))
    }))
}

/// Applies [`add_hook`] to the configuration file at `path` in place.
pub fn add_hook_to_file(path: &Path, hook: &str, before: &str) -> Result<(), AnchorError> {
    let config = files::read_file(path)?;
    let updated = add_hook(&config, hook, before).structured(
        TargetConfigurationError::WriteFile {
            path: path.display().to_string(),
        },
    )?;

    if let Cow::Owned(updated) = updated {
        files::rewrite_file(path, updated.as_bytes())?;
    }
    Ok(())
}

/// Regenerates the initrd images of the default preset inside the target
/// root.
pub fn regenerate(chroot: &Chroot) -> Result<(), AnchorError> {
    chroot.run(
        &Dependency::Mkinitcpio
            .cmd()
            .with_args(["-p", MKINITCPIO_PRESET]),
    )
}
