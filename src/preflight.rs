use std::collections::BTreeSet;

use log::{debug, info, warn};

use anchor_api::{config::Configuration, error::AnchorError};
use osutils::dependencies::{self, Dependency};

use crate::engine;

/// Host tools needed by the stages the configuration enables. Tools that run
/// through `arch-chroot` come from the target root and are not listed.
pub fn required_dependencies(config: &Configuration) -> BTreeSet<Dependency> {
    engine::stages()
        .iter()
        .filter(|stage| stage.is_configured(config))
        .flat_map(|stage| stage.dependencies(config))
        .collect()
}

/// Fails with `MissingDependencies` before anything touches the disks if a
/// required host tool cannot be found.
pub fn check_dependencies(config: &Configuration) -> Result<(), AnchorError> {
    let required = required_dependencies(config);
    debug!(
        "Checking for host dependencies: {}",
        required
            .iter()
            .map(Dependency::name)
            .collect::<Vec<_>>()
            .join(", ")
    );
    dependencies::check_present(&required)
}

/// Logs whether each required host tool is present, then fails like
/// [`check_dependencies`] if any is missing.
pub fn report_dependencies(config: &Configuration) -> Result<(), AnchorError> {
    for dependency in required_dependencies(config) {
        match dependency.path() {
            Ok(path) => info!("{dependency}: found at '{}'", path.display()),
            Err(_) => warn!("{dependency}: missing"),
        }
    }
    check_dependencies(config)
}
