use std::path::{Path, PathBuf};

use anchor_api::config::Configuration;
use osutils::{chroot::Chroot, exe::CommandRunner, path::join_relative};

/// Everything a stage needs to do its work: the configuration, where the new
/// system is being assembled, and how to run commands.
pub struct InstallContext<'a> {
    pub config: &'a Configuration,

    /// Mount point of the target root on the installer host.
    pub target_root: PathBuf,

    pub runner: &'a dyn CommandRunner,
}

impl<'a> InstallContext<'a> {
    pub fn new(
        config: &'a Configuration,
        target_root: impl Into<PathBuf>,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            config,
            target_root: target_root.into(),
            runner,
        }
    }

    /// Returns a chroot that runs commands inside the target root.
    pub fn chroot(&self) -> Chroot<'a> {
        Chroot::new(&self.target_root, self.runner)
    }

    /// Resolves a path inside the target root to a path on the host.
    pub fn target_path(&self, path: impl AsRef<Path>) -> PathBuf {
        join_relative(&self.target_root, path)
    }
}

#[cfg(test)]
mod tests {
    use osutils::testutils::MockRunner;

    use super::*;

    #[test]
    fn test_target_path() {
        let config = Configuration::default();
        let runner = MockRunner::new();
        let ctx = InstallContext::new(&config, "/mnt", &runner);
        assert_eq!(ctx.target_path("etc/hostname"), Path::new("/mnt/etc/hostname"));
        assert_eq!(
            ctx.target_path("/boot/loader/entries/arch.conf"),
            Path::new("/mnt/boot/loader/entries/arch.conf")
        );
        assert_eq!(ctx.chroot().root(), Path::new("/mnt"));
    }
}
