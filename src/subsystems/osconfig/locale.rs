use log::info;

use anchor_api::{
    constants::{LOCALE_CONF_RELATIVE_PATH, LOCALE_GEN_PATH},
    error::{AnchorError, InternalError, ReportError},
};
use osutils::{dependencies::Dependency, files};

use crate::engine::InstallContext;

/// Enables and generates every locale, then makes the first one the default.
pub(super) fn set_up_locales(ctx: &InstallContext, locales: &[String]) -> Result<(), AnchorError> {
    let chroot = ctx.chroot();
    for locale in locales {
        info!("Generating locale '{locale}'");
        chroot.run(&Dependency::Sed.cmd().with_args([
            "-i".to_string(),
            format!("s/#{locale}/{locale}/"),
            LOCALE_GEN_PATH.to_string(),
        ]))?;
        chroot.run(&Dependency::LocaleGen.cmd())?;
    }

    let default = locales
        .first()
        .structured(InternalError::Internal("No locale to use as default"))?;
    info!("Setting default locale to '{default}'");
    files::create_new_file(
        ctx.target_path(LOCALE_CONF_RELATIVE_PATH),
        format!("LANG={default}\n").as_bytes(),
    )
}

#[cfg(test)]
mod tests {
    use anchor_api::{
        config::Configuration,
        error::{ChrootError, ErrorKind, TargetConfigurationError},
    };
    use osutils::testutils::MockRunner;

    use super::*;

    #[test]
    fn test_set_up_locales() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("etc")).unwrap();
        let config = Configuration::default();
        let runner = MockRunner::new();
        let ctx = InstallContext::new(&config, dir.path(), &runner);
        let root = dir.path().display();

        set_up_locales(&ctx, &["en_US.UTF-8".into(), "fr_FR.UTF-8".into()]).unwrap();
        assert_eq!(
            runner.invocations(),
            vec![
                format!("arch-chroot {root} sed -i s/#en_US.UTF-8/en_US.UTF-8/ /etc/locale.gen"),
                format!("arch-chroot {root} locale-gen"),
                format!("arch-chroot {root} sed -i s/#fr_FR.UTF-8/fr_FR.UTF-8/ /etc/locale.gen"),
                format!("arch-chroot {root} locale-gen"),
            ]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("etc/locale.conf")).unwrap(),
            "LANG=en_US.UTF-8\n"
        );
    }

    #[test]
    fn test_rerun_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("etc")).unwrap();
        let config = Configuration::default();
        let runner = MockRunner::new();
        let ctx = InstallContext::new(&config, dir.path(), &runner);
        let locale_conf = dir.path().join("etc/locale.conf");

        set_up_locales(&ctx, &["en_US.UTF-8".into()]).unwrap();
        let error = set_up_locales(&ctx, &["de_DE.UTF-8".into()]).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::TargetConfiguration(TargetConfigurationError::AlreadyConfigured {
                path: locale_conf.display().to_string()
            })
        );
        assert_eq!(
            std::fs::read_to_string(&locale_conf).unwrap(),
            "LANG=en_US.UTF-8\n"
        );
    }

    #[test]
    fn test_locale_gen_failure() {
        let config = Configuration::default();
        let runner = MockRunner::new().failing_on("locale-gen");
        let ctx = InstallContext::new(&config, "/mnt", &runner);

        let error = set_up_locales(&ctx, &["en_US.UTF-8".into()]).unwrap_err();
        assert_eq!(
            error.kind(),
            &ErrorKind::Chroot(ChrootError::Command {
                command: "arch-chroot /mnt locale-gen".into()
            })
        );
        assert_eq!(runner.invocations().len(), 2);
    }
}
