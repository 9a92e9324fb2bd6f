use log::info;

use anchor_api::{
    config::BootEntry,
    constants::BASE_INITRD_IMAGE,
    error::{AnchorError, AnchorResultExt},
};
use osutils::{dependencies::Dependency, files};

use crate::engine::InstallContext;

/// Installs systemd-boot to the ESP and writes the loader entry.
pub fn install(ctx: &InstallContext, entry: &BootEntry) -> Result<(), AnchorError> {
    info!("Installing systemd-boot");
    ctx.chroot()
        .run(&Dependency::Bootctl.cmd().with_arg("install"))?;

    info!("Writing boot entry '{}'", entry.path);
    files::create_new_file(ctx.target_path(&entry.path), render_entry(entry).as_bytes())
        .message("Failed to write boot entry")
}

/// Renders a loader entry file.
fn render_entry(entry: &BootEntry) -> String {
    let mut lines = vec![
        format!("title {}", entry.title),
        format!("linux /{}", entry.kernel),
    ];
    if let Some(ucode) = &entry.ucode {
        lines.push(format!("initrd /{ucode}"));
    }
    lines.push(format!("initrd /{BASE_INITRD_IMAGE}"));

    let mut options = format!("options root={}", entry.root.path);
    for option in &entry.options {
        options.push(' ');
        options.push_str(option);
    }
    lines.push(options);

    files::lines_to_content(&lines)
}
