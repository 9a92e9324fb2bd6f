use log::info;

use anchor_api::{constants::HOSTNAME_RELATIVE_PATH, error::AnchorError};
use osutils::files;

use crate::engine::InstallContext;

pub(super) fn set_up_hostname(ctx: &InstallContext, hostname: &str) -> Result<(), AnchorError> {
    info!("Setting hostname to '{hostname}'");
    files::create_new_file(
        ctx.target_path(HOSTNAME_RELATIVE_PATH),
        format!("{hostname}\n").as_bytes(),
    )
}
