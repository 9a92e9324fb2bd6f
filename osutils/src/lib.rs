pub mod chroot;
pub mod dependencies;
pub mod exe;
pub mod files;
pub mod mkinitcpio;
pub mod path;

#[cfg(any(test, feature = "test-utilities"))]
pub mod testutils;
