use const_format::formatcp;

// Configuration constants

/// Default location of the configuration document.
pub const CONFIG_PATH_DEFAULT: &str = "config.json";

/// Sentinel size of a logical volume that takes all remaining free space in
/// its volume group.
pub const LOGICAL_VOLUME_SIZE_ALL_FREE: &str = "100%FREE";

/// Primary group assigned to users that don't specify one.
pub const DEFAULT_PRIMARY_GROUP: &str = "users";

/// Group granted full sudo privileges.
pub const SUDO_GROUP: &str = "wheel";

/// Rule written to the sudoers drop-in.
pub const SUDOERS_RULE: &str = formatcp!("%{SUDO_GROUP} ALL=(ALL) ALL");

// Block of target root path constants

/// Default mount point of the target root.
pub const TARGET_ROOT_PATH_DEFAULT: &str = "/mnt";

/// etc directory name.
pub const ETC_DIRECTORY: &str = "etc";

/// Hostname file, relative to the target root.
pub const HOSTNAME_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/hostname");

/// Locale configuration file, relative to the target root.
pub const LOCALE_CONF_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/locale.conf");

/// Global environment file, relative to the target root.
pub const ENVIRONMENT_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/environment");

/// Hosts file, relative to the target root.
pub const HOSTS_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/hosts");

/// Filesystem table, relative to the target root.
pub const FSTAB_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/fstab");

/// Sudoers drop-in directory, relative to the target root.
pub const SUDOERS_DIRECTORY_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/sudoers.d");

/// Sudoers drop-in file, relative to the target root.
pub const SUDOERS_DROP_IN_RELATIVE_PATH: &str =
    formatcp!("{SUDOERS_DIRECTORY_RELATIVE_PATH}/{SUDO_GROUP}-password");

/// mkinitcpio configuration, relative to the target root.
pub const MKINITCPIO_CONF_RELATIVE_PATH: &str = formatcp!("{ETC_DIRECTORY}/mkinitcpio.conf");

// Block of paths as seen from inside the target root

/// Locale generation template.
pub const LOCALE_GEN_PATH: &str = "/etc/locale.gen";

/// Local time symlink.
pub const LOCALTIME_PATH: &str = "/etc/localtime";

/// Directory holding the time zone database.
pub const ZONEINFO_DIRECTORY: &str = "/usr/share/zoneinfo";

// Block of boot constants

/// Base initrd image referenced by every boot entry.
pub const BASE_INITRD_IMAGE: &str = "initramfs-linux.img";

/// mkinitcpio preset used to regenerate the initrd.
pub const MKINITCPIO_PRESET: &str = "linux";

/// Initrd hook that activates LVM volume groups at boot.
pub const LVM_INITRD_HOOK: &str = "lvm2";

/// Initrd hook that mounts the root filesystem. The LVM hook must come before it.
pub const FILESYSTEMS_INITRD_HOOK: &str = "filesystems";
