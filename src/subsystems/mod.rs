pub mod initrd;
pub mod osconfig;
