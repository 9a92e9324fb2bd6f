pub mod config;
pub mod constants;
pub mod error;

/// Returns true when the value is equal to its type's default. Used to skip
/// serializing fields that were not set.
pub(crate) fn is_default<T: Default + PartialEq>(t: &T) -> bool {
    t == &T::default()
}
