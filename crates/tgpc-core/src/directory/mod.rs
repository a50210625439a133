//! Remote directory abstraction (contact import/delete, username resolution).

#[cfg(test)]
pub(crate) mod fake;
pub mod port;
pub mod throttled;

pub use port::Directory;
pub use throttled::ThrottledDirectory;
