//! Core logic for the Telegram account probe.
//!
//! This crate is framework-agnostic: the MTProto client lives behind the
//! [`directory::Directory`] port, implemented in the `tgpc-telegram` adapter crate.

pub mod batch;
pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod lookup;
pub mod output;
pub mod result;
pub mod status;

pub use errors::{Error, Result};
