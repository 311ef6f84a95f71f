//! Logging utilities.
//!
//! Centralizes logger initialization for hosts that don't bring their own.
//! The crate itself only depends on the `log` facade.

mod init;

pub use init::{LoggingConfig, init_logging};
