//! Logging utilities.
//!
//! Every module logs through the `log` facade; this module only installs the
//! `env_logger` backend once, early in `main`.

mod init;

pub use init::{LoggingConfig, init_logging};
