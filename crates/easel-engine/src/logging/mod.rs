//! Logging utilities.
//!
//! The engine only talks to the `log` facade. Hosts that want the bundled
//! `env_logger` setup call [`init_logging`] once at startup.

mod init;

pub use init::{init_logging, LoggingConfig};
