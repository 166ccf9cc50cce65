//! This crate implements functionality around simulation configuration:
//!
//! * Loading of the configuration from a YAML file.
//!
//! * Parsing, validation and configuration provisioning.

mod conf;
mod io;
mod persisted;

pub use conf::*;
pub use io::load_conf;
