mod setup;

pub use crate::setup::{init, log_file_name, LogHandle};
