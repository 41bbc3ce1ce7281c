//! Configuration and logging shared by the command line host.

pub mod config;
pub mod logging;
