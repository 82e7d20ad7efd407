pub mod logging;

pub use logging::{MemoryLogger, StdoutLogger, init_stdout_logger};

// Re-export log crate so downstream crates can use base::log::*
pub use log;
