//! System-level modules
//!
//! - Logging initialization
//! - Panic handling (terminal restore + crash log)

pub mod logging;
pub mod panic_handler;

pub use logging::init_logging;
pub use panic_handler::install_panic_hook;
