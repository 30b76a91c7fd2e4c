// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod cli;
#[allow(clippy::module_inception)]
pub mod config;
pub mod logging;
pub mod session;
pub mod store;

pub use cli::Cli;
pub use config::*;
pub use logging::*;
pub use session::*;
pub use store::*;
