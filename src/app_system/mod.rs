//! System orchestration, configuration, startup, and shutdown logic.

pub mod config;
pub mod machine_system;
pub mod tracing;

pub use self::config::*;
pub use self::machine_system::*;
pub use self::tracing::*;
