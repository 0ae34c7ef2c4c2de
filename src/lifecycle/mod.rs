//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build dispatcher → Start workers → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → listener stops accepting → workers exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
