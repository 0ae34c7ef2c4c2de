//! Instance discovery subsystem.
//!
//! # Data Flow
//! ```text
//! resolve(context_id)
//!     → directory.rs ("local": parse serverLists)
//!     → directory.rs (otherwise: cache.rs hit, or registry.rs lookup + watch)
//!     → Vec<Upstream>
//!
//! Registry push (registry thread):
//!     → watcher closure
//!     → cache.rs (replace the context id's list wholesale)
//! ```

mod cache;
pub mod directory;
pub mod instance;
pub mod registry;

pub use directory::InstanceDirectory;
pub use instance::InstanceRecord;
pub use registry::{InstanceRegistry, InstanceWatcher, MemoryRegistry};
