//! Recording engine: captures user interactions reported by capture shims
//! into an ordered action trace, keeps the trace durable across page
//! reloads, and exports it as a JSON artifact on request.

pub mod config;
pub mod dispatcher;
pub mod export;
pub mod persist;
pub mod recorder;
pub mod selector;
pub mod store;

// Re-export the shared protocol types so hosts depend on one crate.
pub use spoor_common::action;
pub use spoor_common::protocol;
pub use spoor_common::state;
