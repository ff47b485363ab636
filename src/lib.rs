//! Message template manager library
//!
//! An observable template store persisted to a key-value slot, plus the
//! terminal views and CLI that drive it.

mod cli;
mod config;
mod debounce;
mod emitter;
mod errors;
mod helper;
mod remote;
mod search;
mod storage;
mod store;
mod template;
mod types;
mod views;

// Re-export key components
pub use cli::*;
pub use config::*;
pub use debounce::*;
pub use emitter::*;
pub use errors::*;
pub use helper::*;
pub use remote::*;
pub use search::*;
pub use storage::*;
pub use store::*;
pub use template::*;
pub use types::*;
pub use views::*;
