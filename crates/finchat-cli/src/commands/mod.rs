//! Command implementations.

pub mod ask;
pub mod config;
pub mod registry;

pub use self::ask::{execute_ask, execute_list, render_answer};
pub use self::config::execute_config;
pub use self::registry::{execute_lookup, execute_registry_ask, render_registry_answer};
