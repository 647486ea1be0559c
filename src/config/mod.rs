//! Configuration module.

mod loader;
mod timeout;
mod types;

pub use loader::*;
pub use timeout::*;
pub use types::*;
