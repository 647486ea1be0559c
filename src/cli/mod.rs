//! Codex invocation: parameters, argument construction, process control
//! and stream parsing.

mod args;
mod events;
mod params;
mod process;
mod stream;

pub use args::*;
pub use events::*;
pub use params::*;
pub use process::*;
pub use stream::*;
