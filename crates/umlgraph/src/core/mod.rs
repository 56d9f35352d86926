//! Core abstractions shared by every layer
//!
//! Value types, the error type, the layout trait and logging setup live here;
//! the model, store, analyzer and layout engines build on top of them.

mod error;
mod layout;
pub mod logging;
mod types;

pub use error::*;
pub use layout::*;
pub use logging::*;
pub use types::*;
