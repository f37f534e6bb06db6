//! msggen Output
//!
//! Record writers for the msggen host.

pub mod stdout;

pub use stdout::{OutputFormat, StdoutWriter};
