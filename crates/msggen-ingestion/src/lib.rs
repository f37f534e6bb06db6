//! msggen Ingestion
//!
//! The lifecycle-managed generator input and the primitives it is built on.

pub mod generator;
pub mod signal;

pub use generator::{GeneratorInput, InputState};
pub use signal::CompletionSignal;

use msggen_core::Record;
use tokio::sync::mpsc;

/// Default channel buffer size for records
pub const DEFAULT_CHANNEL_SIZE: usize = 1024;

/// Create a new channel for records
///
/// The sender half is a ready-made `Sink` for `Input::start`.
pub fn create_record_channel(buffer_size: usize) -> (mpsc::Sender<Record>, mpsc::Receiver<Record>) {
    mpsc::channel(buffer_size.max(1))
}
