use crate::error::IngestionError;
use crate::record::Record;
use crate::settings::ConfigOption;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

/// Downstream queue an input pushes records into
///
/// Only the input's own task ever calls `push`. A failed push ends the
/// current run of the input; it is not retried.
#[async_trait]
pub trait Sink: Send {
    /// Accept one record
    async fn push(&mut self, record: Record) -> Result<(), IngestionError>;
}

/// Collects records in memory
///
/// Useful for tests and for hosts that batch the whole run
#[async_trait]
impl Sink for Vec<Record> {
    async fn push(&mut self, record: Record) -> Result<(), IngestionError> {
        Vec::push(self, record);
        Ok(())
    }
}

/// Forwards records over a bounded channel, waiting for capacity
#[async_trait]
impl Sink for mpsc::Sender<Record> {
    async fn push(&mut self, record: Record) -> Result<(), IngestionError> {
        self.send(record)
            .await
            .map_err(|_| IngestionError::ChannelClosed)
    }
}

/// Future a host resolves to interrupt a wait
pub type Interrupt<'a> = Pin<Box<dyn Future<Output = ()> + Send + 'a>>;

/// Lifecycle contract for inputs in the msggen pipeline
///
/// `start` runs the production loop on the caller's task. `stop` and
/// `await_stop` are meant to be called from other tasks while it runs.
#[async_trait]
pub trait Input: Send + Sync {
    /// Returns the name of the input (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Produce records into `sink` until exhausted or stopped
    ///
    /// Returns the number of records pushed.
    async fn start(&self, sink: &mut dyn Sink) -> Result<u64, IngestionError>;

    /// Request a cooperative stop. Never blocks.
    fn stop(&self);

    /// Wait until the production loop has fully exited
    async fn await_stop(&self);

    /// Like `await_stop`, but gives up with `IngestionError::Interrupted`
    /// as soon as `interrupt` resolves
    async fn await_stop_until(&self, interrupt: Interrupt<'_>) -> Result<(), IngestionError> {
        tokio::select! {
            biased;
            _ = self.await_stop() => Ok(()),
            _ = interrupt => Err(IngestionError::Interrupted),
        }
    }

    /// Declared configuration options with their defaults
    fn config_schema(&self) -> Vec<ConfigOption>;
}
