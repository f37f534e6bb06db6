use crate::signal::CompletionSignal;
use async_trait::async_trait;
use msggen_core::settings::config_schema;
use msggen_core::{
    ConfigError, ConfigMap, ConfigOption, IngestionError, Input, Record, Settings, Sink,
};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use tracing::{debug, info, warn};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle state of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputState {
    /// Constructed, `start` not called yet
    Idle,
    /// Inside the production loop
    Running,
    /// Loop exited and waiters released
    Stopped,
}

impl std::fmt::Display for InputState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputState::Idle => write!(f, "idle"),
            InputState::Running => write!(f, "running"),
            InputState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Input that produces a bounded sequence of labeled messages
///
/// Each record is `"{prefix} {index} of {count}"` with the index label
/// centered in 20 columns. Production runs until `count` records have been
/// pushed or a stop is requested, whichever comes first.
#[derive(Debug)]
pub struct GeneratorInput {
    settings: Settings,
    stopped: AtomicBool,
    state: AtomicU8,
    done: CompletionSignal,
}

impl GeneratorInput {
    pub const NAME: &'static str = "generator";

    /// Validate `config` and create an idle generator
    pub fn new(config: &ConfigMap) -> Result<Self, ConfigError> {
        let settings = Settings::from_map(config)?;
        Ok(Self::with_settings(settings))
    }

    /// Create an idle generator from already validated settings
    pub fn with_settings(settings: Settings) -> Self {
        debug!(
            input = Self::NAME,
            count = settings.count,
            prefix = %settings.prefix,
            "Created input"
        );
        Self {
            settings,
            stopped: AtomicBool::new(false),
            state: AtomicU8::new(IDLE),
            done: CompletionSignal::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> InputState {
        match self.state.load(Ordering::Acquire) {
            IDLE => InputState::Idle,
            RUNNING => InputState::Running,
            _ => InputState::Stopped,
        }
    }

    /// Whether a stop has been requested or the loop has exited
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    async fn run(&self, sink: &mut dyn Sink) -> Result<u64, IngestionError> {
        if let Err(state) =
            self.state
                .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            warn!(input = Self::NAME, state = state, "Start called more than once");
            return Err(IngestionError::AlreadyStarted);
        }

        // Drops on every exit path, including panics and cancellation
        let _finish = FinishGuard { input: self };

        let count = self.settings.count;
        info!(input = Self::NAME, count = count, "Starting input");

        let mut index: u64 = 0;
        while !self.is_stopped() && index < count {
            index += 1;
            let record = Record::sequenced(&self.settings.prefix, index, count);
            debug!(index = index, "Pushing record");

            if let Err(e) = sink.push(record).await {
                warn!(input = Self::NAME, index = index, error = %e, "Sink rejected record");
                return Err(e);
            }
        }

        if index < count {
            info!(input = Self::NAME, pushed = index, "Input stopped on request");
        } else {
            info!(input = Self::NAME, pushed = index, "Input exhausted");
        }

        Ok(index)
    }
}

/// Marks the input stopped and releases waiters when dropped
struct FinishGuard<'a> {
    input: &'a GeneratorInput,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.input.stopped.store(true, Ordering::Release);
        self.input.state.store(STOPPED, Ordering::Release);
        if self.input.done.release() {
            debug!(input = GeneratorInput::NAME, "Released stop waiters");
        }
    }
}

#[async_trait]
impl Input for GeneratorInput {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn start(&self, sink: &mut dyn Sink) -> Result<u64, IngestionError> {
        self.run(sink).await
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    async fn await_stop(&self) {
        self.done.wait().await;
    }

    fn config_schema(&self) -> Vec<ConfigOption> {
        config_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msggen_core::center;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn input(config: serde_json::Value) -> GeneratorInput {
        match config {
            serde_json::Value::Object(map) => GeneratorInput::new(&map).unwrap(),
            _ => panic!("expected an object"),
        }
    }

    async fn assert_released(input: &GeneratorInput) {
        tokio::time::timeout(Duration::from_secs(1), input.await_stop())
            .await
            .expect("await_stop should return once the loop has exited");
    }

    /// Requests a stop on its own input once it has seen `after` records
    struct StoppingSink {
        input: Arc<GeneratorInput>,
        after: usize,
        records: Vec<Record>,
    }

    #[async_trait]
    impl Sink for StoppingSink {
        async fn push(&mut self, record: Record) -> Result<(), IngestionError> {
            self.records.push(record);
            if self.records.len() == self.after {
                self.input.stop();
            }
            Ok(())
        }
    }

    /// Accepts `ok` records, then fails
    struct FailingSink {
        ok: usize,
        seen: usize,
    }

    #[async_trait]
    impl Sink for FailingSink {
        async fn push(&mut self, _record: Record) -> Result<(), IngestionError> {
            if self.seen == self.ok {
                return Err(IngestionError::Sink("queue full".to_string()));
            }
            self.seen += 1;
            Ok(())
        }
    }

    struct PanickingSink;

    #[async_trait]
    impl Sink for PanickingSink {
        async fn push(&mut self, _record: Record) -> Result<(), IngestionError> {
            panic!("sink exploded");
        }
    }

    #[tokio::test]
    async fn test_pushes_all_records_in_order() {
        let input = input(json!({ "count": 5, "prefix": "This is message" }));
        let mut sink: Vec<Record> = Vec::new();

        let pushed = input.start(&mut sink).await.unwrap();

        assert_eq!(pushed, 5);
        assert_eq!(sink.len(), 5);
        for (k, record) in sink.iter().enumerate() {
            let expected = format!("This is message {}", center(&format!("{} of 5", k + 1), 20));
            assert_eq!(record.text(), Some(expected.as_str()));
        }

        let third = format!("This is message {}3 of 5{}", " ".repeat(7), " ".repeat(7));
        assert_eq!(sink[2].text(), Some(third.as_str()));
        assert_eq!(input.state(), InputState::Stopped);
        assert!(input.is_stopped());
        assert_released(&input).await;
    }

    #[tokio::test]
    async fn test_defaults_produce_three_messages() {
        let input = input(json!({}));
        let mut sink: Vec<Record> = Vec::new();

        input.start(&mut sink).await.unwrap();

        let texts: Vec<_> = sink.iter().filter_map(Record::text).collect();
        assert_eq!(
            texts,
            vec![
                format!("message {}", center("1 of 3", 20)),
                format!("message {}", center("2 of 3", 20)),
                format!("message {}", center("3 of 3", 20)),
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_count_releases_immediately() {
        let input = input(json!({ "count": 0 }));
        let mut sink: Vec<Record> = Vec::new();

        assert_eq!(input.start(&mut sink).await.unwrap(), 0);
        assert!(sink.is_empty());
        assert_released(&input).await;
    }

    #[test]
    fn test_wrong_typed_count_fails_construction() {
        let config = json!({ "count": "three" });
        let err = GeneratorInput::new(config.as_object().unwrap()).unwrap_err();
        assert_eq!(err.option(), Some("count"));
    }

    #[tokio::test]
    async fn test_stop_after_two_records() {
        let input = Arc::new(input(json!({ "count": 10 })));
        let mut sink = StoppingSink {
            input: input.clone(),
            after: 2,
            records: Vec::new(),
        };

        let pushed = input.start(&mut sink).await.unwrap();

        assert!(pushed <= 3);
        assert_eq!(sink.records.len() as u64, pushed);
        assert_released(&input).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_from_another_task() {
        let input = Arc::new(input(json!({ "count": 1_000_000 })));
        let (mut sender, mut receiver) = mpsc::channel(1);

        let producer = {
            let input = input.clone();
            tokio::spawn(async move { input.start(&mut sender).await })
        };

        receiver.recv().await.unwrap();
        receiver.recv().await.unwrap();
        input.stop();

        let mut received = 2;
        while receiver.recv().await.is_some() {
            received += 1;
        }

        let pushed = producer.await.unwrap().unwrap();
        assert_eq!(pushed, received);
        assert!(pushed <= 4);
        assert_released(&input).await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_valid_before_start() {
        let input = input(json!({ "count": 4 }));
        input.stop();
        input.stop();
        assert_eq!(input.state(), InputState::Idle);

        let mut sink: Vec<Record> = Vec::new();
        assert_eq!(input.start(&mut sink).await.unwrap(), 0);
        assert!(sink.is_empty());

        input.stop();
        assert_eq!(input.state(), InputState::Stopped);
        assert_released(&input).await;
    }

    #[tokio::test]
    async fn test_second_start_is_rejected() {
        let input = input(json!({ "count": 2 }));
        let mut first: Vec<Record> = Vec::new();
        input.start(&mut first).await.unwrap();

        let mut second: Vec<Record> = Vec::new();
        let err = input.start(&mut second).await.unwrap_err();

        assert!(matches!(err, IngestionError::AlreadyStarted));
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_propagates_and_releases() {
        let input = input(json!({ "count": 5 }));
        let mut sink = FailingSink { ok: 1, seen: 0 };

        let err = input.start(&mut sink).await.unwrap_err();

        assert!(matches!(err, IngestionError::Sink(_)));
        assert_eq!(sink.seen, 1);
        assert!(input.is_stopped());
        assert_eq!(input.state(), InputState::Stopped);
        assert_released(&input).await;
    }

    #[tokio::test]
    async fn test_panicking_sink_still_releases() {
        let input = Arc::new(input(json!({ "count": 3 })));

        let producer = {
            let input = input.clone();
            tokio::spawn(async move { input.start(&mut PanickingSink).await })
        };

        assert!(producer.await.unwrap_err().is_panic());
        assert!(input.is_stopped());
        assert_released(&input).await;
    }

    #[tokio::test]
    async fn test_cancelled_start_releases() {
        let input = input(json!({ "count": 5 }));
        let (mut sender, _receiver) = mpsc::channel(1);

        // Second push waits for capacity forever
        let run = tokio::time::timeout(Duration::from_millis(50), input.start(&mut sender)).await;

        assert!(run.is_err());
        assert_eq!(input.state(), InputState::Stopped);
        assert_released(&input).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_waiters_unblock_when_run_finishes() {
        let input = Arc::new(input(json!({ "count": 3 })));

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let input = input.clone();
                tokio::spawn(async move { input.await_stop().await })
            })
            .collect();

        let mut sink: Vec<Record> = Vec::new();
        input.start(&mut sink).await.unwrap();

        for waiter in waiters {
            tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .expect("waiter should wake")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_await_stop_until_interrupted() {
        let input = input(json!({}));

        let err = input
            .await_stop_until(Box::pin(async {}))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestionError::Interrupted));
        assert_eq!(input.state(), InputState::Idle);
    }

    #[tokio::test]
    async fn test_await_stop_until_prefers_completion() {
        let input = input(json!({ "count": 1 }));
        let mut sink: Vec<Record> = Vec::new();
        input.start(&mut sink).await.unwrap();

        input.await_stop_until(Box::pin(async {})).await.unwrap();
    }

    #[test]
    fn test_config_schema_lists_every_option() {
        let input = input(json!({}));
        let names: Vec<_> = input.config_schema().iter().map(|o| o.name).collect();
        assert_eq!(names, vec!["count", "prefix"]);
        assert_eq!(input.name(), "generator");
    }
}
