use tokio::sync::watch;

/// One-shot broadcast gate
///
/// Armed at construction and released at most once. Any number of tasks
/// may wait on it concurrently; all of them wake when it is released, and
/// waits that begin afterwards return immediately.
#[derive(Debug)]
pub struct CompletionSignal {
    released: watch::Sender<bool>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        let (released, _) = watch::channel(false);
        Self { released }
    }

    /// Open the gate
    ///
    /// Returns `true` only for the call that actually released it.
    pub fn release(&self) -> bool {
        self.released.send_if_modified(|released| {
            if *released {
                false
            } else {
                *released = true;
                true
            }
        })
    }

    pub fn is_released(&self) -> bool {
        *self.released.borrow()
    }

    /// Wait until the gate has been released
    pub async fn wait(&self) {
        let mut receiver = self.released.subscribe();
        // The sender lives in `self`, so this can only end by release
        let _ = receiver.wait_for(|released| *released).await;
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
