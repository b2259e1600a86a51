use std::time::Duration;

use tokio::{sync::mpsc, task::JoinHandle, time::sleep};

/// Emits the most recent input value once no newer value has arrived for the
/// configured delay. Every new input restarts the timer and replaces any
/// pending emission; dropping the handle cancels whatever is still pending.
/// Used to hold back search re-fetches while the user is still typing.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Returns the debouncer and the channel on which stabilized values arrive.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, mut raw) = mpsc::unbounded_channel::<T>();
        let (stabilized, output) = mpsc::unbounded_channel();

        let worker = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            loop {
                tokio::select! {
                    received = raw.recv() => match received {
                        Some(value) => pending = Some(value),
                        None => break,
                    },
                    // Recreated on every new input, which is what restarts
                    // the timer.
                    _ = sleep(delay), if pending.is_some() => {
                        if let Some(value) = pending.take() {
                            if stabilized.send(value).is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        });

        (Self { input, worker }, output)
    }

    /// Feeds a new raw value. Returns false once the output side is gone.
    pub fn update(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
