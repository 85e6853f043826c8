//! Quiescence-window debouncer.

use std::pin::pin;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};

/// Emits the latest pushed value once input has been quiet for `delay`.
///
/// Every push restarts the window and intermediate values are dropped.
/// Dropping the debouncer aborts the timer task; a pending value is
/// never emitted after that.
#[derive(Debug)]
pub struct Debouncer {
    /// Raw input side.
    input: UnboundedSender<String>,
    /// Timer task.
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Spawns the timer task and returns the debouncer with its output.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(delay: Duration) -> (Self, UnboundedReceiver<String>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(delay, input_rx, output_tx));

        (
            Self {
                input: input_tx,
                task,
            },
            output_rx,
        )
    }

    /// Feeds a new raw value, restarting the window.
    pub fn push(&self, value: impl Into<String>) {
        if self.input.send(value.into()).is_err() {
            tracing::debug!("debounce task has stopped; input dropped");
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Timer loop: wait for a value, then keep replacing it until the window
/// passes without input.
#[allow(clippy::arithmetic_side_effects)]
async fn run(
    delay: Duration,
    mut input: UnboundedReceiver<String>,
    output: UnboundedSender<String>,
) {
    while let Some(mut pending) = input.recv().await {
        let mut deadline = pin!(sleep(delay));
        loop {
            tokio::select! {
                next = input.recv() => {
                    let Some(value) = next else {
                        return;
                    };
                    pending = value;
                    deadline.as_mut().reset(Instant::now() + delay);
                }
                () = &mut deadline => {
                    if output.send(pending).is_err() {
                        return;
                    }
                    break;
                }
            }
        }
    }
}
