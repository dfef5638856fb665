//! Turns a burst of raw input events into committed values.
//!
//! A value is committed once no newer event has arrived for the quiet period.
//! The debouncer knows nothing about geocoding; it works for any
//! `PartialEq + Clone` payload.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(250);

/// What travels from a sender to its debouncer.
#[derive(Debug)]
enum Event<T> {
    Value(T),
    /// Clears the last committed value, in order with the values around it.
    Forget,
}

/// Producer half; cheap to clone, one per input source.
#[derive(Debug)]
pub struct DebounceSender<T> {
    tx: mpsc::UnboundedSender<Event<T>>,
}

impl<T> Clone for DebounceSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> DebounceSender<T> {
    /// Feeds one raw event. Returns `false` once the debouncer is gone.
    pub fn send(&self, value: T) -> bool {
        self.tx.send(Event::Value(value)).is_ok()
    }

    /// Lets the next value be committed even if it equals the last one.
    ///
    /// Goes through the channel, so it works while another task is parked in
    /// [`QueryDebouncer::next`]. Returns `false` once the debouncer is gone.
    pub fn forget_committed(&self) -> bool {
        self.tx.send(Event::Forget).is_ok()
    }
}

/// Consumer half. See [`QueryDebouncer::next`].
#[derive(Debug)]
pub struct QueryDebouncer<T> {
    rx: mpsc::UnboundedReceiver<Event<T>>,
    quiet: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
    last_committed: Option<T>,
    closed: bool,
}

/// Creates a connected sender/debouncer pair.
#[must_use]
pub fn debounce_channel<T>(quiet: Duration) -> (DebounceSender<T>, QueryDebouncer<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let debouncer = QueryDebouncer {
        rx,
        quiet,
        pending: None,
        deadline: None,
        last_committed: None,
        closed: false,
    };
    (DebounceSender { tx }, debouncer)
}

impl<T: PartialEq + Clone> QueryDebouncer<T> {
    #[must_use]
    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Waits for the next committed value.
    ///
    /// Every raw event restarts the quiet period. A value equal to the last
    /// committed one is swallowed. Once every sender is dropped, a pending
    /// value is still committed after its quiet period and then `None` is
    /// returned.
    ///
    /// Cancel-safe: buffered input and the running deadline live in `self`,
    /// so the future may be dropped (e.g. inside `select!`) and polled again
    /// later without losing events.
    pub async fn next(&mut self) -> Option<T> {
        loop {
            let Some(deadline) = self.deadline else {
                if self.closed {
                    return None;
                }
                match self.rx.recv().await {
                    Some(event) => self.push(event),
                    None => self.closed = true,
                }
                continue;
            };

            if self.closed {
                sleep_until(deadline).await;
                if let Some(value) = self.fire() {
                    return Some(value);
                }
                continue;
            }

            tokio::select! {
                biased;
                received = self.rx.recv() => match received {
                    Some(event) => self.push(event),
                    None => self.closed = true,
                },
                () = sleep_until(deadline) => {
                    if let Some(value) = self.fire() {
                        return Some(value);
                    }
                }
            }
        }
    }

    /// `true` while a value is waiting out its quiet period.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn push(&mut self, event: Event<T>) {
        match event {
            Event::Value(value) => {
                self.pending = Some(value);
                self.deadline = Some(Instant::now() + self.quiet);
            }
            Event::Forget => self.last_committed = None,
        }
    }

    fn fire(&mut self) -> Option<T> {
        self.deadline = None;
        let value = self.pending.take()?;
        if self.last_committed.as_ref() == Some(&value) {
            return None;
        }
        self.last_committed = Some(value.clone());
        Some(value)
    }
}
