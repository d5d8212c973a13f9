//! Page progress reporting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

/// Emitted after each page has been fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Pages completed so far, including this one.
    pub completed: usize,
    /// Pages in the cycle.
    pub total: usize,
}

impl ProgressEvent {
    pub fn is_last(&self) -> bool {
        self.completed == self.total
    }
}

/// Receives progress events. Observers never influence the result.
pub trait ProgressObserver: Send + Sync {
    fn on_page(&self, event: ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_page(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Logs each page at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_page(&self, event: ProgressEvent) {
        info!(
            completed = event.completed,
            total = event.total,
            "fetched page {}/{}",
            event.completed,
            event.total
        );
    }
}

/// Shared page counter for one fetch cycle.
pub(crate) struct ProgressCounter {
    completed: AtomicUsize,
    total: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl ProgressCounter {
    pub(crate) fn new(total: usize, observer: Option<Arc<dyn ProgressObserver>>) -> Self {
        Self {
            completed: AtomicUsize::new(0),
            total,
            observer,
        }
    }

    /// Count one finished page and notify the observer.
    pub(crate) fn advance(&self) -> ProgressEvent {
        let completed = self.completed.fetch_add(1, Ordering::AcqRel) + 1;
        let event = ProgressEvent {
            completed,
            total: self.total,
        };
        if let Some(observer) = &self.observer {
            observer.on_page(event);
        }
        event
    }

    #[cfg(test)]
    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }
}
