//! Recognition bridge: debounced, single-slot dispatch to a recognizer.
//!
//! Every change notification restarts the debounce window. When the window
//! closes without further changes the latest snapshot is serialized and sent to
//! a fresh worker, terminating the previous one first, so the only answer that
//! can ever be applied belongs to the newest dispatch.
//!
//! Time is passed in explicitly; the host calls [`RecognitionBridge::tick`]
//! from its event loop (see [`RecognitionBridge::next_deadline`]).

mod protocol;
mod worker;

use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::canvas::{ChangeNotification, SymbolMap};
use crate::text_metrics::SharedMeasurer;
use crate::types::SymbolId;

pub use protocol::{RecognitionRequest, RecognitionResponse, RecognitionSymbol};
pub use worker::{
    CancelFlag, DisabledRecognizer, ProcessRecognizer, RecognitionError, RecognitionResult,
    Recognizer, ThreadRecognizer, WorkerHandle,
};

/// What the equation panel shows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionView {
    pub mathml: String,
    pub loading: bool,
    pub unused: Vec<SymbolId>,
}

struct PendingChange {
    deadline: Instant,
    symbols: SymbolMap,
}

struct InFlight {
    generation: u64,
    handle: Box<dyn WorkerHandle>,
}

pub struct RecognitionBridge {
    recognizer: Box<dyn Recognizer>,
    measurer: SharedMeasurer,
    debounce: Duration,
    pending: Option<PendingChange>,
    in_flight: Option<InFlight>,
    generation: u64,
    view: RecognitionView,
}

impl RecognitionBridge {
    pub fn new(recognizer: Box<dyn Recognizer>, measurer: SharedMeasurer, debounce: Duration) -> Self {
        Self {
            recognizer,
            measurer,
            debounce,
            pending: None,
            in_flight: None,
            generation: 0,
            view: RecognitionView::default(),
        }
    }

    pub fn view(&self) -> &RecognitionView {
        &self.view
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Number of requests handed to a worker so far.
    pub fn dispatch_count(&self) -> u64 {
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// When the pending change becomes due, if one is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Restart the debounce window with the newest snapshot.
    pub fn notify_change(&mut self, change: ChangeNotification, now: Instant) {
        debug!(symbols = change.symbols.len(), "Recognition debounce restarted");
        self.pending = Some(PendingChange {
            deadline: now + self.debounce,
            symbols: change.symbols,
        });
        self.view.loading = true;
    }

    /// Dispatch a due change and poll the outstanding worker. Returns the
    /// response when one was applied during this call.
    pub fn tick(&mut self, now: Instant) -> Option<RecognitionResponse> {
        if self.pending.as_ref().is_some_and(|p| now >= p.deadline)
            && let Some(pending) = self.pending.take()
        {
            self.dispatch(pending.symbols);
        }
        self.poll()
    }

    /// Drop the pending change and terminate the outstanding worker.
    pub fn shutdown(&mut self) {
        self.pending = None;
        if let Some(mut stale) = self.in_flight.take() {
            debug!(generation = stale.generation, "Terminating recognizer on shutdown");
            stale.handle.terminate();
        }
        self.view.loading = false;
    }

    fn dispatch(&mut self, symbols: SymbolMap) {
        crate::profile_scope!("recognition_dispatch");
        if let Some(mut stale) = self.in_flight.take() {
            debug!(generation = stale.generation, "Terminating superseded recognizer");
            stale.handle.terminate();
        }

        let request = RecognitionRequest::from_symbols(&symbols, self.measurer.as_ref());
        let count = request.len();
        match self.recognizer.spawn(request) {
            Ok(handle) => {
                self.generation += 1;
                info!(generation = self.generation, symbols = count, "Dispatched recognition request");
                self.in_flight = Some(InFlight {
                    generation: self.generation,
                    handle,
                });
            }
            Err(RecognitionError::NotConfigured) => {
                debug!("No recognizer configured; skipping dispatch");
                self.view.loading = false;
            }
            Err(e) => {
                error!("Failed to dispatch recognition request: {e}");
                self.view.loading = false;
            }
        }
    }

    fn poll(&mut self) -> Option<RecognitionResponse> {
        let in_flight = self.in_flight.as_mut()?;
        match in_flight.handle.try_recv() {
            Ok(None) => None,
            Ok(Some(response)) => {
                info!(
                    generation = in_flight.generation,
                    unused = response.unused_symbols.len(),
                    "Recognition result applied"
                );
                self.in_flight = None;
                self.view.mathml = response.mathml.clone();
                self.view.unused = response.unused_symbols.clone();
                self.view.loading = self.pending.is_some();
                Some(response)
            }
            Err(e) => {
                error!(generation = in_flight.generation, "Recognition failed: {e}");
                self.in_flight = None;
                self.view.loading = self.pending.is_some();
                None
            }
        }
    }
}

impl Drop for RecognitionBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
