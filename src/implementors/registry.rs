//! Deferred implementor registration.
//!
//! Implementor files and the component that displays them load independently.
//! A batch that arrives before any reader is attached is queued; attaching a
//! reader replays the queue in arrival order and from then on batches are
//! forwarded as they come. Every batch reaches exactly one reader exactly once.

use super::{ImplementorBatch, ImplementorSet};
use std::collections::VecDeque;

/// Receiver of implementor batches (the type-relationship browser).
pub trait ImplementorSink: Send + Sync {
    fn apply(&mut self, batch: &ImplementorBatch);
}

impl<F> ImplementorSink for F
where
    F: FnMut(&ImplementorBatch) + Send + Sync,
{
    fn apply(&mut self, batch: &ImplementorBatch) {
        self(batch);
    }
}

enum ReaderState {
    Unattached { pending: VecDeque<ImplementorBatch> },
    Attached { sink: Box<dyn ImplementorSink> },
}

impl Default for ReaderState {
    fn default() -> Self {
        Self::Unattached {
            pending: VecDeque::new(),
        }
    }
}

/// Process-wide implementor registry.
#[derive(Default)]
pub struct ImplementorRegistry {
    state: ReaderState,
    accumulated: ImplementorSet,
    registered: usize,
}

impl std::fmt::Debug for ImplementorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImplementorRegistry")
            .field("attached", &self.is_attached())
            .field("pending", &self.pending_len())
            .field("registered", &self.registered)
            .field("traits", &self.accumulated.len())
            .finish()
    }
}

impl ImplementorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch. Never fails and never validates.
    pub fn register_implementors(&mut self, batch: ImplementorBatch) {
        self.registered += 1;
        self.accumulated.apply(&batch);

        match &mut self.state {
            ReaderState::Attached { sink } => {
                tracing::trace!("Forwarding implementor batch ({} traits)", batch.len());
                sink.apply(&batch);
            }
            ReaderState::Unattached { pending } => {
                tracing::trace!(
                    "No reader attached, queueing implementor batch ({} pending)",
                    pending.len() + 1
                );
                pending.push_back(batch);
            }
        }
    }

    /// Attach a reader, replaying every queued batch into it first.
    ///
    /// If a reader was already attached it is replaced and handed back; the new
    /// reader only sees batches registered from now on.
    pub fn attach(
        &mut self,
        mut sink: Box<dyn ImplementorSink>,
    ) -> Option<Box<dyn ImplementorSink>> {
        match std::mem::take(&mut self.state) {
            ReaderState::Unattached { pending } => {
                tracing::debug!("Reader attached, replaying {} queued batches", pending.len());
                for batch in &pending {
                    sink.apply(batch);
                }
                self.state = ReaderState::Attached { sink };
                None
            }
            ReaderState::Attached { sink: previous } => {
                tracing::debug!("Replacing attached implementor reader");
                self.state = ReaderState::Attached { sink };
                Some(previous)
            }
        }
    }

    /// Detach the current reader. Later batches queue again.
    pub fn detach(&mut self) -> Option<Box<dyn ImplementorSink>> {
        match std::mem::take(&mut self.state) {
            ReaderState::Attached { sink } => Some(sink),
            unattached @ ReaderState::Unattached { .. } => {
                self.state = unattached;
                None
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.state, ReaderState::Attached { .. })
    }

    /// Batches waiting for a reader.
    pub fn pending_len(&self) -> usize {
        match &self.state {
            ReaderState::Unattached { pending } => pending.len(),
            ReaderState::Attached { .. } => 0,
        }
    }

    /// Total batches registered over the registry's lifetime.
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Everything registered so far, whether or not a reader has seen it.
    pub fn implementors(&self) -> &ImplementorSet {
        &self.accumulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CrateName;
    use assert2::check;
    use std::sync::{Arc, Mutex};

    const DEREF: &str = "core::ops::deref::Deref";

    /// Reader that records every batch it is given.
    fn recording_sink() -> (Box<dyn ImplementorSink>, Arc<Mutex<Vec<ImplementorBatch>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let sink = move |batch: &ImplementorBatch| {
            log.lock().unwrap().push(batch.clone());
        };
        (Box::new(sink), seen)
    }

    fn batch(crate_name: &str) -> ImplementorBatch {
        ImplementorBatch::new().with(DEREF, crate_name, vec![])
    }

    #[test]
    fn test_queue_then_replay_in_order() {
        let mut registry = ImplementorRegistry::new();
        registry.register_implementors(batch("http"));
        registry.register_implementors(batch("reqwest"));
        check!(registry.pending_len() == 2);
        check!(!registry.is_attached());

        let (sink, seen) = recording_sink();
        check!(registry.attach(sink).is_none());

        let seen = seen.lock().unwrap();
        check!(*seen == vec![batch("http"), batch("reqwest")]);
        check!(registry.pending_len() == 0);
    }

    #[test]
    fn test_attached_reader_receives_immediately() {
        let mut registry = ImplementorRegistry::new();
        let (sink, seen) = recording_sink();
        registry.attach(sink);

        registry.register_implementors(batch("bytes"));
        check!(seen.lock().unwrap().len() == 1);
        check!(registry.pending_len() == 0);
    }

    #[test]
    fn test_queued_batch_applied_exactly_once() {
        let mut registry = ImplementorRegistry::new();
        registry.register_implementors(batch("http"));

        let (sink, seen) = recording_sink();
        registry.attach(sink);
        registry.register_implementors(batch("tokio"));

        check!(*seen.lock().unwrap() == vec![batch("http"), batch("tokio")]);
        check!(registry.registered() == 2);
    }

    #[test]
    fn test_reattach_returns_previous_reader() {
        let mut registry = ImplementorRegistry::new();
        registry.register_implementors(batch("http"));

        let (first, first_seen) = recording_sink();
        let (second, second_seen) = recording_sink();
        check!(registry.attach(first).is_none());
        check!(registry.attach(second).is_some());

        registry.register_implementors(batch("tokio"));
        check!(first_seen.lock().unwrap().len() == 1);
        check!(*second_seen.lock().unwrap() == vec![batch("tokio")]);
    }

    #[test]
    fn test_detach_queues_again() {
        let mut registry = ImplementorRegistry::new();
        let (sink, seen) = recording_sink();
        registry.attach(sink);
        check!(registry.detach().is_some());
        check!(registry.detach().is_none());

        registry.register_implementors(batch("http"));
        check!(registry.pending_len() == 1);
        check!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_accumulated_map_without_reader() {
        let mut registry = ImplementorRegistry::new();
        registry.register_implementors(batch("http"));
        registry.register_implementors(batch("reqwest"));

        let crates = registry.implementors().get(DEREF).expect("trait registered");
        let names: Vec<_> = crates.keys().map(CrateName::as_str).collect();
        check!(names == ["http", "reqwest"]);
    }
}
