//! Background diagram compilation.
//!
//! Every diagram instance gets its own thread. Results come back over a
//! channel that the event loop drains with [`DiagramStore::poll`], the same
//! way the file watcher reports changes.

use super::{Appearance, CompiledDiagram, compile};
use crate::error::DiagramError;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum DiagramState {
    Pending,
    Ready(Arc<CompiledDiagram>),
    Failed(DiagramError),
}

struct Slot {
    source: String,
    appearance: Appearance,
    request: u64,
    state: DiagramState,
}

struct Outcome {
    key: String,
    request: u64,
    result: Result<CompiledDiagram, DiagramError>,
}

/// Compiled diagrams keyed by block id.
pub struct DiagramStore {
    slots: HashMap<String, Slot>,
    next_request: u64,
    sender: Sender<Outcome>,
    receiver: Receiver<Outcome>,
}

impl DiagramStore {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            slots: HashMap::new(),
            next_request: 0,
            sender,
            receiver,
        }
    }

    /// Start compiling `source` for `key` unless the same source is
    /// already compiled or in flight. Returns true when a thread was spawned.
    pub fn request(&mut self, key: &str, source: &str, appearance: Appearance) -> bool {
        if let Some(slot) = self.slots.get(key)
            && slot.source == source
            && slot.appearance == appearance
        {
            return false;
        }

        self.next_request += 1;
        let request = self.next_request;
        self.slots.insert(
            key.to_string(),
            Slot {
                source: source.to_string(),
                appearance,
                request,
                state: DiagramState::Pending,
            },
        );

        let sender = self.sender.clone();
        let key = key.to_string();
        let source = source.to_string();
        let spawned = thread::Builder::new()
            .name(format!("diagram-{}", request))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| compile(&source, appearance)))
                    .unwrap_or_else(|_| {
                        Err(DiagramError::Syntax {
                            line: 0,
                            message: "diagram compiler panicked".to_string(),
                        })
                    });
                // The store may be gone by now.
                let _ = sender.send(Outcome {
                    key,
                    request,
                    result,
                });
            });

        if let Err(err) = spawned {
            warn!(error = %err, "could not spawn diagram worker");
            if let Some(slot) = self.slots.values_mut().find(|s| s.request == request) {
                slot.state = DiagramState::Failed(DiagramError::Syntax {
                    line: 0,
                    message: err.to_string(),
                });
            }
            return false;
        }
        true
    }

    /// Apply finished compiles. Returns true if any slot changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok(outcome) => changed |= self.apply(outcome),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Block until nothing is pending or `timeout` elapses.
    pub fn wait_all(&mut self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.receiver.recv_timeout(remaining) {
                Ok(outcome) => {
                    self.apply(outcome);
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    fn apply(&mut self, outcome: Outcome) -> bool {
        let Some(slot) = self.slots.get_mut(&outcome.key) else {
            return false;
        };
        if slot.request != outcome.request {
            debug!(key = %outcome.key, "dropping stale diagram result");
            return false;
        }
        slot.state = match outcome.result {
            Ok(diagram) => DiagramState::Ready(Arc::new(diagram)),
            Err(err) => {
                warn!(key = %outcome.key, error = %err, "diagram failed to compile");
                DiagramState::Failed(err)
            }
        };
        true
    }

    pub fn state(&self, key: &str) -> Option<&DiagramState> {
        self.slots.get(key).map(|slot| &slot.state)
    }

    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|s| s.state == DiagramState::Pending)
            .count()
    }

    /// Forget every slot; in-flight results become stale.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}

impl Default for DiagramStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_compiles_in_background() {
        let mut store = DiagramStore::new();
        assert!(store.request("d1", "graph TD; A-->B", Appearance::Dark));
        assert_eq!(store.state("d1"), Some(&DiagramState::Pending));
        store.wait_all(WAIT);
        assert!(matches!(store.state("d1"), Some(DiagramState::Ready(_))));
    }

    #[test]
    fn test_failure_is_isolated() {
        let mut store = DiagramStore::new();
        store.request("good", "graph LR; A-->B", Appearance::Light);
        store.request("bad", "this is not a diagram", Appearance::Light);
        store.wait_all(WAIT);
        assert!(matches!(store.state("good"), Some(DiagramState::Ready(_))));
        assert!(matches!(store.state("bad"), Some(DiagramState::Failed(_))));
    }

    #[test]
    fn test_same_source_is_not_recompiled() {
        let mut store = DiagramStore::new();
        assert!(store.request("d", "graph TD; A", Appearance::Dark));
        assert!(!store.request("d", "graph TD; A", Appearance::Dark));
        assert!(store.request("d", "graph TD; B", Appearance::Dark));
        store.wait_all(WAIT);
        let Some(DiagramState::Ready(diagram)) = store.state("d") else {
            panic!("expected ready diagram");
        };
        assert!(diagram.lines.iter().any(|l| l.contains('B')));
    }

    #[test]
    fn test_cleared_results_are_dropped() {
        let mut store = DiagramStore::new();
        store.request("d", "graph TD; A-->B", Appearance::Dark);
        store.clear();
        thread::sleep(Duration::from_millis(50));
        store.poll();
        assert!(store.state("d").is_none());
    }
}
