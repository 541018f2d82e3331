use crate::media::MediaResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Identifies one submission. Only the newest ticket may fill the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub enum Completion {
    Current(MediaResult),
    Stale,
}

#[derive(Default)]
struct Slot {
    result: Option<MediaResult>,
    loading: bool,
}

/// Single current-result slot with last-submission-wins semantics.
#[derive(Default)]
pub struct Session {
    generation: AtomicU64,
    slot: Mutex<Slot>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a submission, superseding whatever is in flight.
    pub fn begin(&self) -> Ticket {
        let mut slot = self.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        slot.result = None;
        slot.loading = true;
        Ticket(generation)
    }

    pub fn complete(&self, ticket: Ticket, result: MediaResult) -> Completion {
        let mut slot = self.lock();
        if ticket.0 != self.generation.load(Ordering::SeqCst) {
            return Completion::Stale;
        }
        slot.loading = false;
        slot.result = Some(result.clone());
        Completion::Current(result)
    }

    /// Clears the slot and invalidates any submission still in flight.
    pub fn reset(&self) {
        let mut slot = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        slot.result = None;
        slot.loading = false;
    }

    pub fn current(&self) -> Option<MediaResult> {
        self.lock().result.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        // A poisoned slot still holds a coherent value; keep using it.
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}
