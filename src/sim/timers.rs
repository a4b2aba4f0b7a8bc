//! Deferred events on the simulation clock
//!
//! Engines schedule events relative to their own tick clock instead of
//! wall-clock timers. The clock only moves inside `advance`, so a paused
//! engine (no `update` calls) never fires anything, and dropping or
//! clearing the queue cancels every pending event of that engine.

#[derive(Debug, Clone)]
struct Pending<E> {
    /// Scheduling order, breaks fire-time ties
    seq: u64,
    fire_at_ms: f64,
    event: E,
}

/// Queue of `(fire_at, event)` entries advanced by elapsed milliseconds
#[derive(Debug, Clone)]
pub struct Timers<E> {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Current clock reading
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Number of events not yet fired
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Schedule `event` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, event: E) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            seq,
            fire_at_ms: self.now_ms + delay_ms.max(0.0),
            event,
        });
    }

    /// Cancel everything and rewind the clock
    pub fn clear(&mut self) {
        self.pending.clear();
        self.now_ms = 0.0;
    }

    /// Move the clock forward and return every due event.
    ///
    /// Events come back ordered by fire time, ties broken by scheduling order.
    pub fn advance(&mut self, dt_ms: f64) -> Vec<E> {
        self.now_ms += dt_ms.max(0.0);
        let now = self.now_ms;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].fire_at_ms <= now {
                due.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }

        due.sort_by(|a, b| {
            a.fire_at_ms
                .partial_cmp(&b.fire_at_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|p| p.event).collect()
    }
}
