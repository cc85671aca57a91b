use std::time::Duration;

/// Identity of a scheduled callback, used for cancellation before it fires.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct CallbackId(u64);

/// One scheduled callback: a data record, not a captured closure, so the
/// queue stays inspectable. `remaining` goes negative once overdue; the
/// registration sequence breaks ties between simultaneous expiries.
struct ScheduledCallback<E> {
    id: CallbackId,
    remaining_micros: i64,
    interval_micros: Option<i64>,
    event: E,
    seq: u64,
}

/// Per-owner collection of delayed and periodic callbacks, advanced once
/// per simulation tick by the owner's tick thread.
///
/// Due callbacks fire ordered by expiry time, with a stable FIFO tie-break
/// for simultaneous expiry. One-shots are removed on firing; periodic
/// callbacks reset to their interval and stay queued. Cancellation removes
/// a callback by identity, so a cancelled callback can never fire.
pub struct EventQueue<E> {
    entries: Vec<ScheduledCallback<E>>,
    next_id: u64,
    next_seq: u64,
}

impl<E: Clone> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            next_seq: 0,
        }
    }

    /// Schedules a one-shot callback.
    pub fn schedule(&mut self, delay: Duration, event: E) -> CallbackId {
        self.push(delay, None, event)
    }

    /// Schedules a periodic callback: first fire after `delay`, then every
    /// `interval`. A zero interval is clamped to one microsecond.
    pub fn schedule_repeating(
        &mut self,
        delay: Duration,
        interval: Duration,
        event: E,
    ) -> CallbackId {
        let interval = to_micros(interval).max(1);
        self.push(delay, Some(interval), event)
    }

    fn push(&mut self, delay: Duration, interval_micros: Option<i64>, event: E) -> CallbackId {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        let seq = self.next_seq;
        self.next_seq += 1;

        self.entries.push(ScheduledCallback {
            id,
            remaining_micros: to_micros(delay),
            interval_micros,
            event,
            seq,
        });
        id
    }

    /// Removes a pending callback by identity. Returns whether it was found.
    pub fn cancel(&mut self, id: CallbackId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: CallbackId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subtracts `elapsed` from every pending callback and returns the
    /// events of those that came due, in firing order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<E> {
        let elapsed = to_micros(elapsed);
        for entry in &mut self.entries {
            entry.remaining_micros -= elapsed;
        }

        let mut due: Vec<usize> = (0..self.entries.len())
            .filter(|&index| self.entries[index].remaining_micros <= 0)
            .collect();
        // most-overdue first; registration order breaks ties
        due.sort_by_key(|&index| {
            let entry = &self.entries[index];
            (entry.remaining_micros, entry.seq)
        });

        let mut fired = Vec::with_capacity(due.len());
        for index in due {
            let entry = &mut self.entries[index];
            fired.push(entry.event.clone());
            if let Some(interval) = entry.interval_micros {
                entry.remaining_micros = interval;
            }
        }

        // periodic entries were reset above; whatever is still overdue was
        // a one-shot that just fired
        self.entries.retain(|entry| entry.remaining_micros > 0);

        fired
    }
}

impl<E: Clone> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

fn to_micros(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros()).unwrap_or(i64::MAX)
}
