//! `ScheduleQueue` — the `(due_tick, seq)`-ordered scheduled-callback queue.
//!
//! # Design
//!
//! Grounded on the teacher's `WakeQueue` (`BTreeMap<Tick, Vec<_>>`, drained
//! per tick), generalized from "wake this agent" to "run this closure," with
//! a monotonic `seq` added per entry so same-`due_tick` callbacks fire in
//! scheduling order (spec §5). Because callbacks are always pushed with a
//! strictly increasing `seq`, the `Vec` bucket for a given tick is already
//! in `seq` order — no secondary sort is needed at drain time.
//!
//! `Ctx` is the type the callback receives when fired (in this workspace,
//! `&mut Simulator`), kept generic here so this crate has no dependency on
//! `aim-sim`.

use std::collections::BTreeMap;

use aim_core::{AimError, AimResult, Tick};

/// A single scheduled callback: `(due_tick, seq, fn, recurring?, period)`.
pub struct ScheduledCallback<Ctx> {
    pub due_tick: Tick,
    pub seq: u64,
    pub recurring: bool,
    pub period: u64,
    action: Box<dyn FnMut(Tick, &mut Ctx) + Send>,
}

impl<Ctx> ScheduledCallback<Ctx> {
    /// Invoke the callback's action.
    pub fn fire(&mut self, tick: Tick, ctx: &mut Ctx) {
        (self.action)(tick, ctx)
    }
}

/// Priority queue of scheduled callbacks, bucketed by due tick.
pub struct ScheduleQueue<Ctx> {
    inner: BTreeMap<Tick, Vec<ScheduledCallback<Ctx>>>,
    next_seq: u64,
}

impl<Ctx> ScheduleQueue<Ctx> {
    pub fn new() -> Self {
        Self { inner: BTreeMap::new(), next_seq: 0 }
    }

    /// Schedule `action` to fire at `due_tick`. If `recurring`, it is
    /// re-inserted at `due_tick + period` each time it fires (see
    /// [`reinsert_recurring`][Self::reinsert_recurring]).
    ///
    /// # Errors
    /// `AimError::Invariant` if `recurring` and `period == 0` (spec §3:
    /// "period ≥ 1 when recurring" — a programming-error class, never
    /// caught by calling code).
    pub fn schedule<F>(
        &mut self,
        due_tick: Tick,
        recurring: bool,
        period: u64,
        action: F,
    ) -> AimResult<u64>
    where
        F: FnMut(Tick, &mut Ctx) + Send + 'static,
    {
        if recurring && period == 0 {
            return Err(AimError::Invariant(
                "recurring scheduled callback requires period >= 1".into(),
            ));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.inner.entry(due_tick).or_default().push(ScheduledCallback {
            due_tick,
            seq,
            recurring,
            period,
            action: Box::new(action),
        });
        Ok(seq)
    }

    /// Remove and return, in `(due_tick, seq)` order, every callback whose
    /// `due_tick <= tick`. Callbacks newly scheduled by a fired callback's
    /// own action are not included even if their `due_tick <= tick` — the
    /// caller fires them one at a time against a `Ctx` that no longer holds
    /// this batch, so a re-entrant `schedule` call lands in the live
    /// `inner` map and is picked up on a later `take_due` call.
    pub fn take_due(&mut self, tick: Tick) -> Vec<ScheduledCallback<Ctx>> {
        let later = self.inner.split_off(&tick.offset(1));
        let due = std::mem::replace(&mut self.inner, later);
        due.into_values().flatten().collect()
    }

    /// Re-insert a fired recurring callback at `due_tick + period`.
    pub fn reinsert_recurring(&mut self, mut cb: ScheduledCallback<Ctx>) {
        debug_assert!(cb.recurring, "reinsert_recurring called on a one-shot callback");
        cb.due_tick = cb.due_tick.offset(cb.period);
        self.inner.entry(cb.due_tick).or_default().push(cb);
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Total number of callbacks currently queued across all future ticks.
    pub fn len(&self) -> usize {
        self.inner.values().map(Vec::len).sum()
    }

    /// The earliest tick with at least one queued callback, or `None`.
    pub fn next_tick(&self) -> Option<Tick> {
        self.inner.keys().next().copied()
    }
}

impl<Ctx> Default for ScheduleQueue<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}
