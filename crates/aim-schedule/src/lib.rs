//! `aim-schedule` — the scheduled-callback queue (spec §3, §4.1).
//!
//! # Crate layout
//!
//! | Module   | Contents                                          |
//! |----------|-----------------------------------------------------|
//! | [`queue`]| `ScheduledCallback`, `ScheduleQueue`                |
//!
//! A scheduled callback is `(due_tick, seq, fn, recurring?, period)`.
//! `ScheduleQueue` drains exactly the callbacks due at a given tick, in
//! `(due_tick, seq)` order, and re-inserts recurring ones at `due_tick +
//! period`. Same-tick ordering is carried by insertion order within the
//! per-tick bucket (callbacks are always pushed with a strictly increasing
//! `seq`, so the bucket is already in `seq` order without a secondary sort) —
//! the same trick the teacher's `WakeQueue` uses to avoid a heap for the
//! common case of few distinct due ticks.

pub mod queue;

#[cfg(test)]
mod tests;

pub use queue::{ScheduleQueue, ScheduledCallback};
