//! Simulation observer trait (spec §6: "Observer hook (contract only)").
//!
//! Observers may inspect agent and block state between ticks but must not
//! mutate it — they see a consistent snapshot at tick boundaries, never
//! mid-phase. `Simulator::run` never hands an observer anything but `&self`
//! reference material for exactly that reason.

use aim_core::Tick;

/// Callbacks invoked by [`Simulator::run`][crate::Simulator::run] at tick
/// boundaries.
///
/// All methods have default no-op implementations so implementors only
/// need to override what they care about.
///
/// # Example — progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: done");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before phase ① (scheduled
    /// callbacks) runs.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick, after phase ④ (block ticks)
    /// completes and before the tick counter advances.
    fn on_tick_end(&mut self, _tick: Tick) {}

    /// Called once after the final tick completes (`current_tick ==
    /// config.max_ticks`).
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing. Use when you need to call `run` but
/// don't want tick-boundary callbacks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
