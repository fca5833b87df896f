//! `aim-sim` — the tick loop orchestrator for the AIM simulation engine.
//!
//! # The fixed five-phase tick (spec §4.1)
//!
//! ```text
//! for tick in 0..config.max_ticks:
//!   ① Callbacks — fire every scheduled callback with due_tick <= tick, in
//!                 (due_tick, seq) order; recurring callbacks re-insert at
//!                 due_tick + period.
//!   ② Spaces    — advance every registered SpaceManager by delta_time = 1.
//!   ③ Events    — drain the event bus's pending buffer and deliver each
//!                 (event, subscriber) pair to whichever block currently
//!                 holds the subscriber.
//!   ④ Blocks    — tick every registered block, in registration order.
//!   ⑤ Rotate    — implicit: anything emitted in ①-④ already landed in the
//!                 bus's one pending buffer, ready for next tick's ③.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use aim_core::SimConfig;
//! use aim_block::{QueueBlock, SinkBlock};
//! use aim_sim::{NoopObserver, SimulatorBuilder};
//!
//! let mut sim = SimulatorBuilder::new(SimConfig::new(42, 10)).build();
//! let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
//! let queue = sim.add_block(|id| Box::new(QueueBlock::new(id)));
//! sim.connect(queue, 0, sink);
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use aim_core::{AimError, AimResult};
pub use builder::SimulatorBuilder;
pub use observer::{NoopObserver, SimObserver};
pub use sim::Simulator;
