//! Fluent builder for constructing a [`Simulator`].
//!
//! Narrower than the teacher's `SimBuilder` — there is no population-wide
//! `AgentStore`/`AgentRngs` to validate lengths against here (agents are
//! spawned one at a time, by `Source`, during `run`), so the only required
//! input is [`SimConfig`] and there is nothing left to validate at `build`
//! time. Blocks and spaces are wired onto the returned `Simulator` directly
//! via `add_block`/`add_space`/`connect`.

use aim_core::SimConfig;

use crate::sim::Simulator;

/// Builder for [`Simulator`]. Currently a thin wrapper around
/// `Simulator::new` — kept as a distinct type (rather than exposing
/// `Simulator::new` as `pub`) so scenario code constructs a simulator
/// through one obvious entry point, matching the teacher's
/// `SimBuilder::new(..).build()` shape even though there's nothing left to
/// configure before `build()` today.
pub struct SimulatorBuilder {
    config: SimConfig,
}

impl SimulatorBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Build the `Simulator`. Infallible: unlike the teacher's `SimBuilder`,
    /// there are no population-wide inputs whose lengths could disagree.
    pub fn build(self) -> Simulator {
        Simulator::new(self.config)
    }
}
