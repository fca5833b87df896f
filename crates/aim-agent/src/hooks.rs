//! The agent capability trait.
//!
//! Spec §9 describes agent overrides (`on_enter_block`, `on_event`) as a
//! "base-class-with-override hooks" pattern mapped onto a narrow capability
//! interface. `AgentHooks` is that interface: a required-with-defaults trait
//! object, the same shape as the teacher lineage's `BehaviorModel` trait
//! (one method genuinely required, the rest default to no-ops).

use aim_core::{BlockId, Tick};

/// Behavior an agent may opt into by carrying `Some(Box<dyn AgentHooks>)`.
///
/// Most agents in a scenario are plain data carriers and use [`NoopHooks`]
/// (or, more commonly, `None` — see [`crate::Agent::hooks`]).
pub trait AgentHooks: Send {
    /// Called by `Block::take` default semantics after an agent is accepted
    /// into a new block, after the block's own `on_enter` callback (if any).
    fn on_enter_block(&mut self, _block: BlockId) {}

    /// Called by the event bus at delivery time (tick phase 3) for every
    /// event this agent is subscribed to.
    fn on_event(&mut self, _event: &str, _tick: Tick) {}
}

/// An `AgentHooks` implementation that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl AgentHooks for NoopHooks {}
