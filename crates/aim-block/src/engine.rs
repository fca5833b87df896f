//! The block-facing capability surface of `Simulator`.
//!
//! # Why a trait instead of a concrete `Simulator` parameter
//!
//! `aim-sim::Simulator` owns `Vec<Option<Box<dyn Block>>>` — it must depend
//! on `aim-block` for the `Block` trait. If `Block::take`/`tick` took a
//! concrete `&mut Simulator` argument, `aim-block` would have to depend on
//! `aim-sim` right back, a cycle. `Engine` is the narrow slice of
//! `Simulator`'s API a block actually needs (eject to a sibling block,
//! subscribe/emit on the event bus, touch the RNG and clock, reach a
//! registered space); `aim-sim::Simulator` implements it. Blocks only ever
//! see `&mut dyn Engine`, never the concrete simulator type.

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, SimRng, Tick};
use aim_spatial::SpaceManager;

/// The engine services a [`crate::Block`] may call into from `take`/`tick`.
pub trait Engine: Send {
    /// The tick currently being processed.
    fn current_tick(&self) -> Tick;

    /// The simulator's single shared RNG (spec §5: no per-component RNG).
    fn rng(&mut self) -> &mut SimRng;

    /// Mint a fresh, never-before-issued `AgentId` (used by `Source`).
    fn next_agent_id(&mut self) -> AgentId;

    /// Hand `agent` to the block identified by `target`. Mirrors
    /// `downstream.take(agent)` in spec §4.2: on `Ok`, `target` now owns
    /// `agent`; on `Err`, [`Rejected`] carries the agent back so the caller
    /// can decide whether to keep it for retry (class 1) or let a fatal
    /// class 2/3 error propagate out of `run()`.
    ///
    /// `on_exit`, when given, is the *ejecting* block's own `on_exit` hook
    /// (spec §4.2: "`on_exit` fires after `take` returns without raising").
    /// It is invoked at most once, by whichever block ends up actually
    /// committing to hold or consume `agent` — a pass-through block
    /// (`If`/`Switch`/`Split`/`ConveyorExit`) forwards it unfired to its own
    /// inner `try_eject` call rather than invoking it itself, since a
    /// pass-through hasn't truly accepted the agent until its own downstream
    /// has. It never fires on a rejection.
    fn try_eject(
        &mut self,
        target: BlockId,
        agent: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected>;

    /// Register `agent` for delivery of the exact string `event`.
    fn subscribe(&mut self, agent: AgentId, event: &str) -> AimResult<()>;

    /// Enqueue `event` for next-tick delivery to `emitter`'s subscribers.
    fn emit_event(&mut self, event: &str, emitter: AgentId) -> AimResult<()>;

    /// Mutable access to the space registered at `slot`, for `ConveyorBlock`.
    fn space_mut(&mut self, slot: usize) -> AimResult<&mut dyn SpaceManager>;
}

/// A `take`/`try_eject` failure, carrying the agent back so the caller isn't
/// forced to reconstruct or clone it to retry.
///
/// `error.is_rejection()` distinguishes the two cases a caller must handle
/// differently (spec §7): a class-1 `AimError::Rejected` means "keep the
/// agent, retry next tick"; anything else is class 2/3 and must propagate
/// out of `run()` — the agent is simply dropped along with it, since the
/// simulation is aborting anyway.
#[derive(Debug)]
pub struct Rejected {
    pub agent: Agent,
    pub error: AimError,
}

impl Rejected {
    pub fn new(agent: Agent, error: AimError) -> Self {
        Self { agent, error }
    }

    /// Shorthand for the common case: a plain class-1 rejection message.
    pub fn reason(agent: Agent, reason: impl Into<String>) -> Self {
        Self { agent, error: AimError::Rejected(reason.into()) }
    }
}
