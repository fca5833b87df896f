//! The `Block` trait — the contract every canonical block implements
//! (spec §4.2).
//!
//! Grounded on the teacher's `dt-behavior::model::BehaviorModel` shape: one
//! required method carries the block's own identity and wiring, callbacks
//! are `Box<dyn Fn(...) + Send>` fields on the concrete structs that need
//! them rather than trait methods, following the teacher's "first-class
//! callables as fields" convention.

use std::collections::VecDeque;

use aim_agent::Agent;
use aim_core::{AgentId, AimResult, BlockId, Tick};

use crate::engine::{Engine, Rejected};

/// User-overridable lifecycle callbacks a block may carry, invoked around
/// its own default `take`/ejection behavior (spec §4.2: "user hooks
/// `on_enter`, `on_exit`").
///
/// Only the blocks that follow the base contract's default "push to held
/// list... call `on_enter`... " / "on ejection: `on_exit` ... " semantics
/// carry a `BlockHooks` field (`Queue`, `Delay`, `Gate`,
/// `RestrictedAreaStart`, `Combine`'s container port, `Split`,
/// `ConveyorBlock`). Blocks whose spec prose explicitly departs from that
/// default — `Source` has no buffer, `If`/`Switch` do "no internal
/// buffering", `Sink` "accepts unconditionally" with no onward hand-off,
/// `ConveyorExit` is a bare pass-through — have no use for either hook and
/// don't carry the field.
#[derive(Default)]
pub struct BlockHooks {
    on_enter: Option<Box<dyn FnMut(&mut Agent) + Send>>,
    on_exit: Option<Box<dyn FnMut(&mut Agent) + Send>>,
}

impl BlockHooks {
    pub fn with_on_enter(mut self, f: impl FnMut(&mut Agent) + Send + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn with_on_exit(mut self, f: impl FnMut(&mut Agent) + Send + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }

    fn fire_enter(&mut self, agent: &mut Agent) {
        if let Some(f) = self.on_enter.as_mut() {
            f(agent);
        }
    }

    /// Fire the `on_exit` callback, if set. `pub(crate)` so sibling modules
    /// whose `tick` pops an agent out-of-line from [`eject_fifo_while`]
    /// (`Delay`, `Gate`'s one-per-tick mode, `RestrictedAreaStart`,
    /// `Combine`'s container port, `ConveyorBlock`) can invoke it at their
    /// own ejection point instead of going through the shared helper.
    pub(crate) fn fire_exit(&mut self, agent: &mut Agent) {
        if let Some(f) = self.on_exit.as_mut() {
            f(agent);
        }
    }
}

/// Run the default "accept" side effects from spec §4.2: call the block's
/// own `on_enter` hook (if set), then bind `agent.current_block` and
/// dispatch the agent's own `on_enter_block` hook — in that order, per
/// spec §4.2's "call `on_enter(agent)` if set, call `agent.on_enter_block(self)`".
pub(crate) fn accept(agent: &mut Agent, block: BlockId, hooks: &mut BlockHooks) {
    hooks.fire_enter(agent);
    agent.on_enter_block(block);
}

/// A process node: owns zero or more agents, routes them to downstream
/// blocks via `Engine::try_eject`.
pub trait Block: Send {
    fn id(&self) -> BlockId;

    /// Downcast support for observers and tests that need to reach a
    /// concrete block's own state (e.g. `SinkBlock::count`) after a run —
    /// the simulator only ever stores `Box<dyn Block>`, so this is the only
    /// way back to the concrete type. Every implementor's body is `self`;
    /// there is no default because a default requires `Self: Sized`, which
    /// would make it uncallable through `&dyn Block`.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Mutable counterpart to [`as_any`][Self::as_any].
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

    /// Accept `agent`. Implementations that buffer internally always
    /// succeed (barring a misconfiguration/invariant failure); pass-through
    /// blocks (`If`, `Switch`, `Combine`, `Split`) may themselves reject if
    /// the chosen downstream rejects, propagating that rejection upstream
    /// unchanged (spec §4.3: "the If block itself rejects"). On any
    /// failure the agent is handed back inside [`Rejected`] so the caller
    /// never silently loses it.
    ///
    /// `on_exit` is the *caller's* own exit hook, forwarded down from
    /// whatever called [`Engine::try_eject`] to reach this block — see that
    /// method's doc comment. Implementations that buffer or consume `agent`
    /// here (the common case) must invoke it exactly once, right at the
    /// point they commit to keeping the agent, before returning `Ok(())`.
    /// Pass-through implementations that immediately forward `agent` to
    /// their own downstream via a nested `try_eject` must pass `on_exit`
    /// through unfired rather than invoking it themselves.
    fn take(
        &mut self,
        engine: &mut dyn Engine,
        agent: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected>;

    /// Advance this block by one tick: release held agents where due,
    /// attempt ejections, run any per-tick production (Source).
    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()>;

    /// Wire output `slot` to `target`. Slot semantics vary by block; slot 0
    /// is the sole/primary output for blocks with one output.
    fn connect(&mut self, slot: usize, target: BlockId);

    /// Deliver `event` to `agent` if this block currently holds it, calling
    /// the agent's own `on_event` hook and returning `true`.
    ///
    /// `Simulator` scans registered blocks in order during tick phase 3
    /// (spec §4.1) since an `Agent` value lives inside whatever block
    /// currently owns it, not in a central store (spec §3's ownership
    /// invariant is upheld by move semantics, not by indexing). Blocks with
    /// no internal buffer (`If`, `Switch`, `Sink`, `RestrictedAreaEnd`,
    /// `Split`) never hold an agent across a tick boundary and use the
    /// default no-op.
    fn deliver_event(&mut self, _agent: AgentId, _event: &str, _tick: Tick) -> bool {
        false
    }
}

/// Eject agents from the front of `held`, FIFO, stopping at the first
/// rejection (spec §4.2's default `_tick` ejection policy). Shared by every
/// block whose `_tick` is "drain what's due to the single downstream output."
///
/// `is_due` decides whether the front agent is currently eligible (e.g.
/// Queue: always; Delay: `release_tick <= now`). Returns `Ok(())`
/// regardless of whether anything was ejected — an empty or not-yet-due
/// queue isn't an error. A fatal (non-rejection) error from the downstream
/// propagates out immediately; the agent that triggered it is dropped along
/// with it since `run()` is aborting.
///
/// `hooks.on_exit`, when set, fires exactly once per agent that actually
/// leaves — `try_eject`'s `on_exit` parameter carries the callback down to
/// whichever block ends up committing to the agent, which invokes it right
/// before returning `Ok(())` (spec §4.2: "`on_exit` fires after `take`
/// returns without raising"). A rejected attempt never fires it; a retried
/// agent only fires it on the attempt that finally succeeds.
pub fn eject_fifo_while<F>(
    engine: &mut dyn Engine,
    target: BlockId,
    held: &mut VecDeque<Agent>,
    hooks: &mut BlockHooks,
    mut is_due: F,
) -> AimResult<()>
where
    F: FnMut(&Agent) -> bool,
{
    while let Some(front) = held.front() {
        if !is_due(front) {
            break;
        }
        let agent = held.pop_front().expect("front just matched Some");
        let mut on_exit = |a: &mut Agent| hooks.fire_exit(a);
        match engine.try_eject(target, agent, Some(&mut on_exit)) {
            Ok(()) => continue,
            Err(rejected) if rejected.error.is_rejection() => {
                tracing::debug!(block = %target, reason = %rejected.error, "ejection rejected, retrying next tick");
                held.push_front(rejected.agent);
                break;
            }
            Err(rejected) => {
                tracing::error!(block = %target, reason = %rejected.error, "fatal error ejecting to downstream block");
                return Err(rejected.error);
            }
        }
    }
    Ok(())
}

/// Find `agent` inside `held` by id and deliver `event` to its own hooks,
/// the shared implementation of [`Block::deliver_event`] for every block
/// whose held collection is a plain `VecDeque<Agent>`.
pub fn deliver_in_held(held: &mut VecDeque<Agent>, agent: AgentId, event: &str, tick: Tick) -> bool {
    match held.iter_mut().find(|a| a.id == agent) {
        Some(found) => {
            found.on_event(event, tick);
            true
        }
        None => false,
    }
}
