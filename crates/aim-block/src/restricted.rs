//! `RestrictedAreaStart` / `RestrictedAreaEnd` — a bound pair bounding
//! concurrent occupancy of a zone (spec §4.3).
//!
//! The pair shares an `active_agents` counter through `Arc<AtomicU32>` rather
//! than a `Weak` back-reference — spec §9 calls this a "pure relation, not
//! an ownership edge," and neither side needs to outlive or drop the other.
//! `Arc`/`Atomic` rather than `Rc`/`Cell` solely because every `Block` is a
//! `Send` trait object (spec §9's "process-wide state" convention extends
//! to `Send` bounds elsewhere in this crate); the counter itself is only
//! ever touched from the simulator's own single-threaded call stack.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, Tick};

use crate::block::{accept, deliver_in_held, Block, BlockHooks};
use crate::engine::{Engine, Rejected};

/// Admits agents only while `active_agents < max_agents`; buffers the rest
/// in FIFO order until a slot frees up.
pub struct RestrictedAreaStart {
    id: BlockId,
    output: Option<BlockId>,
    max_agents: u32,
    active: Arc<AtomicU32>,
    held: VecDeque<Agent>,
    hooks: BlockHooks,
}

impl RestrictedAreaStart {
    pub fn new(id: BlockId, max_agents: u32) -> Self {
        Self {
            id,
            output: None,
            max_agents,
            active: Arc::new(AtomicU32::new(0)),
            held: VecDeque::new(),
            hooks: BlockHooks::default(),
        }
    }

    /// Attach user `on_enter`/`on_exit` callbacks (spec §4.2).
    pub fn with_hooks(mut self, hooks: BlockHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bind `end` to this Start's shared active-agent counter.
    pub fn set_end(&self, end: &mut RestrictedAreaEnd) {
        end.active = Some(Arc::clone(&self.active));
    }

    pub fn active_agents(&self) -> u32 {
        self.active.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }
}

impl Block for RestrictedAreaStart {
    fn id(&self) -> BlockId {
        self.id
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn take(
        &mut self,
        _engine: &mut dyn Engine,
        mut agent: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected> {
        if let Some(f) = on_exit {
            f(&mut agent);
        }
        accept(&mut agent, self.id, &mut self.hooks);
        self.held.push_back(agent);
        Ok(())
    }

    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()> {
        let output = self
            .output
            .ok_or_else(|| AimError::Misconfigured(format!("RestrictedAreaStart {} has no output connection", self.id)))?;

        while self.active.load(Ordering::Relaxed) < self.max_agents {
            let Some(agent) = self.held.pop_front() else { break };
            let mut on_exit = |a: &mut Agent| self.hooks.fire_exit(a);
            match engine.try_eject(output, agent, Some(&mut on_exit)) {
                Ok(()) => {
                    self.active.fetch_add(1, Ordering::Relaxed);
                }
                Err(rejected) if rejected.error.is_rejection() => {
                    self.held.push_front(rejected.agent);
                    break;
                }
                Err(rejected) => return Err(rejected.error),
            }
        }
        Ok(())
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.output = Some(target);
    }

    fn deliver_event(&mut self, agent: AgentId, event: &str, tick: Tick) -> bool {
        deliver_in_held(&mut self.held, agent, event, tick)
    }
}

/// Decrements the paired Start's counter and forwards the agent onward. No
/// internal buffering: if the forward rejects, the counter is left
/// untouched and the error propagates to whatever called `take`.
pub struct RestrictedAreaEnd {
    id: BlockId,
    output: Option<BlockId>,
    active: Option<Arc<AtomicU32>>,
}

impl RestrictedAreaEnd {
    pub fn new(id: BlockId) -> Self {
        Self { id, output: None, active: None }
    }
}

impl Block for RestrictedAreaEnd {
    fn id(&self) -> BlockId {
        self.id
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn take(
        &mut self,
        engine: &mut dyn Engine,
        agent: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected> {
        let Some(active) = self.active.clone() else {
            return Err(Rejected::new(
                agent,
                AimError::Misconfigured(format!("RestrictedAreaEnd {} has no paired Start", self.id)),
            ));
        };
        let Some(output) = self.output else {
            return Err(Rejected::new(
                agent,
                AimError::Misconfigured(format!("RestrictedAreaEnd {} has no output connection", self.id)),
            ));
        };
        engine.try_eject(output, agent, on_exit)?;
        active.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1))).ok();
        Ok(())
    }

    fn tick(&mut self, _engine: &mut dyn Engine) -> AimResult<()> {
        Ok(())
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.output = Some(target);
    }
}
