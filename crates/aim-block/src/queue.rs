//! `Queue` — an unbounded FIFO buffer (spec §4.3).

use std::collections::VecDeque;

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, Tick};

use crate::block::{accept, deliver_in_held, eject_fifo_while, Block, BlockHooks};
use crate::engine::{Engine, Rejected};

/// Unbounded FIFO. `_tick` retries ejecting the head until the first
/// rejection, preserving arrival order for whatever sits downstream.
pub struct QueueBlock {
    id: BlockId,
    output: Option<BlockId>,
    held: VecDeque<Agent>,
    hooks: BlockHooks,
}

impl QueueBlock {
    pub fn new(id: BlockId) -> Self {
        Self { id, output: None, held: VecDeque::new(), hooks: BlockHooks::default() }
    }

    /// Attach user `on_enter`/`on_exit` callbacks (spec §4.2).
    pub fn with_hooks(mut self, hooks: BlockHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

impl Block for QueueBlock {
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
            .ok_or_else(|| AimError::Misconfigured(format!("Queue {} has no output connection", self.id)))?;
        eject_fifo_while(engine, output, &mut self.held, &mut self.hooks, |_| true)
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.output = Some(target);
    }

    fn deliver_event(&mut self, agent: AgentId, event: &str, tick: Tick) -> bool {
        deliver_in_held(&mut self.held, agent, event, tick)
    }
}
