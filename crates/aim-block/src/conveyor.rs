//! `ConveyorBlock` / `ConveyorExit` — the spatial blocks bridging the block
//! graph and a registered [`SpaceManager`] (spec §4.3, §4.5).

use std::collections::VecDeque;

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, EntityId, Tick};

use crate::block::{accept, deliver_in_held, Block, BlockHooks};
use crate::engine::{Engine, Rejected};

/// On `take`, registers the agent with the space at `space_slot` for
/// transit from `start_entity` to `end_entity`. Rejects if registration
/// fails (collision, unreachable path) **or** if this block has already
/// admitted an agent during the current tick — the one-agent-per-tick
/// entry rule guards the entry interval from colliding with itself before
/// the space has had a chance to advance anyone.
///
/// `_tick` ejects agents whose movement is complete, FIFO; unregistration
/// from the space happens only after a successful downstream `take`, never
/// before.
pub struct ConveyorBlock {
    id: BlockId,
    output: Option<BlockId>,
    space_slot: usize,
    start_entity: EntityId,
    end_entity: EntityId,
    held: VecDeque<Agent>,
    last_entry_tick: Option<Tick>,
    hooks: BlockHooks,
}

impl ConveyorBlock {
    pub fn new(id: BlockId, space_slot: usize, start_entity: EntityId, end_entity: EntityId) -> Self {
        Self {
            id,
            output: None,
            space_slot,
            start_entity,
            end_entity,
            held: VecDeque::new(),
            last_entry_tick: None,
            hooks: BlockHooks::default(),
        }
    }

    /// Attach user `on_enter`/`on_exit` callbacks (spec §4.2).
    pub fn with_hooks(mut self, hooks: BlockHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }
}

impl Block for ConveyorBlock {
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
        mut agent: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected> {
        let now = engine.current_tick();
        if self.last_entry_tick == Some(now) {
            return Err(Rejected::reason(
                agent,
                format!("ConveyorBlock {} already admitted an agent this tick", self.id),
            ));
        }

        let space = match engine.space_mut(self.space_slot) {
            Ok(space) => space,
            Err(e) => return Err(Rejected::new(agent, e)),
        };
        match space.register(agent.id, agent.length, self.start_entity, self.end_entity) {
            Ok(path) => {
                agent.space_state.entity = Some(self.start_entity);
                agent.space_state.path = path;
                if let Some(f) = on_exit {
                    f(&mut agent);
                }
                accept(&mut agent, self.id, &mut self.hooks);
                self.last_entry_tick = Some(now);
                self.held.push_back(agent);
                Ok(())
            }
            Err(e) => Err(Rejected::new(agent, e)),
        }
    }

    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()> {
        let output = self
            .output
            .ok_or_else(|| AimError::Misconfigured(format!("ConveyorBlock {} has no output connection", self.id)))?;

        loop {
            let Some(front) = self.held.front() else { break };
            let complete = engine.space_mut(self.space_slot)?.is_movement_complete(front.id);
            if !complete {
                break;
            }

            let mut agent = self.held.pop_front().expect("front just matched Some");
            let agent_id = agent.id;
            if let Some(snapshot) = engine.space_mut(self.space_slot)?.snapshot(agent_id) {
                agent.space_state.entity = Some(snapshot.entity);
                agent.space_state.progress_on_entity = snapshot.progress_on_entity;
                agent.space_state.progress_on_path = snapshot.progress_on_path;
                agent.space_state.path = snapshot.path;
            }

            let mut on_exit = |a: &mut Agent| self.hooks.fire_exit(a);
            match engine.try_eject(output, agent, Some(&mut on_exit)) {
                Ok(()) => {
                    engine.space_mut(self.space_slot)?.unregister(agent_id);
                }
                Err(rejected) if rejected.error.is_rejection() => {
                    tracing::debug!(block = %self.id, reason = %rejected.error, "conveyor exit rejected, retrying next tick");
                    self.held.push_front(rejected.agent);
                    break;
                }
                Err(rejected) => {
                    tracing::error!(block = %self.id, reason = %rejected.error, "fatal error ejecting from conveyor");
                    return Err(rejected.error);
                }
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

/// Pass-through block marking "agent no longer needs a spatial slot." Does
/// not itself unregister from any space — `ConveyorBlock` already did that
/// immediately after the successful `take` that produced this ejection.
pub struct ConveyorExit {
    id: BlockId,
    output: Option<BlockId>,
}

impl ConveyorExit {
    pub fn new(id: BlockId) -> Self {
        Self { id, output: None }
    }
}

impl Block for ConveyorExit {
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
        let Some(output) = self.output else {
            return Err(Rejected::new(
                agent,
                AimError::Misconfigured(format!("ConveyorExit {} has no output connection", self.id)),
            ));
        };
        engine.try_eject(output, agent, on_exit)
    }

    fn tick(&mut self, _engine: &mut dyn Engine) -> AimResult<()> {
        Ok(())
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.output = Some(target);
    }
}
