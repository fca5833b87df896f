//! `Source` — spawns fresh agents each tick and feeds them into its sole
//! output (spec §4.3).

use aim_agent::Agent;
use aim_core::{AimError, AimResult, BlockId, SimRng, Tick};

use crate::block::Block;
use crate::engine::{Engine, Rejected};

/// Spawns `spawn_schedule(tick)` fresh agents per tick via `agent_class`,
/// feeding each one into the sole output. A rejected agent is dropped —
/// `Source` has no buffer of its own (spec §4.3, §7: "Sources drop instead
/// of retrying").
pub struct SourceBlock {
    id: BlockId,
    output: Option<BlockId>,
    spawn_schedule: Box<dyn FnMut(Tick, &mut SimRng) -> u32 + Send>,
    agent_class: Box<dyn FnMut(aim_core::AgentId, &mut SimRng) -> Agent + Send>,
}

impl SourceBlock {
    pub fn new(
        id: BlockId,
        spawn_schedule: impl FnMut(Tick, &mut SimRng) -> u32 + Send + 'static,
        agent_class: impl FnMut(aim_core::AgentId, &mut SimRng) -> Agent + Send + 'static,
    ) -> Self {
        Self { id, output: None, spawn_schedule: Box::new(spawn_schedule), agent_class: Box::new(agent_class) }
    }

    pub fn connect(&mut self, target: BlockId) {
        self.output = Some(target);
    }
}

impl Block for SourceBlock {
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
        agent: Agent,
        _on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected> {
        Err(Rejected::new(agent, AimError::Misconfigured("Source has no input port".into())))
    }

    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()> {
        let output = self
            .output
            .ok_or_else(|| AimError::Misconfigured(format!("Source {} has no output connection", self.id)))?;

        let tick = engine.current_tick();
        let k = (self.spawn_schedule)(tick, engine.rng());

        for _ in 0..k {
            let agent_id = engine.next_agent_id();
            let agent = (self.agent_class)(agent_id, engine.rng());
            match engine.try_eject(output, agent, None) {
                Ok(()) => {}
                Err(rejected) if rejected.error.is_rejection() => {
                    tracing::debug!(block = %self.id, agent = %agent_id, reason = %rejected.error, "source spawn dropped: downstream rejected");
                }
                Err(rejected) => return Err(rejected.error),
            }
        }
        Ok(())
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.output = Some(target);
    }
}
