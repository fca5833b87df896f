//! `If` — a binary branch on a user-supplied condition (spec §4.3).

use aim_agent::Agent;
use aim_core::{AimError, AimResult, BlockId};

use crate::block::Block;
use crate::engine::{Engine, Rejected};

/// On `take`, evaluates `condition(agent)`: `true` routes to slot 0,
/// `false` to slot 1. No internal buffering — if the chosen slot is unwired
/// or its downstream rejects, `If` itself rejects, propagating the same
/// error upstream unchanged (spec §4.3).
pub struct IfBlock {
    id: BlockId,
    slot0: Option<BlockId>,
    slot1: Option<BlockId>,
    condition: Box<dyn Fn(&Agent) -> bool + Send>,
}

impl IfBlock {
    pub fn new(id: BlockId, condition: impl Fn(&Agent) -> bool + Send + 'static) -> Self {
        Self { id, slot0: None, slot1: None, condition: Box::new(condition) }
    }

    /// Wire the `true` branch (slot 0).
    pub fn connect_first(&mut self, target: BlockId) {
        self.slot0 = Some(target);
    }

    /// Wire the `false` branch (slot 1).
    pub fn connect_second(&mut self, target: BlockId) {
        self.slot1 = Some(target);
    }
}

impl Block for IfBlock {
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
        let slot = if (self.condition)(&agent) { 0 } else { 1 };
        let target = match slot {
            0 => self.slot0,
            _ => self.slot1,
        };
        let Some(target) = target else {
            return Err(Rejected::new(
                agent,
                AimError::Misconfigured(format!("If {} has no connection at slot {slot}", self.id)),
            ));
        };
        engine.try_eject(target, agent, on_exit)
    }

    fn tick(&mut self, _engine: &mut dyn Engine) -> AimResult<()> {
        Ok(())
    }

    fn connect(&mut self, slot: usize, target: BlockId) {
        match slot {
            0 => self.slot0 = Some(target),
            _ => self.slot1 = Some(target),
        }
    }
}
