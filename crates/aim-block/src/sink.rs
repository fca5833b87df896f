//! `Sink` — a terminal block (spec §4.3).

use aim_agent::Agent;
use aim_core::{AimResult, BlockId};

use crate::block::Block;
use crate::engine::{Engine, Rejected};

/// Accepts every agent unconditionally, incrementing `count` and dropping
/// the agent's value — this is where an agent's lifecycle ends.
pub struct SinkBlock {
    id: BlockId,
    count: u64,
}

impl SinkBlock {
    pub fn new(id: BlockId) -> Self {
        Self { id, count: 0 }
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Block for SinkBlock {
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
        drop(agent);
        self.count += 1;
        Ok(())
    }

    fn tick(&mut self, _engine: &mut dyn Engine) -> AimResult<()> {
        Ok(())
    }

    fn connect(&mut self, _slot: usize, _target: BlockId) {}
}
