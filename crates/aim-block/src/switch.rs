//! `Switch` — routes by a user-supplied key function (spec §4.3).

use std::collections::HashMap;

use aim_agent::Agent;
use aim_core::{AimError, AimResult, BlockId};

use crate::block::Block;
use crate::engine::{Engine, Rejected};

/// On `take`, evaluates `key_func(agent)` and looks up the output wired to
/// that key via [`SwitchBlock::connect_key`]. A key with no connection is a
/// misconfiguration (spec §7 classifies "a Switch routed to a key with no
/// connection" as class 2, fatal) — not a retryable rejection, since no
/// amount of waiting makes an unwired key become wired.
pub struct SwitchBlock {
    id: BlockId,
    key_func: Box<dyn Fn(&Agent) -> String + Send>,
    outputs: HashMap<String, BlockId>,
}

impl SwitchBlock {
    pub fn new(id: BlockId, key_func: impl Fn(&Agent) -> String + Send + 'static) -> Self {
        Self { id, key_func: Box::new(key_func), outputs: HashMap::new() }
    }

    /// Wire the output for `key`.
    pub fn connect_key(&mut self, key: impl Into<String>, target: BlockId) {
        self.outputs.insert(key.into(), target);
    }
}

impl Block for SwitchBlock {
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
        let key = (self.key_func)(&agent);
        let Some(&target) = self.outputs.get(&key) else {
            return Err(Rejected::new(
                agent,
                AimError::Misconfigured(format!("Switch {} has no connection for key {key:?}", self.id)),
            ));
        };
        engine.try_eject(target, agent, on_exit)
    }

    fn tick(&mut self, _engine: &mut dyn Engine) -> AimResult<()> {
        Ok(())
    }

    /// Unused — `Switch` wiring goes through [`SwitchBlock::connect_key`],
    /// matching the spec's dedicated `switch.connect(key, block)` surface
    /// rather than the single-/double-slot `connect(slot, target)` shape
    /// other blocks use.
    fn connect(&mut self, _slot: usize, _target: BlockId) {}
}
