//! `Gate` — an openable/closable buffer (spec §4.3, §9: `release_mode`
//! default `"one"`, `"all"` available as an option).

use std::collections::VecDeque;

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, Tick};

use crate::block::{accept, deliver_in_held, eject_fifo_while, Block, BlockHooks};
use crate::engine::{Engine, Rejected};

/// Whether the gate is currently admitting ejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    Closed,
}

/// How many agents an open gate releases per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseMode {
    /// At most one ejection per tick.
    One,
    /// Eject until the downstream rejects or the buffer is empty.
    All,
}

/// Accumulates agents while `Closed`; while `Open`, ejects per
/// `release_mode`. `toggle` flips `Open`/`Closed`.
pub struct GateBlock {
    id: BlockId,
    output: Option<BlockId>,
    state: GateState,
    release_mode: ReleaseMode,
    held: VecDeque<Agent>,
    hooks: BlockHooks,
}

impl GateBlock {
    pub fn new(id: BlockId, initial: GateState, release_mode: ReleaseMode) -> Self {
        Self {
            id,
            output: None,
            state: initial,
            release_mode,
            held: VecDeque::new(),
            hooks: BlockHooks::default(),
        }
    }

    /// Attach user `on_enter`/`on_exit` callbacks (spec §4.2).
    pub fn with_hooks(mut self, hooks: BlockHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn toggle(&mut self) {
        self.state = match self.state {
            GateState::Open => GateState::Closed,
            GateState::Closed => GateState::Open,
        };
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }
}

impl Block for GateBlock {
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
        if self.state == GateState::Closed {
            return Ok(());
        }
        let output = self
            .output
            .ok_or_else(|| AimError::Misconfigured(format!("Gate {} has no output connection", self.id)))?;

        match self.release_mode {
            ReleaseMode::All => eject_fifo_while(engine, output, &mut self.held, &mut self.hooks, |_| true),
            ReleaseMode::One => {
                let Some(agent) = self.held.pop_front() else { return Ok(()) };
                let mut on_exit = |a: &mut Agent| self.hooks.fire_exit(a);
                match engine.try_eject(output, agent, Some(&mut on_exit)) {
                    Ok(()) => Ok(()),
                    Err(rejected) if rejected.error.is_rejection() => {
                        self.held.push_front(rejected.agent);
                        Ok(())
                    }
                    Err(rejected) => Err(rejected.error),
                }
            }
        }
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.output = Some(target);
    }

    fn deliver_event(&mut self, agent: AgentId, event: &str, tick: Tick) -> bool {
        deliver_in_held(&mut self.held, agent, event, tick)
    }
}
