//! `Delay` — holds each accepted agent for a fixed number of ticks, or until
//! it receives a named event (spec §4.3).

use std::collections::VecDeque;

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, Tick};

use crate::block::{accept, Block, BlockHooks};
use crate::engine::{Engine, Rejected};

/// Either a fixed tick delay or "wait for this exact event," mirroring the
/// original API's `delay_ticks = -1` + `release_event` combination as two
/// distinct constructors rather than one sentinel-carrying one.
enum ReleaseMode {
    Ticks(u64),
    Event(String),
}

struct Held {
    agent: Agent,
    release_tick: Option<Tick>,
    ready: bool,
}

/// On `take`, records `(agent, release_tick = current_tick + delay_ticks)`;
/// `_tick` ejects any agent whose `release_tick <= current_tick`, FIFO. In
/// event mode, agents are held until their own `on_event` hook observes the
/// configured `release_event` — delivered via [`Block::deliver_event`], the
/// same subscription mechanism any agent uses (spec §4.3, §4.4).
pub struct DelayBlock {
    id: BlockId,
    output: Option<BlockId>,
    mode: ReleaseMode,
    held: VecDeque<Held>,
    hooks: BlockHooks,
}

impl DelayBlock {
    /// Delay every accepted agent by exactly `delay_ticks` before the first
    /// ejection attempt.
    pub fn ticks(id: BlockId, delay_ticks: u64) -> Self {
        Self {
            id,
            output: None,
            mode: ReleaseMode::Ticks(delay_ticks),
            held: VecDeque::new(),
            hooks: BlockHooks::default(),
        }
    }

    /// Hold every accepted agent until it receives the exact event
    /// `release_event`.
    pub fn on_event(id: BlockId, release_event: impl Into<String>) -> Self {
        Self {
            id,
            output: None,
            mode: ReleaseMode::Event(release_event.into()),
            held: VecDeque::new(),
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

impl Block for DelayBlock {
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
        if let Some(f) = on_exit {
            f(&mut agent);
        }
        accept(&mut agent, self.id, &mut self.hooks);
        let entry = match &self.mode {
            ReleaseMode::Ticks(delay) => {
                Held { release_tick: Some(engine.current_tick().offset(*delay)), ready: false, agent }
            }
            ReleaseMode::Event(event) => {
                if let Err(e) = engine.subscribe(agent.id, event) {
                    return Err(Rejected::new(agent, e));
                }
                Held { release_tick: None, ready: false, agent }
            }
        };
        self.held.push_back(entry);
        Ok(())
    }

    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()> {
        let output = self
            .output
            .ok_or_else(|| AimError::Misconfigured(format!("Delay {} has no output connection", self.id)))?;
        let now = engine.current_tick();

        while let Some(front) = self.held.front() {
            let due = match front.release_tick {
                Some(t) => t <= now,
                None => front.ready,
            };
            if !due {
                break;
            }
            let entry = self.held.pop_front().expect("front just matched Some");
            let release_tick = entry.release_tick;
            let ready = entry.ready;
            let mut on_exit = |a: &mut Agent| self.hooks.fire_exit(a);
            match engine.try_eject(output, entry.agent, Some(&mut on_exit)) {
                Ok(()) => continue,
                Err(rejected) if rejected.error.is_rejection() => {
                    tracing::debug!(block = %self.id, reason = %rejected.error, "delay release rejected, retrying next tick");
                    self.held.push_front(Held { agent: rejected.agent, release_tick, ready });
                    break;
                }
                Err(rejected) => {
                    tracing::error!(block = %self.id, reason = %rejected.error, "fatal error releasing from delay");
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
        let is_release_event = matches!(&self.mode, ReleaseMode::Event(e) if e == event);
        match self.held.iter_mut().find(|h| h.agent.id == agent) {
            Some(found) => {
                found.agent.on_event(event, tick);
                if is_release_event {
                    found.ready = true;
                }
                true
            }
            None => false,
        }
    }
}
