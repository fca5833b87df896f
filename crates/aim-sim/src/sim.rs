//! The `Simulator` struct and its five-phase tick loop (spec §4.1).

use aim_agent::Agent;
use aim_block::{Block, Engine, Rejected};
use aim_core::{AgentId, AimError, AimResult, BlockId, SimConfig, SimRng, Tick};
use aim_events::EventBus;
use aim_schedule::ScheduleQueue;
use aim_spatial::SpaceManager;

use crate::observer::SimObserver;

/// Owns every block, every registered space, the event bus, the scheduler,
/// and the single global RNG. Drives the tick loop; this is the one type in
/// the workspace that implements [`Engine`], the narrow capability surface
/// blocks call back into from `take`/`tick`.
pub struct Simulator {
    config: SimConfig,
    current_tick: Tick,
    rng: SimRng,
    next_agent_id: u32,

    /// Registration-order block table; `BlockId(i)` indexes slot `i`. Never
    /// shrinks — blocks are never destroyed (spec §3: "created →
    /// registered ... → never destroyed"). A slot is briefly `None` while
    /// its block is "checked out" during its own `take`/`tick` call, so the
    /// block can be handed `&mut self` as `&mut dyn Engine` without aliasing
    /// its own storage slot.
    blocks: Vec<Option<Box<dyn Block>>>,

    /// Registered spatial substrates, indexed by the `space_slot` a
    /// `ConveyorBlock` was constructed with.
    spaces: Vec<Box<dyn SpaceManager>>,

    bus: EventBus,
    schedule: ScheduleQueue<Simulator>,
}

impl Simulator {
    pub(crate) fn new(config: SimConfig) -> Self {
        let rng = SimRng::new(config.seed);
        Self {
            config,
            current_tick: Tick::ZERO,
            rng,
            next_agent_id: 0,
            blocks: Vec::new(),
            spaces: Vec::new(),
            bus: EventBus::new(),
            schedule: ScheduleQueue::new(),
        }
    }

    // ── Construction-time wiring ───────────────────────────────────────────

    /// Register a new block. `make` receives the `BlockId` the simulator has
    /// reserved for it — spec §6's "constructors ... taking a simulator
    /// handle" is realized here as "constructors taking the id the
    /// simulator hands them," since a block never needs to call back into
    /// the simulator during its own construction, only during `take`/`tick`.
    pub fn add_block<B, F>(&mut self, make: F) -> BlockId
    where
        B: Block + 'static,
        F: FnOnce(BlockId) -> B,
    {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Some(Box::new(make(id))));
        id
    }

    /// Wire `source`'s output `slot` to `target`. Thin convenience over
    /// `Block::connect` for callers that don't need the block reference
    /// directly.
    ///
    /// # Errors
    /// `AimError::BlockNotFound` if `source` was never registered.
    pub fn connect(&mut self, source: BlockId, slot: usize, target: BlockId) -> AimResult<()> {
        let block = self
            .blocks
            .get_mut(source.index())
            .and_then(Option::as_mut)
            .ok_or(AimError::BlockNotFound(source))?;
        block.connect(slot, target);
        Ok(())
    }

    /// Register a spatial substrate, returning the slot index future
    /// `ConveyorBlock`s should be constructed with.
    pub fn add_space(&mut self, space: Box<dyn SpaceManager>) -> usize {
        self.spaces.push(space);
        self.spaces.len() - 1
    }

    /// Schedule `action` to fire once, `delay_ticks` from now.
    ///
    /// # Errors
    /// Never fails for a one-shot callback (the `period >= 1` invariant
    /// only binds recurring callbacks) — the `AimResult` return exists so
    /// this shares a signature shape with
    /// [`schedule_recurring`][Self::schedule_recurring].
    pub fn schedule_event<F>(&mut self, delay_ticks: u64, action: F) -> AimResult<u64>
    where
        F: FnMut(Tick, &mut Simulator) + Send + 'static,
    {
        let due = self.current_tick.offset(delay_ticks);
        self.schedule.schedule(due, false, 1, action)
    }

    /// Schedule `action` to fire `delay_ticks` from now, then every `period`
    /// ticks thereafter.
    ///
    /// # Errors
    /// `AimError::Invariant` if `period == 0` (spec §3).
    pub fn schedule_recurring<F>(&mut self, delay_ticks: u64, period: u64, action: F) -> AimResult<u64>
    where
        F: FnMut(Tick, &mut Simulator) + Send + 'static,
    {
        let due = self.current_tick.offset(delay_ticks);
        self.schedule.schedule(due, true, period, action)
    }

    /// The tick currently being processed (or the next to be, between
    /// `run` calls). Shadows [`Engine::current_tick`] with an inherent
    /// method of the same name so callers outside `aim-block` don't need
    /// the `Engine` trait in scope just to read it.
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Read-only access to a registered block, for observers and tests that
    /// need to downcast to a concrete type (e.g. `SinkBlock::count`) between
    /// `run` calls (spec §6: observers see a consistent snapshot at tick
    /// boundaries).
    pub fn block(&self, id: BlockId) -> Option<&dyn Block> {
        self.blocks.get(id.index()).and_then(Option::as_ref).map(Box::as_ref)
    }

    /// Mutable counterpart to [`block`][Self::block].
    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut dyn Block> {
        self.blocks.get_mut(id.index()).and_then(Option::as_mut).map(Box::as_mut)
    }

    // ── The tick loop ──────────────────────────────────────────────────────

    /// Run from the current tick to `config.max_ticks`, calling `observer`
    /// hooks at tick boundaries (spec §4.1).
    pub fn run(&mut self, observer: &mut dyn SimObserver) -> AimResult<()> {
        while self.current_tick.0 < self.config.max_ticks {
            let now = self.current_tick;
            observer.on_tick_start(now);

            self.fire_due_callbacks(now);
            self.advance_spaces();
            self.deliver_pending_events(now);
            self.tick_blocks()?;

            observer.on_tick_end(now);
            self.current_tick = now.offset(1);
        }
        observer.on_sim_end(self.current_tick);
        Ok(())
    }

    /// Phase ①: fire every scheduled callback due by `now`, in `(due_tick,
    /// seq)` order; re-insert recurring callbacks at `due_tick + period`.
    /// Callbacks scheduled re-entrantly during this phase are never fired
    /// in the same call — they land in the live queue for a later tick
    /// (spec §4.1, enforced by [`ScheduleQueue::take_due`]).
    fn fire_due_callbacks(&mut self, now: Tick) {
        let due = self.schedule.take_due(now);
        for mut cb in due {
            let recurring = cb.recurring;
            cb.fire(now, self);
            if recurring {
                self.schedule.reinsert_recurring(cb);
            }
        }
    }

    /// Phase ②: advance every registered space by one tick. Spaces progress
    /// their own agents; they never cross block boundaries (spec §4.1).
    fn advance_spaces(&mut self) {
        for space in self.spaces.iter_mut() {
            space.update(1.0);
        }
    }

    /// Phase ③: drain the bus's pending buffer and deliver each entry to
    /// whichever block currently holds the subscriber. An `Agent` lives
    /// inside whatever block owns it (spec §3's ownership invariant is
    /// move-semantics, not indexing), so delivery means scanning registered
    /// blocks in order until one claims the agent — the first to return
    /// `true` stops the scan, since an agent is owned by exactly one block
    /// at a time.
    fn deliver_pending_events(&mut self, now: Tick) {
        let mut due: Vec<(AgentId, String)> = Vec::new();
        self.bus.deliver_pending(|agent, event| due.push((agent, event.to_string())));

        for (agent, event) in due {
            for block in self.blocks.iter_mut().flatten() {
                if block.deliver_event(agent, &event, now) {
                    break;
                }
            }
        }
    }

    /// Phase ④: tick every registered block in registration order. Each
    /// block is checked out of its slot for the duration of its own call so
    /// it can be handed `self` (as `&mut dyn Engine`) without aliasing.
    fn tick_blocks(&mut self) -> AimResult<()> {
        for idx in 0..self.blocks.len() {
            let Some(mut block) = self.blocks[idx].take() else { continue };
            let result = block.tick(self);
            self.blocks[idx] = Some(block);
            result?;
        }
        Ok(())
    }
}

impl Engine for Simulator {
    fn current_tick(&self) -> Tick {
        self.current_tick
    }

    fn rng(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    fn next_agent_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    fn try_eject(
        &mut self,
        target: BlockId,
        agent: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected> {
        let Some(slot) = self.blocks.get_mut(target.index()) else {
            return Err(Rejected::new(agent, AimError::BlockNotFound(target)));
        };
        let Some(mut block) = slot.take() else {
            return Err(Rejected::new(
                agent,
                AimError::Invariant(format!("block {target} re-entered while already checked out")),
            ));
        };
        let result = block.take(self, agent, on_exit);
        self.blocks[target.index()] = Some(block);
        result
    }

    fn subscribe(&mut self, agent: AgentId, event: &str) -> AimResult<()> {
        self.bus.subscribe(agent, event)
    }

    fn emit_event(&mut self, event: &str, emitter: AgentId) -> AimResult<()> {
        self.bus.emit(event, emitter)
    }

    fn space_mut(&mut self, slot: usize) -> AimResult<&mut dyn SpaceManager> {
        self.spaces
            .get_mut(slot)
            .map(|b| b.as_mut() as &mut dyn SpaceManager)
            .ok_or_else(|| AimError::Misconfigured(format!("no space registered at slot {slot}")))
    }
}
