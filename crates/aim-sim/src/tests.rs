//! End-to-end tick-loop tests, each wiring a small block graph and asserting
//! on the result after `run()` — the literal scenarios from spec §8.

#[cfg(test)]
mod scenarios {
    use aim_agent::Agent;
    use aim_block::{DelayBlock, GateBlock, GateState, IfBlock, QueueBlock, ReleaseMode, SinkBlock, SourceBlock};
    use aim_core::{BlockId, SimConfig};

    use crate::{NoopObserver, Simulator, SimulatorBuilder};

    fn sink_count(sim: &Simulator, id: BlockId) -> u64 {
        sim.block(id).unwrap().as_any().downcast_ref::<SinkBlock>().unwrap().count()
    }

    /// Source(spawn 1/tick) -> Sink, run 10 ticks -> sink sees 10 agents.
    #[test]
    fn source_to_sink_spawns_one_per_tick() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(1, 10)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let source =
            sim.add_block(|id| Box::new(SourceBlock::new(id, |_tick, _rng| 1, |id, _rng| Agent::new(id, 1.0, 1.0))));
        sim.connect(source, 0, sink).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink), 10);
    }

    /// Source -> Delay(5) -> Sink, a single agent spawned only at tick 0
    /// reaches the sink by the end of a 10-tick run (held through ticks
    /// 0..5, ejected once `release_tick <= now`).
    #[test]
    fn source_to_delay_to_sink_releases_after_fixed_ticks() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(2, 10)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let delay = sim.add_block(|id| Box::new(DelayBlock::ticks(id, 5)));
        let source = sim.add_block(|id| {
            Box::new(SourceBlock::new(
                id,
                |tick, _rng| if tick.0 == 0 { 1 } else { 0 },
                |id, _rng| Agent::new(id, 1.0, 1.0),
            ))
        });
        sim.connect(source, 0, delay).unwrap();
        sim.connect(delay, 0, sink).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink), 1);
    }

    /// The delayed agent sits in the `Delay` block until its release tick;
    /// a run that stops short of the delay never sees it at the sink.
    #[test]
    fn delay_holds_the_agent_until_its_release_tick() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(2, 3)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let delay = sim.add_block(|id| Box::new(DelayBlock::ticks(id, 5)));
        let source = sim.add_block(|id| {
            Box::new(SourceBlock::new(
                id,
                |tick, _rng| if tick.0 == 0 { 1 } else { 0 },
                |id, _rng| Agent::new(id, 1.0, 1.0),
            ))
        });
        sim.connect(source, 0, delay).unwrap();
        sim.connect(delay, 0, sink).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink), 0);
    }

    /// Source -> If(flag) -> {Sink_A, Sink_B}, three agents whose flag
    /// alternates true/false/true split 2-to-1 across the branches.
    #[test]
    fn source_to_if_splits_by_condition() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(3, 3)).build();
        let sink_a = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let sink_b = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let branch = sim.add_block(|id| Box::new(IfBlock::new(id, |agent: &Agent| agent.id.0 % 2 == 0)));
        // Spawns one agent a tick for three ticks: ids 0, 1, 2 -> flags
        // true, false, true.
        let source = sim.add_block(|id| {
            Box::new(SourceBlock::new(
                id,
                |tick, _rng| if tick.0 < 3 { 1 } else { 0 },
                |id, _rng| Agent::new(id, 1.0, 1.0),
            ))
        });
        sim.connect(source, 0, branch).unwrap();
        sim.connect(branch, 0, sink_a).unwrap();
        sim.connect(branch, 1, sink_b).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink_a), 2);
        assert_eq!(sink_count(&sim, sink_b), 1);
    }

    /// Source -> Gate(closed, release_mode="one") -> Sink. The gate starts
    /// closed, buffering every spawn; a scheduled callback opens it at tick
    /// 3. With `ReleaseMode::One` the open gate releases at most one agent
    /// per tick, so by the end of a 5-tick run exactly two have gotten
    /// through (ticks 3 and 4).
    #[test]
    fn source_to_closed_gate_releases_one_per_tick_after_scheduled_toggle() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(4, 5)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let gate = sim.add_block(|id| Box::new(GateBlock::new(id, GateState::Closed, ReleaseMode::One)));
        let source =
            sim.add_block(|id| Box::new(SourceBlock::new(id, |_tick, _rng| 1, |id, _rng| Agent::new(id, 1.0, 1.0))));
        sim.connect(source, 0, gate).unwrap();
        sim.connect(gate, 0, sink).unwrap();

        sim.schedule_event(3, move |_tick, sim: &mut Simulator| {
            let gate = sim.block_mut(gate).unwrap().as_any_mut().downcast_mut::<GateBlock>().unwrap();
            gate.toggle();
        })
        .unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink), 2);
    }

    /// A closed gate with `ReleaseMode::All` drains its whole buffer the
    /// tick it opens, rather than one per tick.
    #[test]
    fn closed_gate_release_all_drains_whole_buffer_on_open() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(5, 5)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let gate = sim.add_block(|id| Box::new(GateBlock::new(id, GateState::Closed, ReleaseMode::All)));
        let source = sim.add_block(|id| {
            Box::new(SourceBlock::new(
                id,
                |tick, _rng| if tick.0 < 3 { 1 } else { 0 },
                |id, _rng| Agent::new(id, 1.0, 1.0),
            ))
        });
        sim.connect(source, 0, gate).unwrap();
        sim.connect(gate, 0, sink).unwrap();

        sim.schedule_event(3, move |_tick, sim: &mut Simulator| {
            let gate = sim.block_mut(gate).unwrap().as_any_mut().downcast_mut::<GateBlock>().unwrap();
            gate.toggle();
        })
        .unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink), 3);
    }

    /// A Queue ahead of a Sink is pure pass-through: every agent that enters
    /// a tick is ejected during that same tick's block phase, so nothing
    /// accumulates across a run with no other backpressure.
    #[test]
    fn queue_drains_fully_each_tick_with_no_backpressure() {
        let mut sim = SimulatorBuilder::new(SimConfig::new(6, 5)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let queue = sim.add_block(|id| Box::new(QueueBlock::new(id)));
        let source =
            sim.add_block(|id| Box::new(SourceBlock::new(id, |_tick, _rng| 2, |id, _rng| Agent::new(id, 1.0, 1.0))));
        sim.connect(source, 0, queue).unwrap();
        sim.connect(queue, 0, sink).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(sink_count(&sim, sink), 8);
    }
}

#[cfg(test)]
mod tick_loop {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use aim_agent::{Agent, AgentHooks};
    use aim_block::{DelayBlock, Engine, SinkBlock, SourceBlock};
    use aim_core::{AgentId, BlockId, SimConfig, Tick};

    use crate::{NoopObserver, SimObserver, Simulator, SimulatorBuilder};

    /// `run` executes exactly `t = 0..max_ticks` and nothing past it.
    #[test]
    fn run_stops_at_configured_max_ticks() {
        struct CountTicks(u64);
        impl SimObserver for CountTicks {
            fn on_tick_start(&mut self, _tick: Tick) {
                self.0 += 1;
            }
        }

        let mut sim = SimulatorBuilder::new(SimConfig::new(7, 6)).build();
        let mut observer = CountTicks(0);
        sim.run(&mut observer).unwrap();

        assert_eq!(observer.0, 6);
        assert_eq!(sim.current_tick(), Tick(6));
    }

    /// Events emitted during tick t are delivered during tick t+1, never
    /// the same tick (spec §4.1, §4.4's two-phase bus): a `Delay` block
    /// waiting on a named event only releases its agent once that event has
    /// actually been through a full delivery phase.
    #[test]
    fn emitted_event_is_delivered_on_the_following_tick() {
        struct RecordLastEventTick(Arc<AtomicU64>);
        impl AgentHooks for RecordLastEventTick {
            fn on_event(&mut self, _event: &str, tick: Tick) {
                self.0.store(tick.0, Ordering::SeqCst);
            }
        }

        let mut sim = SimulatorBuilder::new(SimConfig::new(8, 5)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let delay = sim.add_block(|id| Box::new(DelayBlock::on_event(id, "go")));
        let delivered_at = Arc::new(AtomicU64::new(u64::MAX));
        let delivered_at_for_hook = Arc::clone(&delivered_at);
        let source = sim.add_block(|id| {
            Box::new(SourceBlock::new(
                id,
                |tick, _rng| if tick.0 == 0 { 1 } else { 0 },
                move |id, _rng| {
                    Agent::new(id, 1.0, 1.0)
                        .with_hooks(Box::new(RecordLastEventTick(Arc::clone(&delivered_at_for_hook))))
                },
            ))
        });
        sim.connect(source, 0, delay).unwrap();
        sim.connect(delay, 0, sink).unwrap();

        // Emit "go" during tick 1's block phase — delivery must land on
        // tick 2, never tick 1 itself.
        sim.schedule_event(1, |_tick, sim: &mut Simulator| {
            Engine::emit_event(sim, "go", AgentId(0)).unwrap();
        })
        .unwrap();

        sim.run(&mut NoopObserver).unwrap();

        assert_eq!(delivered_at.load(Ordering::SeqCst), 2);
        let sink_count = sim.block(sink).unwrap().as_any().downcast_ref::<SinkBlock>().unwrap().count();
        assert_eq!(sink_count, 1);
    }

    /// A callback scheduled re-entrantly (from inside another callback
    /// firing this same tick, with `delay_ticks = 0`) never fires in that
    /// same tick — it lands in the live queue and is only picked up by a
    /// later `take_due` call (spec §4.1).
    #[test]
    fn reentrant_schedule_lands_on_a_later_tick() {
        let fire_ticks = Arc::new(std::sync::Mutex::new(Vec::<u64>::new()));
        let fire_ticks_for_outer = Arc::clone(&fire_ticks);

        let mut sim = SimulatorBuilder::new(SimConfig::new(9, 4)).build();
        sim.schedule_event(0, move |tick, sim: &mut Simulator| {
            fire_ticks_for_outer.lock().unwrap().push(tick.0);
            let fire_ticks_for_inner = Arc::clone(&fire_ticks_for_outer);
            sim.schedule_event(0, move |tick, _sim| {
                fire_ticks_for_inner.lock().unwrap().push(tick.0);
            })
            .unwrap();
        })
        .unwrap();

        sim.run(&mut NoopObserver).unwrap();

        // The outer callback fires at tick 0; the one it schedules with
        // delay 0 can only fire at tick 1 or later, never tick 0 again.
        assert_eq!(*fire_ticks.lock().unwrap(), vec![0, 1]);
    }

    /// A downstream block that never accepts leaves every agent buffered
    /// upstream indefinitely — nothing is silently dropped (spec §7, class
    /// 1: the agent is always retained for a future retry).
    #[test]
    fn agents_accumulate_upstream_while_downstream_stays_closed() {
        use aim_block::GateBlock;
        use aim_block::{GateState, ReleaseMode};

        let mut sim = SimulatorBuilder::new(SimConfig::new(10, 3)).build();
        let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
        let gate = sim.add_block(|id| Box::new(GateBlock::new(id, GateState::Closed, ReleaseMode::One)));
        let source =
            sim.add_block(|id| Box::new(SourceBlock::new(id, |_tick, _rng| 1, |id, _rng| Agent::new(id, 1.0, 1.0))));
        sim.connect(source, 0, gate).unwrap();
        sim.connect(gate, 0, sink).unwrap();

        sim.run(&mut NoopObserver).unwrap();

        let sink_count = sim.block(sink).unwrap().as_any().downcast_ref::<SinkBlock>().unwrap().count();
        assert_eq!(sink_count, 0);
        let held = sim.block(gate).unwrap().as_any().downcast_ref::<GateBlock>().unwrap().len();
        assert_eq!(held, 3);
    }

    /// `Simulator::block`/`block_mut` resolve registered ids and return
    /// `None` for anything out of range.
    #[test]
    fn block_accessor_rejects_unknown_id() {
        let sim = SimulatorBuilder::new(SimConfig::new(11, 1)).build();
        assert!(sim.block(BlockId(0)).is_none());
    }
}
