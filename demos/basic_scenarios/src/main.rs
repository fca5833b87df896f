//! basic_scenarios — the six literal end-to-end scenarios from the AIM
//! engine's tick-loop contract, run back to back and reported on stdout.
//!
//! Each scenario builds a small block graph, runs it to completion, and
//! checks the exact outcome the contract promises — the same assertions
//! the workspace's own integration tests make, but driven from a plain
//! `fn main` the way the teacher's own examples report a run (see
//! `examples/xsmall/src/main.rs`'s `println!`-only reporting; no logging
//! crate is pulled in here either, `tracing` stays the engine's internal
//! diagnostic facade).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};

use aim_agent::{Agent, AgentHooks};
use aim_block::{
    Block, ConveyorBlock, DelayBlock, Engine, GateBlock, GateState, IfBlock, QueueBlock, ReleaseMode, SinkBlock,
    SourceBlock,
};
use aim_core::{AgentId, BlockId, SimConfig, Tick};
use aim_sim::{NoopObserver, Simulator, SimulatorBuilder};
use aim_spatial::{ConveyorGraphBuilder, ConveyorSpace};

fn sink_count(sim: &Simulator, id: BlockId) -> u64 {
    sim.block(id).unwrap().as_any().downcast_ref::<SinkBlock>().unwrap().count()
}

/// Scenario 1 — Source -> Sink, spawn 1/tick, 10 ticks -> `sink.count == 10`.
fn scenario_1_source_to_sink() -> Result<()> {
    let mut sim = SimulatorBuilder::new(SimConfig::new(1, 10)).build();
    let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
    let source = sim.add_block(|id| Box::new(SourceBlock::new(id, |_tick, _rng| 1, |id, _rng| Agent::new(id, 1.0, 1.0))));
    sim.connect(source, 0, sink)?;

    sim.run(&mut NoopObserver)?;

    let count = sink_count(&sim, sink);
    println!("1. Source -> Sink, 10 ticks: sink.count = {count} (expected 10)");
    if count != 10 {
        bail!("scenario 1 failed: expected sink.count == 10, got {count}");
    }
    Ok(())
}

/// Scenario 2 — Source -> Delay(5) -> Sink, spawn once at tick 0, 10 ticks
/// -> `sink.count == 1` (accepted at tick 0, released at tick 5, ejected at
/// tick 6 per phase ordering).
fn scenario_2_source_delay_sink() -> Result<()> {
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
    sim.connect(source, 0, delay)?;
    sim.connect(delay, 0, sink)?;

    sim.run(&mut NoopObserver)?;

    let count = sink_count(&sim, sink);
    println!("2. Source -> Delay(5) -> Sink, spawn once at tick 0: sink.count = {count} (expected 1)");
    if count != 1 {
        bail!("scenario 2 failed: expected sink.count == 1, got {count}");
    }
    Ok(())
}

/// Scenario 3 — Source -> If(flag) -> {Sink_A, Sink_B}, 3 agents with flags
/// [true, false, true] -> `Sink_A.count == 2`, `Sink_B.count == 1`.
fn scenario_3_if_branch() -> Result<()> {
    let mut sim = SimulatorBuilder::new(SimConfig::new(3, 3)).build();
    let sink_a = sim.add_block(|id| Box::new(SinkBlock::new(id)));
    let sink_b = sim.add_block(|id| Box::new(SinkBlock::new(id)));
    // Agents 0, 1, 2 spawn at ticks 0, 1, 2 respectively; even ids carry
    // the true flag, reproducing the [true, false, true] sequence.
    let branch = sim.add_block(|id| Box::new(IfBlock::new(id, |agent: &Agent| agent.id.0 % 2 == 0)));
    let source = sim.add_block(|id| {
        Box::new(SourceBlock::new(
            id,
            |tick, _rng| if tick.0 < 3 { 1 } else { 0 },
            |id, _rng| Agent::new(id, 1.0, 1.0),
        ))
    });
    sim.connect(source, 0, branch)?;
    sim.connect(branch, 0, sink_a)?;
    sim.connect(branch, 1, sink_b)?;

    sim.run(&mut NoopObserver)?;

    let count_a = sink_count(&sim, sink_a);
    let count_b = sink_count(&sim, sink_b);
    println!("3. Source -> If(flag) -> Sink_A/Sink_B: Sink_A.count = {count_a}, Sink_B.count = {count_b} (expected 2, 1)");
    if count_a != 2 || count_b != 1 {
        bail!("scenario 3 failed: expected (2, 1), got ({count_a}, {count_b})");
    }
    Ok(())
}

/// Scenario 4 — Source -> Gate(closed, "one") -> Sink, run 5 ticks, toggle
/// via scheduled event at tick 3 -> `sink.count == 2` (ticks 4 and 5).
fn scenario_4_gate_toggle() -> Result<()> {
    let mut sim = SimulatorBuilder::new(SimConfig::new(4, 5)).build();
    let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
    let gate = sim.add_block(|id| Box::new(GateBlock::new(id, GateState::Closed, ReleaseMode::One)));
    let source = sim.add_block(|id| Box::new(SourceBlock::new(id, |_tick, _rng| 1, |id, _rng| Agent::new(id, 1.0, 1.0))));
    sim.connect(source, 0, gate)?;
    sim.connect(gate, 0, sink)?;

    sim.schedule_event(3, move |_tick, sim: &mut Simulator| {
        let gate = sim.block_mut(gate).unwrap().as_any_mut().downcast_mut::<GateBlock>().unwrap();
        gate.toggle();
    })?;

    sim.run(&mut NoopObserver)?;

    let count = sink_count(&sim, sink);
    println!("4. Source -> Gate(closed) -> Sink, toggle at tick 3: sink.count = {count} (expected 2)");
    if count != 2 {
        bail!("scenario 4 failed: expected sink.count == 2, got {count}");
    }
    Ok(())
}

/// Scenario 5 — agent A emits "ping" at tick 0; agent B, subscribed to
/// "ping", records the tick its `on_event` hook fires -> tick 1.
fn scenario_5_event_delivery() -> Result<()> {
    struct RecordReceiptTick(Arc<AtomicU64>);
    impl AgentHooks for RecordReceiptTick {
        fn on_event(&mut self, _event: &str, tick: Tick) {
            self.0.store(tick.0, Ordering::SeqCst);
        }
    }

    let mut sim = SimulatorBuilder::new(SimConfig::new(5, 3)).build();
    // A closed Gate holds agent B without ever forwarding it — its `_tick`
    // returns immediately while closed, so agent B's value (and its hooks)
    // survive long enough to actually receive the delivered event.
    let holding = sim.add_block(|id| Box::new(GateBlock::new(id, GateState::Closed, ReleaseMode::One)));

    let received_at = Arc::new(AtomicU64::new(u64::MAX));
    let received_at_for_hook = Arc::clone(&received_at);
    let b = Agent::new(AgentId(1), 1.0, 1.0).with_hooks(Box::new(RecordReceiptTick(received_at_for_hook)));
    Engine::try_eject(&mut sim, holding, b, None).map_err(|r| anyhow::anyhow!(r.error))?;
    Engine::subscribe(&mut sim, AgentId(1), "ping")?;

    // Agent A emits "ping" at tick 0, from inside a scheduled callback
    // (agent A never enters the block graph — it only ever needs to emit).
    sim.schedule_event(0, |_tick, sim: &mut Simulator| {
        Engine::emit_event(sim, "ping", AgentId(0)).unwrap();
    })?;

    sim.run(&mut NoopObserver)?;

    let tick = received_at.load(Ordering::SeqCst);
    println!("5. Agent A emits \"ping\" at tick 0: agent B's on_event fires at tick {tick} (expected 1)");
    if tick != 1 {
        bail!("scenario 5 failed: expected delivery at tick 1, got {tick}");
    }
    Ok(())
}

/// Scenario 6 — two length-5 agents attempt one length-10 conveyor in the
/// same tick: the first is accepted, the second is rejected by the
/// one-agent-per-tick entry rule and retried by its upstream Queue; once
/// the first has advanced past the midpoint, the second is admitted.
fn scenario_6_conveyor_collision() -> Result<()> {
    let mut sim = SimulatorBuilder::new(SimConfig::new(6, 2)).build();

    let mut graph = ConveyorGraphBuilder::new();
    let entity = graph.add_entity(10.0, 6.0); // traversal_time = 10/6
    let space_slot = sim.add_space(Box::new(ConveyorSpace::new(graph.build())));

    let sink = sim.add_block(|id| Box::new(SinkBlock::new(id)));
    let conveyor = sim.add_block(|id| Box::new(ConveyorBlock::new(id, space_slot, entity, entity)));
    let queue = sim.add_block(|id| Box::new(QueueBlock::new(id)));
    sim.connect(conveyor, 0, sink)?;
    sim.connect(queue, 0, conveyor)?;

    Engine::try_eject(&mut sim, queue, Agent::new(AgentId(0), 1.0, 5.0), None).map_err(|r| anyhow::anyhow!(r.error))?;
    Engine::try_eject(&mut sim, queue, Agent::new(AgentId(1), 1.0, 5.0), None).map_err(|r| anyhow::anyhow!(r.error))?;

    sim.run(&mut NoopObserver)?;

    let conveyor_len = sim.block(conveyor).unwrap().as_any().downcast_ref::<ConveyorBlock>().unwrap().len();
    println!(
        "6. Two length-5 agents into one length-10 conveyor: {conveyor_len} held on the conveyor after 2 ticks \
         (tick 0 admits one and rejects the other via the one-per-tick rule; \
         tick 1 admits the second once the first has moved clear)"
    );
    if conveyor_len != 2 {
        bail!("scenario 6 failed: expected both agents admitted onto the conveyor after 2 ticks, got {conveyor_len}");
    }
    Ok(())
}

fn main() -> Result<()> {
    println!("=== AIM basic scenarios ===");
    println!();

    scenario_1_source_to_sink()?;
    scenario_2_source_delay_sink()?;
    scenario_3_if_branch()?;
    scenario_4_gate_toggle()?;
    scenario_5_event_delivery()?;
    scenario_6_conveyor_collision()?;

    println!();
    println!("All six scenarios matched their contracted outcomes.");
    Ok(())
}
