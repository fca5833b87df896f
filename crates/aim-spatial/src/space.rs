//! The spatial substrate contract and its conveyor-graph implementation
//! (spec §4.5, §9 "SpaceManager contract").
//!
//! New code: no teacher file implements closed-interval multi-agent
//! occupancy. Loosely informed by the progress-fraction bookkeeping style of
//! the teacher's mobility-state tracking, built out to the collision-aware,
//! per-entity, multi-agent occupancy table the spec requires (the teacher's
//! own travel model teleports agents at arrival and has no occupancy concept
//! at all).

use std::collections::BTreeMap;

use aim_core::{AgentId, AimError, AimResult, EntityId};

use crate::graph::ConveyorGraph;
use crate::router::shortest_path;

/// A closed progress interval `[a, b]` an agent currently covers on one
/// entity, `0 <= a <= b <= 1` (spec §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub a: f32,
    pub b: f32,
}

impl Interval {
    pub fn new(a: f32, b: f32) -> Self {
        Self { a, b }
    }

    /// `true` if the two closed intervals overlap, including touching
    /// endpoints — spec §4.5: "by convention this is treated as a collision
    /// and rejected."
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.a.max(other.a) <= self.b.min(other.b)
    }
}

/// A read-only snapshot of an agent's current position within a space,
/// handed back through the [`SpaceManager`] trait object so callers (e.g.
/// `ConveyorBlock`) can mirror it onto `Agent::space_state` without knowing
/// the concrete space type.
#[derive(Debug, Clone)]
pub struct TransitSnapshot {
    pub entity: EntityId,
    pub progress_on_entity: f32,
    pub progress_on_path: f32,
    pub path: Vec<EntityId>,
}

/// The abstract spatial substrate contract: register entities (via the
/// concrete implementation's own builder), register/unregister agents,
/// advance by Δt, query movement completion.
pub trait SpaceManager: Send {
    /// Register `agent` (carrying physical `length`) for transit from
    /// `start` to `end`. On success the path is computed and stored
    /// internally; on failure (unreachable path or entry collision) the
    /// agent is not registered.
    ///
    /// # Errors
    /// `AimError::Rejected` (collision, no path) or `AimError::EntityNotFound`
    /// (unknown `start`/`end`) — see [`shortest_path`].
    fn register(
        &mut self,
        agent: AgentId,
        length: f32,
        start: EntityId,
        end: EntityId,
    ) -> AimResult<Vec<EntityId>>;

    /// Remove `agent` from this space's occupancy and transit tables. A
    /// no-op if the agent is not currently registered.
    fn unregister(&mut self, agent: AgentId);

    /// Advance every registered agent's progress by `delta_time` ticks.
    fn update(&mut self, delta_time: f32);

    /// `true` once `agent` has reached the end of its registered path.
    /// `false` if the agent is not registered at all.
    fn is_movement_complete(&self, agent: AgentId) -> bool;

    /// A read-only snapshot of `agent`'s current transit state, or `None`
    /// if not registered.
    fn snapshot(&self, agent: AgentId) -> Option<TransitSnapshot>;
}

/// One agent's in-flight state within a [`ConveyorSpace`].
struct Transit {
    length: f32,
    path: Vec<EntityId>,
    idx: usize,
    progress_on_entity: f32,
}

impl Transit {
    fn current_entity(&self) -> EntityId {
        self.path[self.idx]
    }

    fn is_complete(&self) -> bool {
        self.idx == self.path.len() - 1 && self.progress_on_entity >= 1.0
    }

    /// Fraction of the whole path traveled, by entity count rather than by
    /// time — simpler than time-weighting and still monotonically
    /// non-decreasing until unregistered (spec §3), reaching exactly 1.0
    /// only once the last entity's progress reaches 1.0.
    fn progress_on_path(&self) -> f32 {
        (self.idx as f32 + self.progress_on_entity) / self.path.len() as f32
    }
}

/// Graph of conveyors/turntables with per-entity closed-interval occupancy
/// and per-tick progress advancement (spec §4.5).
///
/// Agents are kept in a `BTreeMap<AgentId, _>` rather than a `HashMap` so
/// [`update`][SpaceManager::update] processes agents in ascending `AgentId`
/// order — `AgentId`s are assigned sequentially at spawn time, so this is
/// deterministic and reproducible across runs with the same seed (spec §8:
/// "Determinism"), which matters when two agents race for the same junction.
pub struct ConveyorSpace {
    graph: ConveyorGraph,
    occupancy: BTreeMap<EntityId, Vec<(AgentId, Interval)>>,
    transits: BTreeMap<AgentId, Transit>,
}

impl ConveyorSpace {
    pub fn new(graph: ConveyorGraph) -> Self {
        Self { graph, occupancy: BTreeMap::new(), transits: BTreeMap::new() }
    }

    pub fn graph(&self) -> &ConveyorGraph {
        &self.graph
    }

    /// Occupancy intervals currently held on `entity`, for test assertions
    /// and observers.
    pub fn occupancy_on(&self, entity: EntityId) -> &[(AgentId, Interval)] {
        self.occupancy.get(&entity).map_or(&[], |v| v.as_slice())
    }

    fn entry_interval(&self, entity: EntityId, length: f32) -> Interval {
        let entity_length = self.graph.entity(entity).map(|e| e.length).unwrap_or(1.0);
        Interval::new(0.0, (length / entity_length).min(1.0))
    }

    fn collides(&self, entity: EntityId, candidate: &Interval) -> bool {
        self.occupancy
            .get(&entity)
            .is_some_and(|occ| occ.iter().any(|(_, iv)| iv.overlaps(candidate)))
    }

    fn advance_one(&mut self, agent: AgentId, delta_time: f32) {
        let Some(transit) = self.transits.get_mut(&agent) else { return };
        if transit.is_complete() {
            return;
        }

        let cur = transit.current_entity();
        let Some(entity) = self.graph.entity(cur) else { return };
        let length = transit.length;
        transit.progress_on_entity += entity.speed * delta_time / entity.length;
        let progress = transit.progress_on_entity.min(1.0);

        // The agent's occupied span on `cur` trails its leading edge as it
        // advances, not just the footprint it entered with — otherwise a
        // trailing agent could never be admitted behind one already moving
        // down the same entity (spec §8 scenario 6).
        let footprint = Interval::new(progress, (progress + length / entity.length).min(1.0));
        if let Some(occ) = self.occupancy.get_mut(&cur) {
            if let Some(entry) = occ.iter_mut().find(|(a, _)| *a == agent) {
                entry.1 = footprint;
            }
        }

        if transit.progress_on_entity < 1.0 {
            return;
        }

        if transit.idx == transit.path.len() - 1 {
            transit.progress_on_entity = 1.0;
            return;
        }

        let next = transit.path[transit.idx + 1];
        let candidate = self.entry_interval(next, transit.length);

        if self.collides(next, &candidate) {
            // Stall at the junction: clamp at the boundary and retry the
            // handoff next tick.
            transit.progress_on_entity = 1.0;
            return;
        }

        if let Some(occ) = self.occupancy.get_mut(&cur) {
            occ.retain(|(a, _)| *a != agent);
        }
        self.occupancy.entry(next).or_default().push((agent, candidate));

        transit.idx += 1;
        transit.progress_on_entity = 0.0;
    }
}

impl SpaceManager for ConveyorSpace {
    fn register(
        &mut self,
        agent: AgentId,
        length: f32,
        start: EntityId,
        end: EntityId,
    ) -> AimResult<Vec<EntityId>> {
        let route = shortest_path(&self.graph, start, end)?;
        let entry = self.entry_interval(start, length);

        if self.collides(start, &entry) {
            return Err(AimError::Rejected(format!(
                "agent {agent} collides entering entity {start}"
            )));
        }

        self.occupancy.entry(start).or_default().push((agent, entry));
        let path = route.entities.clone();
        self.transits.insert(
            agent,
            Transit { length, path: route.entities, idx: 0, progress_on_entity: 0.0 },
        );
        Ok(path)
    }

    fn unregister(&mut self, agent: AgentId) {
        if let Some(transit) = self.transits.remove(&agent) {
            let cur = transit.current_entity();
            if let Some(occ) = self.occupancy.get_mut(&cur) {
                occ.retain(|(a, _)| *a != agent);
            }
        }
    }

    fn update(&mut self, delta_time: f32) {
        let agents: Vec<AgentId> = self.transits.keys().copied().collect();
        for agent in agents {
            self.advance_one(agent, delta_time);
        }
    }

    fn is_movement_complete(&self, agent: AgentId) -> bool {
        self.transits.get(&agent).is_some_and(Transit::is_complete)
    }

    fn snapshot(&self, agent: AgentId) -> Option<TransitSnapshot> {
        self.transits.get(&agent).map(|t| TransitSnapshot {
            entity: t.current_entity(),
            progress_on_entity: t.progress_on_entity,
            progress_on_path: t.progress_on_path(),
            path: t.path.clone(),
        })
    }
}
