//! Dijkstra pathfinding over a [`ConveyorGraph`] (spec §4.5: "Agent register
//! runs Dijkstra from `start_entity` to `end_entity`").
//!
//! # Cost units
//!
//! Edge cost is the *source* entity's own [`Entity::traversal_time`] —
//! moving across an edge means first finishing the entity you're leaving.
//! Costs are `f32` ticks; the binary heap compares them via IEEE-754 bit
//! pattern, valid because every cost here is finite and non-negative (ported
//! from the teacher's integer-millisecond Dijkstra, adapted since this
//! domain's weights are not naturally integral).

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use aim_core::{AimError, AimResult, EntityId};

use crate::graph::ConveyorGraph;

/// The result of a routing query: the ordered entities from `start` to
/// `end` inclusive, and the total traversal time.
#[derive(Debug, Clone)]
pub struct Route {
    pub entities: Vec<EntityId>,
    pub total_time: f32,
}

impl Route {
    /// `true` if `start == end` (a single-entity "path").
    pub fn is_trivial(&self) -> bool {
        self.entities.len() <= 1
    }
}

/// Shortest path from `start` to `end` by cumulative traversal time.
///
/// # Errors
/// - `AimError::EntityNotFound` if `start` or `end` is not registered —
///   class 2 (misconfiguration): callers should have validated this at
///   connection time.
/// - `AimError::Rejected` if no path exists — class 1, a normal "try again"
///   signal for whatever is registering the agent.
pub fn shortest_path(graph: &ConveyorGraph, start: EntityId, end: EntityId) -> AimResult<Route> {
    if !graph.contains(start) {
        return Err(AimError::EntityNotFound(start));
    }
    if !graph.contains(end) {
        return Err(AimError::EntityNotFound(end));
    }
    if start == end {
        return Ok(Route { entities: vec![start], total_time: 0.0 });
    }

    let n = graph.entity_count();
    let mut dist = vec![f32::INFINITY; n];
    let mut prev: Vec<Option<EntityId>> = vec![None; n];
    dist[start.index()] = 0.0;

    let mut heap: BinaryHeap<Reverse<(u32, EntityId)>> = BinaryHeap::new();
    heap.push(Reverse((0u32, start)));

    while let Some(Reverse((cost_bits, node))) = heap.pop() {
        let cost = f32::from_bits(cost_bits);
        if cost > dist[node.index()] {
            continue; // stale heap entry
        }
        if node == end {
            break;
        }

        let step = match graph.entity(node) {
            Some(e) => e.traversal_time(),
            None => continue,
        };

        for neighbor in graph.out_edges(node) {
            let new_cost = cost + step;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev[neighbor.index()] = Some(node);
                heap.push(Reverse((new_cost.to_bits(), neighbor)));
            }
        }
    }

    if dist[end.index()].is_infinite() {
        return Err(AimError::Rejected(format!("no path from {start} to {end}")));
    }

    let mut entities = vec![end];
    let mut cur = end;
    while let Some(p) = prev[cur.index()] {
        entities.push(p);
        cur = p;
        if cur == start {
            break;
        }
    }
    entities.reverse();

    Ok(Route { entities, total_time: dist[end.index()] })
}
