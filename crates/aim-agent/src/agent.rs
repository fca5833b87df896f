//! The `Agent` value type and its spatial-state companion.

use std::collections::HashSet;

use aim_core::{AgentId, BlockId, EntityId, Tick};

use crate::component::ComponentMap;
use crate::hooks::AgentHooks;

/// An agent's position within a `SpaceManager`, mirrored here so an `Agent`
/// printed or inspected off to the side is self-describing even though the
/// owning space is the source of truth while the agent is mid-transit.
///
/// See spec §3 (`space_state`) and §4.5 (`ConveyorSpace`).
#[derive(Debug, Clone, Default)]
pub struct SpaceState {
    /// The entity (conveyor segment or turntable) the agent currently
    /// occupies, or `None` if not registered with any space.
    pub entity: Option<EntityId>,

    /// Fraction of the current entity traversed, in `[0, 1]`.
    pub progress_on_entity: f32,

    /// Fraction of the whole registered path traversed, in `[0, 1]`.
    /// Monotonically non-decreasing until the agent is unregistered.
    pub progress_on_path: f32,

    /// The ordered list of entities from `start_entity` to `end_entity`,
    /// computed once at registration time by Dijkstra.
    pub path: Vec<EntityId>,
}

/// A passive mobile entity moving between blocks and across spaces.
///
/// Invariant (spec §3): at any instant an agent is owned by exactly one
/// block, held by a space mid-transit, or destroyed — never more than one of
/// the first two. This crate upholds that invariant by construction: an
/// `Agent` only ever lives inside one block's `VecDeque<Agent>`, one space's
/// in-transit table, or a local variable mid-handoff. There is no shared
/// store an `Agent` could be simultaneously reachable from twice.
pub struct Agent {
    pub id: AgentId,
    pub width: f32,
    pub length: f32,
    pub space_state: SpaceState,
    pub current_block: Option<BlockId>,

    /// Containers set `children_agents`; pickups set `parent_agents`. See
    /// the Combine/Split blocks in spec §4.3.
    pub parent_agents: Vec<AgentId>,
    pub children_agents: Vec<AgentId>,

    /// Events this agent is subscribed to. The event bus is the source of
    /// truth for delivery; this mirror lets an agent be inspected without
    /// reaching back into the bus.
    pub subscriptions: HashSet<String>,

    /// Arbitrary user-defined fields, keyed by type.
    pub components: ComponentMap,

    /// Optional user-overridden behavior. `None` is the common case.
    pub hooks: Option<Box<dyn AgentHooks>>,
}

impl Agent {
    pub fn new(id: AgentId, width: f32, length: f32) -> Self {
        Self {
            id,
            width,
            length,
            space_state: SpaceState::default(),
            current_block: None,
            parent_agents: Vec::new(),
            children_agents: Vec::new(),
            subscriptions: HashSet::new(),
            components: ComponentMap::new(),
            hooks: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Box<dyn AgentHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Dispatch to the agent's hooks, if any.
    pub fn on_enter_block(&mut self, block: BlockId) {
        self.current_block = Some(block);
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_enter_block(block);
        }
    }

    /// Dispatch to the agent's hooks, if any.
    pub fn on_event(&mut self, event: &str, tick: Tick) {
        if let Some(hooks) = self.hooks.as_mut() {
            hooks.on_event(event, tick);
        }
    }
}
