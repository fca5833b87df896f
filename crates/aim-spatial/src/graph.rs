//! Conveyor/turntable adjacency graph (spec §4.5: "Entity registration
//! builds an adjacency graph... edge weight = traversal time of the entity
//! at its nominal speed").
//!
//! # Data layout
//!
//! Descended from the teacher's `RoadNetwork`/`RoadNetworkBuilder`: outgoing
//! edges are stored **Compressed Sparse Row** (CSR), sorted by source node,
//! so a node's neighbors are a contiguous slice — ideal for Dijkstra's inner
//! loop. The R-tree spatial-snap index is dropped: there is no lat/lon here,
//! entities connect only through declared `connections`.

use aim_core::EntityId;

/// A conveyor segment or turntable: one node in the graph, with a physical
/// length and a nominal traversal speed.
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    pub id: EntityId,
    pub length: f32,
    pub speed: f32,
}

impl Entity {
    /// Ticks required to traverse this entity end to end at its nominal
    /// speed — the edge weight Dijkstra uses when leaving this entity.
    #[inline]
    pub fn traversal_time(&self) -> f32 {
        self.length / self.speed
    }
}

/// Directed adjacency graph of conveyor/turntable entities, CSR format.
///
/// All fields are accessed through the query methods below. Construct with
/// [`ConveyorGraphBuilder`].
pub struct ConveyorGraph {
    entities: Vec<Entity>,
    out_start: Vec<u32>,
    edge_to: Vec<EntityId>,
}

impl ConveyorGraph {
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.index())
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        id.index() < self.entities.len()
    }

    /// Iterator over the `EntityId`s directly reachable from `entity`. A
    /// contiguous slice scan, no allocation.
    #[inline]
    pub fn out_edges(&self, entity: EntityId) -> impl Iterator<Item = EntityId> + '_ {
        let start = self.out_start[entity.index()] as usize;
        let end = self.out_start[entity.index() + 1] as usize;
        self.edge_to[start..end].iter().copied()
    }

    #[inline]
    pub fn out_degree(&self, entity: EntityId) -> usize {
        let start = self.out_start[entity.index()] as usize;
        let end = self.out_start[entity.index() + 1] as usize;
        end - start
    }
}

/// Incrementally construct a [`ConveyorGraph`], then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use aim_spatial::ConveyorGraphBuilder;
///
/// let mut b = ConveyorGraphBuilder::new();
/// let a = b.add_entity(10.0, 2.0);
/// let c = b.add_entity(5.0, 1.0);
/// b.connect(a, c);
/// let graph = b.build();
/// assert_eq!(graph.entity_count(), 2);
/// ```
#[derive(Default)]
pub struct ConveyorGraphBuilder {
    entities: Vec<Entity>,
    raw_edges: Vec<(EntityId, EntityId)>,
}

impl ConveyorGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conveyor segment or turntable with its physical `length`
    /// and nominal traversal `speed` (length units per tick). Returns the
    /// `EntityId`, assigned sequentially from 0.
    pub fn add_entity(&mut self, length: f32, speed: f32) -> EntityId {
        let id = EntityId(self.entities.len() as u32);
        self.entities.push(Entity { id, length, speed });
        id
    }

    /// Declare a directed connection: an agent finishing `from` may proceed
    /// onto `to`.
    pub fn connect(&mut self, from: EntityId, to: EntityId) {
        self.raw_edges.push((from, to));
    }

    /// Consume the builder and produce a [`ConveyorGraph`].
    pub fn build(self) -> ConveyorGraph {
        let entity_count = self.entities.len();

        let mut raw = self.raw_edges;
        raw.sort_unstable_by_key(|e| e.0.0);

        let edge_to: Vec<EntityId> = raw.iter().map(|e| e.1).collect();

        let mut out_start = vec![0u32; entity_count + 1];
        for e in &raw {
            out_start[e.0.index() + 1] += 1;
        }
        for i in 1..=entity_count {
            out_start[i] += out_start[i - 1];
        }

        ConveyorGraph { entities: self.entities, out_start, edge_to }
    }
}
