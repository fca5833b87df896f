//! `Split` — the inverse of `Combine` (spec §4.3).

use std::collections::VecDeque;

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, Tick};

use crate::block::{deliver_in_held, eject_fifo_while, Block, BlockHooks};
use crate::combine::PickupBundle;
use crate::engine::{Engine, Rejected};

/// On `take`, ejects the container to slot 0, then each pickup stashed on
/// it (via [`PickupBundle`]) to slot 1, clearing `children_agents`.
///
/// True all-or-nothing rollback isn't expressible once any downstream
/// `take` has already accepted an agent — an accepted agent is owned by the
/// new block and can't be recalled. This implementation is reversible up to
/// the point the container itself is accepted: if the container's own
/// ejection rejects, nothing has happened yet and the whole bundle (pickups
/// still attached) comes back unchanged. Once the container is out, any
/// pickups that can't go immediately are held here and retried every tick
/// until they all leave, rather than rolled back.
pub struct SplitBlock {
    id: BlockId,
    container_out: Option<BlockId>,
    pickup_out: Option<BlockId>,
    pending_pickups: VecDeque<Agent>,
    hooks: BlockHooks,
}

impl SplitBlock {
    pub fn new(id: BlockId) -> Self {
        Self {
            id,
            container_out: None,
            pickup_out: None,
            pending_pickups: VecDeque::new(),
            hooks: BlockHooks::default(),
        }
    }

    /// Attach user `on_enter`/`on_exit` callbacks (spec §4.2), fired around
    /// each pickup's release from the pending buffer.
    pub fn with_hooks(mut self, hooks: BlockHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn connect_container(&mut self, target: BlockId) {
        self.container_out = Some(target);
    }

    pub fn connect_pickups(&mut self, target: BlockId) {
        self.pickup_out = Some(target);
    }

    pub fn pending_len(&self) -> usize {
        self.pending_pickups.len()
    }
}

impl Block for SplitBlock {
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
        mut container: Agent,
        on_exit: Option<&mut dyn FnMut(&mut Agent)>,
    ) -> Result<(), Rejected> {
        let Some(container_out) = self.container_out else {
            return Err(Rejected::new(
                container,
                AimError::Misconfigured(format!("Split {} has no container output", self.id)),
            ));
        };
        if self.pickup_out.is_none() && container.components.contains::<PickupBundle>() {
            return Err(Rejected::new(
                container,
                AimError::Misconfigured(format!("Split {} has no pickup output", self.id)),
            ));
        }

        let bundle = container.components.take::<PickupBundle>();
        container.children_agents.clear();

        match engine.try_eject(container_out, container, on_exit) {
            Ok(()) => {
                if let Some(PickupBundle(mut pickups)) = bundle {
                    for pickup in pickups.drain(..) {
                        self.pending_pickups.push_back(pickup);
                    }
                }
                Ok(())
            }
            Err(mut rejected) => {
                if let Some(bundle) = bundle {
                    rejected.agent.children_agents = bundle.0.iter().map(|p| p.id).collect();
                    rejected.agent.components.set(bundle);
                }
                Err(rejected)
            }
        }
    }

    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()> {
        if self.pending_pickups.is_empty() {
            return Ok(());
        }
        let Some(pickup_out) = self.pickup_out else {
            return Err(AimError::Misconfigured(format!("Split {} has no pickup output", self.id)));
        };
        eject_fifo_while(engine, pickup_out, &mut self.pending_pickups, &mut self.hooks, |_| true)
    }

    fn connect(&mut self, slot: usize, target: BlockId) {
        match slot {
            0 => self.container_out = Some(target),
            _ => self.pickup_out = Some(target),
        }
    }

    fn deliver_event(&mut self, agent: AgentId, event: &str, tick: Tick) -> bool {
        deliver_in_held(&mut self.pending_pickups, agent, event, tick)
    }
}
