//! `Combine` — merges a container agent with its accumulated pickups (spec
//! §4.3).
//!
//! Two input ports means two `BlockId`s, each with its own [`Block`] impl,
//! sharing one buffer through `Arc<Mutex<...>>` — the same "pure relation,
//! not an ownership edge" idiom as `RestrictedAreaStart`/`End`, just with
//! richer interior state than a bare atomic counter, and `Mutex` rather
//! than `RefCell` so the port stays `Send` like every other `Block`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use aim_agent::Agent;
use aim_core::{AgentId, AimError, AimResult, BlockId, Tick};

use crate::block::{accept, Block, BlockHooks};
use crate::engine::{Engine, Rejected};

/// Stashed on the container's [`aim_agent::ComponentMap`] so `Split` can
/// later hand the real pickup `Agent` values back out — `children_agents`
/// alone only carries their ids, not ownership of the values.
pub struct PickupBundle(pub Vec<Agent>);

struct Shared {
    output: Option<BlockId>,
    max_pickups: usize,
    container: Option<Agent>,
    pickups: VecDeque<Agent>,
    hooks: BlockHooks,
}

/// The container input port. Also owns the emission logic: `tick` checks
/// whether a container and `max_pickups` pickups are both present and, if
/// so, stamps `children_agents`/`parent_agents` and ejects the container.
pub struct CombineContainerPort {
    id: BlockId,
    shared: Arc<Mutex<Shared>>,
}

/// The pickup input port, sharing the same buffer as its paired container
/// port. Its own `tick` is a no-op — emission happens from the container
/// side once both halves are ready.
pub struct CombinePickupPort {
    id: BlockId,
    shared: Arc<Mutex<Shared>>,
}

impl CombineContainerPort {
    pub fn new(container_id: BlockId, pickup_id: BlockId, max_pickups: usize) -> (Self, CombinePickupPort) {
        let shared = Arc::new(Mutex::new(Shared {
            output: None,
            max_pickups,
            container: None,
            pickups: VecDeque::new(),
            hooks: BlockHooks::default(),
        }));
        (
            Self { id: container_id, shared: Arc::clone(&shared) },
            CombinePickupPort { id: pickup_id, shared },
        )
    }

    /// Attach user `on_enter`/`on_exit` callbacks (spec §4.2). The hooks are
    /// shared with the paired [`CombinePickupPort`] — both ports feed the
    /// same buffer, so there is only one hook set for the pair.
    pub fn with_hooks(self, hooks: BlockHooks) -> Self {
        self.shared.lock().unwrap().hooks = hooks;
        self
    }
}

impl Block for CombineContainerPort {
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
        let mut shared = self.shared.lock().unwrap();
        if shared.container.is_some() {
            return Err(Rejected::reason(agent, format!("Combine {} already holds a container", self.id)));
        }
        if let Some(f) = on_exit {
            f(&mut agent);
        }
        accept(&mut agent, self.id, &mut shared.hooks);
        shared.container = Some(agent);
        Ok(())
    }

    fn tick(&mut self, engine: &mut dyn Engine) -> AimResult<()> {
        let output = {
            let shared = self.shared.lock().unwrap();
            shared.output.ok_or_else(|| AimError::Misconfigured(format!("Combine {} has no output connection", self.id)))?
        };

        let ready = {
            let shared = self.shared.lock().unwrap();
            shared.container.is_some() && shared.pickups.len() >= shared.max_pickups
        };
        if !ready {
            return Ok(());
        }

        let mut container = self.shared.lock().unwrap().container.take().expect("checked ready above");
        let pickups: Vec<Agent> = std::mem::take(&mut self.shared.lock().unwrap().pickups).into_iter().collect();

        let container_id = container.id;
        let pickups_with_parent: Vec<Agent> = pickups
            .into_iter()
            .map(|mut p| {
                p.parent_agents.push(container_id);
                p
            })
            .collect();
        container.children_agents = pickups_with_parent.iter().map(|p| p.id).collect();
        container.components.set(PickupBundle(pickups_with_parent));

        let shared_for_hook = Arc::clone(&self.shared);
        let mut on_exit = move |a: &mut Agent| shared_for_hook.lock().unwrap().hooks.fire_exit(a);
        match engine.try_eject(output, container, Some(&mut on_exit)) {
            Ok(()) => Ok(()),
            Err(rejected) if rejected.error.is_rejection() => {
                let mut container = rejected.agent;
                let pickups_with_parent = container
                    .components
                    .take::<PickupBundle>()
                    .expect("just stashed above")
                    .0;
                container.children_agents.clear();
                let mut shared = self.shared.lock().unwrap();
                for mut pickup in pickups_with_parent.into_iter().rev() {
                    pickup.parent_agents.pop();
                    shared.pickups.push_front(pickup);
                }
                shared.container = Some(container);
                Ok(())
            }
            Err(rejected) => Err(rejected.error),
        }
    }

    fn connect(&mut self, _slot: usize, target: BlockId) {
        self.shared.lock().unwrap().output = Some(target);
    }

    fn deliver_event(&mut self, agent: AgentId, event: &str, tick: Tick) -> bool {
        let mut shared = self.shared.lock().unwrap();
        if let Some(container) = shared.container.as_mut() {
            if container.id == agent {
                container.on_event(event, tick);
                return true;
            }
        }
        match shared.pickups.iter_mut().find(|p| p.id == agent) {
            Some(p) => {
                p.on_event(event, tick);
                true
            }
            None => false,
        }
    }
}

impl Block for CombinePickupPort {
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
        let mut shared = self.shared.lock().unwrap();
        if shared.pickups.len() >= shared.max_pickups {
            return Err(Rejected::reason(agent, format!("Combine pickup port {} is full", self.id)));
        }
        if let Some(f) = on_exit {
            f(&mut agent);
        }
        accept(&mut agent, self.id, &mut shared.hooks);
        shared.pickups.push_back(agent);
        Ok(())
    }

    fn tick(&mut self, _engine: &mut dyn Engine) -> AimResult<()> {
        Ok(())
    }

    fn connect(&mut self, _slot: usize, _target: BlockId) {}
}
