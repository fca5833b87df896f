//! Unit tests for aim-agent.

#[cfg(test)]
mod component {
    use crate::ComponentMap;

    #[derive(Default, PartialEq, Debug)]
    struct Flag(bool);

    #[derive(Default, PartialEq, Debug)]
    struct Count(u32);

    #[test]
    fn set_and_get() {
        let mut map = ComponentMap::new();
        map.set(Flag(true));
        assert_eq!(map.get::<Flag>(), Some(&Flag(true)));
    }

    #[test]
    fn missing_type_is_none() {
        let map = ComponentMap::new();
        assert_eq!(map.get::<Flag>(), None);
        assert!(!map.contains::<Flag>());
    }

    #[test]
    fn overwrite_replaces() {
        let mut map = ComponentMap::new();
        map.set(Count(1));
        map.set(Count(2));
        assert_eq!(map.get::<Count>(), Some(&Count(2)));
        assert_eq!(map.type_count(), 1);
    }

    #[test]
    fn distinct_types_coexist() {
        let mut map = ComponentMap::new();
        map.set(Flag(true));
        map.set(Count(5));
        assert_eq!(map.type_count(), 2);
        assert_eq!(map.get::<Flag>(), Some(&Flag(true)));
        assert_eq!(map.get::<Count>(), Some(&Count(5)));
    }

    #[test]
    fn take_removes() {
        let mut map = ComponentMap::new();
        map.set(Count(9));
        assert_eq!(map.take::<Count>(), Some(Count(9)));
        assert!(!map.contains::<Count>());
    }

    #[test]
    fn get_mut_modifies_in_place() {
        let mut map = ComponentMap::new();
        map.set(Count(1));
        map.get_mut::<Count>().unwrap().0 += 1;
        assert_eq!(map.get::<Count>(), Some(&Count(2)));
    }
}

#[cfg(test)]
mod agent {
    use aim_core::{AgentId, BlockId};

    use crate::Agent;

    #[test]
    fn new_agent_has_no_block() {
        let agent = Agent::new(AgentId(0), 1.0, 2.0);
        assert_eq!(agent.current_block, None);
        assert!(agent.subscriptions.is_empty());
        assert!(agent.children_agents.is_empty());
    }

    #[test]
    fn on_enter_block_sets_current_block() {
        let mut agent = Agent::new(AgentId(0), 1.0, 2.0);
        agent.on_enter_block(BlockId(3));
        assert_eq!(agent.current_block, Some(BlockId(3)));
    }

    #[test]
    fn default_hooks_is_none() {
        let agent = Agent::new(AgentId(0), 1.0, 1.0);
        assert!(agent.hooks.is_none());
    }
}

#[cfg(test)]
mod hooks {
    use std::sync::{Arc, Mutex};

    use aim_core::{AgentId, BlockId, Tick};

    use crate::{Agent, AgentHooks, NoopHooks};

    #[derive(Default)]
    struct Log {
        entered: Vec<BlockId>,
        events: Vec<(String, Tick)>,
    }

    struct Recorder(Arc<Mutex<Log>>);

    impl AgentHooks for Recorder {
        fn on_enter_block(&mut self, block: BlockId) {
            self.0.lock().unwrap().entered.push(block);
        }
        fn on_event(&mut self, event: &str, tick: Tick) {
            self.0.lock().unwrap().events.push((event.to_string(), tick));
        }
    }

    #[test]
    fn hooks_are_dispatched_on_enter_and_event() {
        let log = Arc::new(Mutex::new(Log::default()));
        let mut agent =
            Agent::new(AgentId(1), 1.0, 1.0).with_hooks(Box::new(Recorder(log.clone())));

        agent.on_enter_block(BlockId(2));
        agent.on_event("ping", Tick(4));

        assert_eq!(log.lock().unwrap().entered, vec![BlockId(2)]);
        assert_eq!(log.lock().unwrap().events, vec![("ping".to_string(), Tick(4))]);
    }

    #[test]
    fn noop_hooks_do_nothing_observable() {
        let mut agent = Agent::new(AgentId(2), 1.0, 1.0).with_hooks(Box::new(NoopHooks));
        agent.on_enter_block(BlockId(0));
        agent.on_event("x", Tick::ZERO);
        assert_eq!(agent.current_block, Some(BlockId(0)));
    }
}
