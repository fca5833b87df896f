//! Unit tests for aim-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, BlockId, EdgeId};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(AgentId(0) < AgentId(1));
        assert!(BlockId(100) > BlockId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(AgentId::INVALID.0, u32::MAX);
        assert_eq!(BlockId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(AgentId::default(), AgentId::INVALID);
    }
}

#[cfg(test)]
mod time {
    use crate::{SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
    }

    #[test]
    fn tick_display() {
        assert_eq!(Tick(7).to_string(), "T7");
    }

    #[test]
    fn sim_config_end_tick() {
        let cfg = SimConfig::new(42, 10);
        assert_eq!(cfg.end_tick(), Tick(10));
    }
}

#[cfg(test)]
mod rng {
    use crate::SimRng;

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = SimRng::new(12345);
        let mut r2 = SimRng::new(12345);
        for _ in 0..100 {
            let a: f32 = r1.random();
            let b: f32 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut r0 = SimRng::new(1);
        let mut r1 = SimRng::new(2);
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b);
    }

    #[test]
    fn gen_range_in_bounds() {
        let mut rng = SimRng::new(0);
        for _ in 0..1000 {
            let v = rng.gen_range(0.0f32..1.0);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = SimRng::new(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }

    #[test]
    fn child_differs_by_offset() {
        let mut rng = SimRng::new(7);
        let mut c1 = rng.child(1);
        let mut rng2 = SimRng::new(7);
        let mut c2 = rng2.child(2);
        let a: u64 = c1.random();
        let b: u64 = c2.random();
        assert_ne!(a, b);
    }
}

#[cfg(test)]
mod error {
    use crate::{AgentId, AimError};

    #[test]
    fn rejection_is_recognized() {
        let e = AimError::Rejected("gate closed".into());
        assert!(e.is_rejection());
    }

    #[test]
    fn misconfigured_is_not_rejection() {
        let e = AimError::Misconfigured("null slot".into());
        assert!(!e.is_rejection());
    }

    #[test]
    fn agent_not_found_message() {
        let e = AimError::AgentNotFound(AgentId(3));
        assert!(e.to_string().contains("AgentId(3)"));
    }
}
