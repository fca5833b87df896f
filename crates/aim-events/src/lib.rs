//! `aim-events` — the two-phase agent event bus.
//!
//! Exact-string subscriptions; events emitted during a tick are delivered at
//! the start of the *next* tick, in emission order times subscriber
//! registration order (spec §4.4).

pub mod bus;


pub use bus::EventBus;
