//! The two-phase event bus (spec §4.4).

use rustc_hash::FxHashMap;

use aim_core::{AgentId, AimError, AimResult};

/// Exact-string subscription table with emit-now/deliver-next-tick
/// semantics.
///
/// There is only one buffer field, `pending`, rather than two named buffers:
/// `deliver_pending` drains it at the start of tick phase 3 and hands the
/// caller every `(event, emitter)` entry queued since the *previous* call to
/// `deliver_pending`. Anything emitted during delivery itself (phase 3) or
/// during block ticks (phase 4) lands back in `pending`, which is exactly
/// the "next tick's buffer" spec §4.1 describes — the swap and the rotation
/// are the same event, not two.
#[derive(Default)]
pub struct EventBus {
    /// Registration-order subscriber list per exact event string.
    subscriptions: FxHashMap<String, Vec<AgentId>>,
    /// Emissions queued since the last `deliver_pending` call.
    pending: Vec<(String, AgentId)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `agent` to exact string `event`. Re-subscribing the same
    /// agent to the same event is a no-op (delivery must never double-fire
    /// for one subscription).
    ///
    /// # Errors
    /// Returns `AimError::Misconfigured` if `event` is empty.
    pub fn subscribe(&mut self, agent: AgentId, event: &str) -> AimResult<()> {
        if event.is_empty() {
            return Err(AimError::Misconfigured("event string must be non-empty".into()));
        }
        let subs = self.subscriptions.entry(event.to_string()).or_default();
        if !subs.contains(&agent) {
            subs.push(agent);
        }
        Ok(())
    }

    /// Queue `event` for delivery at the start of the *next* tick's phase 3.
    ///
    /// # Errors
    /// Returns `AimError::Misconfigured` if `event` is empty.
    pub fn emit(&mut self, event: &str, emitter: AgentId) -> AimResult<()> {
        if event.is_empty() {
            return Err(AimError::Misconfigured("event string must be non-empty".into()));
        }
        self.pending.push((event.to_string(), emitter));
        Ok(())
    }

    /// Drain the buffer accumulated since the previous call and invoke
    /// `deliver(subscriber, event)` for each entry, in emission order, for
    /// every subscriber in registration order.
    ///
    /// `deliver` is responsible for silently skipping agents that no longer
    /// exist (spec §4.4: "if an agent is destroyed between emission and
    /// delivery, delivery to it is silently skipped").
    pub fn deliver_pending<F: FnMut(AgentId, &str)>(&mut self, mut deliver: F) {
        let due = std::mem::take(&mut self.pending);
        for (event, _emitter) in due {
            if let Some(subs) = self.subscriptions.get(&event) {
                for &agent in subs {
                    deliver(agent, &event);
                }
            }
        }
    }

    /// Number of events currently queued for the next delivery.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of subscribers registered for `event`.
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscriptions.get(event).map_or(0, Vec::len)
    }
}
