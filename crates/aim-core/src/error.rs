//! The shared error type and the three-class taxonomy it encodes.
//!
//! Every crate in the workspace returns `AimResult<T>` directly rather than
//! defining its own narrow error enum — there is exactly one error surface,
//! so a caller holding an `AimResult` never has to match on a per-crate type.
//!
//! Only [`AimError::Rejected`]-family values participate in the upstream
//! retry loop (class 1). Everything else is fatal and aborts `Simulator::run`.

use thiserror::Error;

use crate::{AgentId, BlockId, EntityId};

/// The top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum AimError {
    /// Class 1 — expected control signal. A downstream `take` could not
    /// accept the agent this tick; the upstream block must catch this and
    /// retry next tick. Never allowed to escape the block that raised it.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Class 2 — misconfiguration, fatal. Raised at `connect()` time where
    /// the invalid wiring is knowable without a tick, otherwise at first use.
    #[error("misconfigured: {0}")]
    Misconfigured(String),

    /// Class 3 — invariant violation, fatal, indicates a bug. Never caught.
    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("block {0} not found")]
    BlockNotFound(BlockId),

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),
}

impl AimError {
    /// `true` for class-1 rejections — the only class an upstream block may
    /// catch and retry on.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AimError::Rejected(_))
    }
}

/// Shorthand result type for the whole workspace.
pub type AimResult<T> = Result<T, AimError>;
