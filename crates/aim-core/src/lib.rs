//! `aim-core` — foundational types shared by every other `aim-*` crate.
//!
//! This crate has no `aim-*` dependencies and minimal external ones (only
//! `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                  |
//! |-----------|--------------------------------------------|
//! | [`ids`]   | `AgentId`, `BlockId`, `EntityId`, `EdgeId` |
//! | [`time`]  | `Tick`, `SimConfig`                        |
//! | [`rng`]   | `SimRng` — the single global RNG          |
//! | [`error`] | `AimError`, `AimResult`                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod ids;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{AimError, AimResult};
pub use ids::{AgentId, BlockId, EdgeId, EntityId};
pub use rng::SimRng;
pub use time::{SimConfig, Tick};
