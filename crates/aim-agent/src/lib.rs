//! `aim-agent` — the `Agent` value type and its per-agent component storage.
//!
//! # Crate layout
//!
//! | Module      | Contents                                         |
//! |-------------|---------------------------------------------------|
//! | [`agent`]   | `Agent`, `SpaceState`                             |
//! | [`component`] | `ComponentMap` — type-erased per-agent storage  |
//! | [`hooks`]   | `AgentHooks` capability trait, `NoopHooks`        |
//!
//! Unlike the population-wide structure-of-arrays stores this crate is
//! descended from, an `Agent` here is an owned value transferred between
//! blocks' `VecDeque<Agent>` holdings — there is no central store indexed by
//! `AgentId`, because spec §3's ownership invariant ("owned by exactly one
//! block... never more than one") is most directly expressed as move
//! semantics, not an index into shared SoA arrays.

pub mod agent;
pub mod component;
pub mod hooks;

#[cfg(test)]
mod tests;

pub use agent::{Agent, SpaceState};
pub use component::ComponentMap;
pub use hooks::{AgentHooks, NoopHooks};
