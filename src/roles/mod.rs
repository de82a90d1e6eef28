//! Role capabilities and their registry.
//!
//! Roles are a closed set (`RoleId`). Each one is described by a stateless
//! `RoleCapability`, looked up through a `RoleRegistry` that the caller
//! constructs and passes into every resolver.

pub mod capability;
pub mod registry;
pub mod village;
pub mod wolves;
pub mod neutral;

pub use capability::{
    apparent_alignment, apparent_role, Alignment, Deaths, NightOutcomeContext, OutcomeStage,
    RoleCapability, RoleId, Team,
};
pub use registry::RoleRegistry;
