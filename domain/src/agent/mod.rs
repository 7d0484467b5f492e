//! Agent identities, the capability model, and the discovery registry

pub mod capability;
pub mod identity;
pub mod registry;
