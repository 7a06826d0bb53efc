//! Application ports (hexagonal architecture boundaries)

pub mod inventory;

pub use inventory::{InstanceLister, SharedInstanceLister};
