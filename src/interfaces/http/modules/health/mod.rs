//! Liveness, readiness and status endpoints

pub mod handlers;

pub use handlers::*;
