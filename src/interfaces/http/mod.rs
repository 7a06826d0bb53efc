//! HTTP interfaces
//!
//! - `modules`: scrape, health and landing handlers
//! - `router`: route table and middleware stack

pub mod modules;
pub mod router;

pub use router::create_router;
