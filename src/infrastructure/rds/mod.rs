//! AWS RDS inventory fetcher

pub mod client;
pub mod mapping;

pub use client::RdsInstanceLister;
pub use mapping::map_instances;
