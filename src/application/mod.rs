pub mod bridge;
pub mod ports;

pub use bridge::MetricBridge;
pub use ports::{InstanceLister, SharedInstanceLister};
