//! Infrastructure layer - external concerns

pub mod exposition;
pub mod rds;

pub use exposition::{encode_samples, TEXT_CONTENT_TYPE};
pub use rds::RdsInstanceLister;
