//! Instance observations produced by the inventory fetcher

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unit the provider reports `AllocatedStorage` in.
///
/// RDS documents allocated storage in gibibytes. `Gigabytes` keeps the
/// decimal factor older dashboards were built against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageUnit {
    #[default]
    Gibibytes,
    Gigabytes,
}

impl StorageUnit {
    /// Bytes in one unit.
    pub fn bytes_per_unit(self) -> f64 {
        match self {
            Self::Gibibytes => 1_073_741_824.0,
            Self::Gigabytes => 1_000_000_000.0,
        }
    }

    pub fn to_bytes(self, amount: f64) -> f64 {
        amount * self.bytes_per_unit()
    }
}

impl fmt::Display for StorageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gibibytes => write!(f, "gibibytes"),
            Self::Gigabytes => write!(f, "gigabytes"),
        }
    }
}

impl FromStr for StorageUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gibibytes" | "gib" => Ok(Self::Gibibytes),
            "gigabytes" | "gb" => Ok(Self::Gigabytes),
            other => Err(format!("unknown storage unit '{}'", other)),
        }
    }
}

/// One RDS instance as seen by a single fetch.
///
/// Built fresh on every collection cycle and dropped once turned into
/// samples.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceObservation {
    /// `DBInstanceIdentifier`, unique within a region.
    pub identifier: String,
    /// Allocated storage normalized to bytes.
    pub allocated_storage_bytes: f64,
    /// Provisioned IOPS, `0.0` for storage types without them.
    pub provisioned_iops: f64,
}

impl InstanceObservation {
    pub fn new(
        identifier: impl Into<String>,
        allocated_storage_bytes: f64,
        provisioned_iops: f64,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            allocated_storage_bytes,
            provisioned_iops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gibibyte_conversion() {
        assert_eq!(StorageUnit::Gibibytes.to_bytes(20.0), 21_474_836_480.0);
    }

    #[test]
    fn test_gigabyte_conversion() {
        assert_eq!(StorageUnit::Gigabytes.to_bytes(55.0), 55_000_000_000.0);
    }

    #[test]
    fn test_storage_unit_parse() {
        assert_eq!("GiB".parse::<StorageUnit>(), Ok(StorageUnit::Gibibytes));
        assert_eq!("gigabytes".parse::<StorageUnit>(), Ok(StorageUnit::Gigabytes));
        assert!("terabytes".parse::<StorageUnit>().is_err());
    }

    #[test]
    fn test_storage_unit_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            unit: StorageUnit,
        }

        let w: Wrapper = toml::from_str("unit = \"gigabytes\"").unwrap();
        assert_eq!(w.unit, StorageUnit::Gigabytes);
    }
}
