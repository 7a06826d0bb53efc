//! Raw `DBInstance` records to [`InstanceObservation`]s

use aws_sdk_rds::types::DbInstance;

use crate::domain::{FetchError, InstanceObservation, StorageUnit};

/// Map a complete listing. The first malformed record fails the whole batch.
pub fn map_instances(
    records: &[DbInstance],
    unit: StorageUnit,
) -> Result<Vec<InstanceObservation>, FetchError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| map_instance(index, record, unit))
        .collect()
}

fn map_instance(
    index: usize,
    record: &DbInstance,
    unit: StorageUnit,
) -> Result<InstanceObservation, FetchError> {
    let malformed = |reason: &str| FetchError::MalformedRecord {
        index,
        reason: reason.to_string(),
    };

    let identifier = record
        .db_instance_identifier()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| malformed("missing DBInstanceIdentifier"))?;

    let storage = record
        .allocated_storage()
        .ok_or_else(|| malformed("missing AllocatedStorage"))?;
    if storage < 0 {
        return Err(malformed("negative AllocatedStorage"));
    }

    // Storage types without provisioned IOPS omit the field.
    let iops = record.iops().unwrap_or(0);
    if iops < 0 {
        return Err(malformed("negative Iops"));
    }

    Ok(InstanceObservation::new(
        identifier,
        unit.to_bytes(f64::from(storage)),
        f64::from(iops),
    ))
}
