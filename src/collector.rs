//! Per-tick aggregation of all monitor groups into one record.

use tracing::trace;

use crate::error::Result;
use crate::flatten::read_flattened;
use crate::model::{MonitorGroup, Record};
use crate::resolver::resolve;
use crate::target::TargetConnection;

/// Collects one record across `groups`, in configured order.
///
/// Each group is resolved afresh, every readable attribute is read and
/// flattened, and the pairs are merged by composite key (a later group
/// overwrites an earlier one). The first error aborts the whole tick.
pub fn collect<C>(conn: &mut C, groups: &[MonitorGroup]) -> Result<Record>
where
    C: TargetConnection + ?Sized,
{
    let mut record = Record::new();

    for group in groups {
        let descriptors = resolve(conn, group)?;
        trace!("{}: {} attributes resolved", group, descriptors.len());

        for descriptor in &descriptors {
            record.extend(read_flattened(conn, descriptor)?);
        }
    }

    Ok(record)
}
