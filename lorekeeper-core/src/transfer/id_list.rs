//! The comma-joined id-list encoding used by character and asset rows
//! (`"3,10,12"`).

use crate::errors::{TransferError, TransferResult};

/// Parse `"1, 2,,3"` into `[1, 2, 3]`; blank segments are skipped.
pub fn parse_id_list(raw: &str) -> TransferResult<Vec<i32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .parse::<i32>()
                .map_err(|_| TransferError::InvalidIdList(raw.to_string()))
        })
        .collect()
}

pub fn join_id_list(ids: &[i32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
