use crate::error::{Error, Result};

/// Start of the `resolution`-wide bucket containing `timestamp`.
///
/// Buckets are floor-aligned to the epoch, so negative timestamps round
/// towards negative infinity rather than towards zero.
pub fn bucket(timestamp: i64, resolution: i64) -> Result<i64> {
    if resolution <= 0 {
        return Err(Error::invalid_argument(format!(
            "invalid resolution: {resolution}, must be greater than 0"
        )));
    }

    timestamp
        .div_euclid(resolution)
        .checked_mul(resolution)
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "bucket of timestamp {timestamp} at resolution {resolution} is out of range"
            ))
        })
}
