//! Z-order allocation.
//!
//! Stacking keys are coarse wall-clock buckets rather than a counter: one
//! unit per 100 ms elapsed since a fixed epoch. Concurrent creations in the
//! same bucket may tie; ties are broken by the hit-test partition rule.

use std::time::{SystemTime, UNIX_EPOCH};

/// Fixed epoch in unix milliseconds.
const Z_EPOCH_MS: u64 = 1_729_536_285_367;

/// Bucket width in milliseconds.
const Z_BUCKET_MS: u64 = 100;

/// Stacking key for a given wall-clock time in unix milliseconds.
/// Times before the epoch saturate to zero.
pub fn z_index_at(now_ms: u64) -> i64 {
    (now_ms.saturating_sub(Z_EPOCH_MS) / Z_BUCKET_MS) as i64
}

/// Allocate a stacking key for "now". Later calls never produce a smaller
/// key than earlier ones (within clock sanity).
pub fn make_z_index() -> i64 {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(Z_EPOCH_MS);
    z_index_at(now_ms)
}

/// Stacking key for a block the user just touched: one above the current
/// bucket, so a dragged block clears anything created in the same tick.
pub fn make_raised_z_index() -> i64 {
    make_z_index() + 1
}
