//! Quantity mutation rules.
//!
//! Relative adjustment clamps at zero; absolute set does not. The two paths
//! are deliberately asymmetric and the store must keep them that way.

/// Quantity after applying a signed `change` to `current`.
///
/// Never negative: any result below zero becomes zero. Saturates instead of
/// overflowing at the `i64` bounds.
pub fn adjusted_quantity(current: i64, change: i64) -> i64 {
    current.saturating_add(change).max(0)
}
