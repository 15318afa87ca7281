pub(in crate::unbonding) const UNBONDING_PREFIX: &str = "parent/unbonding/";

/// Example: `parent/unbonding/00000000000000000003`.
///                            |  sequence, padded |
///
/// The sequence is zero-padded so that lexicographic key order is numeric order.
pub(in crate::unbonding) fn unbonding_sequence(sequence: u64) -> String {
    format!("{UNBONDING_PREFIX}{sequence:020}")
}
