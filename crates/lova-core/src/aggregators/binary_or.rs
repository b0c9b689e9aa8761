//! Bitwise OR aggregation of label codes

/// OR every code of every list together.
///
/// Used to collapse the per-event codes of an interaction into one flag set
/// when only presence matters.
pub fn calculate_binary_or(lists: &[Vec<u64>]) -> u64 {
    lists
        .iter()
        .map(|codes| codes.iter().fold(0u64, |acc, code| acc | code))
        .fold(0u64, |acc, code| acc | code)
}
