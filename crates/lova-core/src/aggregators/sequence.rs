//! Ordering of per-event sequences

/// Position of every event in a latest-first ordering of `dates`.
///
/// `result[i]` is the rank of `dates[i]` when the dates are sorted newest
/// first. The newest-first order is the reverse of a stable oldest-first
/// sort, so among equal dates the later event ranks first.
pub fn sequence_order_from_date(dates: &[i64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&index| dates[index]);
    order.reverse();

    let mut positions = vec![0; dates.len()];
    for (rank, index) in order.into_iter().enumerate() {
        positions[index] = rank;
    }
    positions
}
