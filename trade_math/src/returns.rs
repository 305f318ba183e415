//! Period-over-period returns

/// Percentage change between consecutive values
///
/// Index 0 is always `None`. An entry is also `None` when the previous value is
/// exactly zero, since the change is undefined there.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut changes = Vec::with_capacity(values.len());
    if values.is_empty() {
        return changes;
    }

    changes.push(None);
    changes.extend(values.windows(2).map(|w| relative_change(w[0], w[1])));
    changes
}

/// `(current - previous) / previous`, or `None` from a zero base
pub fn relative_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous)
    }
}
