//! Reduce stage: fold one key's partials (or raw seeds) into the final record.

use super::{FinalAggregate, PartialAggregate};

/// Produce the final aggregate for one key.
///
/// Applies the same two-step parse-then-accumulate fold as the combine
/// stage to the first two sub-fields of each incoming tuple, whether that
/// tuple is a 3-field partial or a 2-field raw seed. The incoming third
/// field — the count an upstream combine carried — is never read: the
/// divisor is re-derived here as the number of tuples that double-parsed at
/// this stage. When combine merged several records into one partial, that
/// divisor differs from the number of original records, and the average
/// reflects it. Downstream consumers of this data set expect exactly that
/// figure, so the derivation is kept as is.
///
/// The division is unguarded: a key with zero double-parsed tuples yields
/// `NaN` rather than an error.
pub fn reduce<'a, I>(values: I, delimiter: char) -> FinalAggregate
where
    I: IntoIterator<Item = &'a str>,
{
    let acc = values
        .into_iter()
        .fold(PartialAggregate::default(), |acc, v| acc.fold(v, delimiter));
    FinalAggregate {
        ts_sum: acc.ts_sum,
        er_avg: acc.er_sum / acc.er_cnt as f64,
    }
}
