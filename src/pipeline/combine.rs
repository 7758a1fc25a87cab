//! Combine stage: pre-aggregate one key's seeds into a partial tuple.
//!
//! The substrate may invoke this zero, one, or many times per key and may
//! feed it prior partials as well as raw seeds. Its output is never trusted
//! as final; the reduce stage re-validates everything it receives.

use super::PartialAggregate;

/// Merge a stream of tuples sharing one key into a single partial aggregate.
///
/// A pure fold over the input order, with the skip semantics documented on
/// [`PartialAggregate::fold`]: an unparsable integer drops the whole tuple,
/// an unparsable float drops only the `er_sum`/`er_cnt` contribution.
pub fn combine<'a, I>(values: I, delimiter: char) -> PartialAggregate
where
    I: IntoIterator<Item = &'a str>,
{
    values
        .into_iter()
        .fold(PartialAggregate::default(), |acc, v| acc.fold(v, delimiter))
}
