//! Extract/combine/reduce pipeline over delimited page view records.
//!
//! A raw record is one line of text split on a fixed single-character
//! delimiter into exactly nine fields. The extract stage picks out the time
//! spent and estimated revenue fields; the combine stage pre-aggregates them
//! per key; the reduce stage produces the final `(ts_sum, er_avg)` record.
//!
//! The combine and reduce stages share one accumulation discipline, and its
//! ordering is load-bearing: the integer field is summed before the float
//! field is even attempted, so a tuple whose float field fails to parse has
//! still contributed to `ts_sum`. See [`PartialAggregate::fold`].

pub mod combine;
pub mod extract;
pub mod reduce;

/// Field delimiter used by the page view data set (Ctrl-A).
pub const DEFAULT_DELIMITER: char = '\u{1}';

/// Grouping key shared by every record: this pipeline aggregates globally.
pub const GROUP_ALL: &str = "all";

/// Number of fields a raw record must have to be meaningful.
pub const RECORD_FIELD_COUNT: usize = 9;

/// In-progress accumulation of one key's tuples.
///
/// `er_cnt` counts only tuples whose integer *and* float fields both
/// parsed; a tuple that contributed to `ts_sum` alone is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PartialAggregate {
    pub ts_sum: i64,
    pub er_sum: f64,
    pub er_cnt: u64,
}

impl PartialAggregate {
    /// Fold one delimited tuple into the accumulator.
    ///
    /// The tuple's first sub-field is parsed as an integer; on failure the
    /// tuple is skipped entirely. On success `ts_sum` is updated
    /// immediately, and only then is the second sub-field attempted as a
    /// float. A float that fails to parse (or a missing second sub-field)
    /// leaves `er_sum` and `er_cnt` untouched while the `ts_sum`
    /// contribution stands. Sub-fields past the second are ignored, which
    /// is what lets reduce re-derive its own count from 3-field partials.
    pub fn fold(mut self, tuple: &str, delimiter: char) -> Self {
        let mut fields = tuple.split(delimiter);
        let Some(ts) = fields.next().and_then(|f| f.parse::<i64>().ok()) else {
            return self;
        };
        self.ts_sum += ts;
        if let Some(er) = fields.next().and_then(|f| f.parse::<f64>().ok()) {
            self.er_sum += er;
            self.er_cnt += 1;
        }
        self
    }

    /// Encode as the 3-field intermediate tuple consumed by reduce.
    pub fn encode(&self, delimiter: char) -> String {
        format!(
            "{}{}{}{}{}",
            self.ts_sum, delimiter, self.er_sum, delimiter, self.er_cnt
        )
    }
}

/// The terminal aggregate for one key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalAggregate {
    pub ts_sum: i64,
    pub er_avg: f64,
}

/// The extractor/combiner/reducer triple handed to the substrate as one job.
///
/// Stages are pure; the struct only carries the delimiter they agree on.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline {
    delimiter: char,
}

impl Pipeline {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Extract stage, see [`extract::extract`].
    pub fn extract(&self, line: &str) -> Option<(String, String)> {
        extract::extract(line, self.delimiter)
    }

    /// Combine stage, see [`combine::combine`].
    pub fn combine<'a, I>(&self, values: I) -> PartialAggregate
    where
        I: IntoIterator<Item = &'a str>,
    {
        combine::combine(values, self.delimiter)
    }

    /// Reduce stage, see [`reduce::reduce`].
    pub fn reduce<'a, I>(&self, values: I) -> FinalAggregate
    where
        I: IntoIterator<Item = &'a str>,
    {
        reduce::reduce(values, self.delimiter)
    }

    /// Format one output line: `key<TAB>ts_sum<delimiter>er_avg`.
    pub fn format_output(&self, key: &str, agg: &FinalAggregate) -> String {
        format!("{key}\t{}{}{}", agg.ts_sum, self.delimiter, agg.er_avg)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}
