//! Extract stage: raw line to `(key, seed)`.

use super::{GROUP_ALL, RECORD_FIELD_COUNT};

/// Split one raw line and emit its grouping key and seed tuple.
///
/// A line is meaningful only when it splits into exactly nine fields; any
/// other count returns `None` with no error. The seed joins the time spent
/// field (index 2) and the estimated revenue field (index 6) with the same
/// delimiter, as raw strings. Numeric conversion is deferred to the
/// aggregation stages, so malformed numeric content passes through here
/// untouched.
pub fn extract(line: &str, delimiter: char) -> Option<(String, String)> {
    let fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() != RECORD_FIELD_COUNT {
        return None;
    }
    let seed = format!("{}{}{}", fields[2], delimiter, fields[6]);
    Some((GROUP_ALL.to_string(), seed))
}
