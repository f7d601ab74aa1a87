//! Row transform
//!
//! Pure function from one parsed record and its 1-based ordinal to the
//! record that gets serialized: field names and values upper-cased, plus
//! the `processedAt` timestamp and `processedRow` ordinal appended. No I/O,
//! no state beyond the caller-supplied ordinal, never fails.

use chrono::{SecondsFormat, Utc};

use super::record::Record;

/// Name of the appended processing-timestamp field
pub const PROCESSED_AT_FIELD: &str = "processedAt";

/// Name of the appended 1-based ordinal field
pub const PROCESSED_ROW_FIELD: &str = "processedRow";

/// Transform one record.
///
/// `ordinal` is the record's 1-based position in the stream; the caller is
/// responsible for it being monotonically increasing without gaps.
pub fn transform(record: &Record, ordinal: u64) -> Record {
    let mut out = Record::with_capacity(record.len() + 2);

    for (name, value) in record.iter() {
        out.push(name.to_uppercase(), value.to_uppercase());
    }

    out.push(
        PROCESSED_AT_FIELD,
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    );
    out.push(PROCESSED_ROW_FIELD, ordinal.to_string());

    out
}
