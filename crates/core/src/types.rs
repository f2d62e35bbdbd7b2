/// Record identifiers issued by the PAD record store.
pub type DbId = i64;

/// Record timestamps carry no zone; the store writes them in server-local time.
pub type Timestamp = chrono::NaiveDateTime;

/// Wire format for timestamps in semantic documents.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render a timestamp in the normalized textual form used on the wire.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}
