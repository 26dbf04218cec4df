use crate::store::MatchRecordStore;
use serde_json::Value;

/// Walks a dotted field path (e.g. `info.participants.challenges.skillshotsHit`)
/// through one match record. Missing intermediate keys yield `None` rather
/// than an error: older payloads and early-access game modes routinely lack
/// fields, and every deriver is expected to come through here instead of
/// indexing records directly.
pub fn field<'a>(store: &'a MatchRecordStore, match_id: &str, path: &str) -> Option<&'a Value> {
    let record = store.record(match_id)?;
    path.split('.').try_fold(record, |node, key| node.get(key))
}

pub fn field_i64(store: &MatchRecordStore, match_id: &str, path: &str) -> Option<i64> {
    field(store, match_id, path).and_then(Value::as_i64)
}

pub fn field_bool(store: &MatchRecordStore, match_id: &str, path: &str) -> Option<bool> {
    field(store, match_id, path).and_then(Value::as_bool)
}

pub fn field_str<'a>(store: &'a MatchRecordStore, match_id: &str, path: &str) -> Option<&'a str> {
    field(store, match_id, path).and_then(Value::as_str)
}
