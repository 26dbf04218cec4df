use serde_json::Value;
use thiserror::Error;

/// Key under which the player's own account record lives in the cached
/// document. Every other top-level key is treated as a match identifier.
pub const SUMMONER_INFO_KEY: &str = "summonerInfo";

#[derive(Debug, Error)]
pub enum MalformedStoreError {
    #[error("player document is not a JSON object")]
    NotAnObject,
    #[error("player document contains no match entries")]
    NoMatches,
}

/// One player's match history document: an optional `summonerInfo` entry plus
/// match records keyed by match id, in the order the upstream match-list call
/// returned them (most recent first).
///
/// The store is read-only once built; a pipeline run never mutates it.
#[derive(Debug)]
pub struct MatchRecordStore {
    doc: serde_json::Map<String, Value>,
}

impl MatchRecordStore {
    pub fn from_value(value: Value) -> Result<Self, MalformedStoreError> {
        match value {
            Value::Object(doc) => Ok(Self { doc }),
            _ => Err(MalformedStoreError::NotAnObject),
        }
    }

    pub fn summoner_info(&self) -> Option<&Value> {
        self.doc.get(SUMMONER_INFO_KEY)
    }

    /// Ordered match ids, excluding the `summonerInfo` entry.
    pub fn match_ids(&self) -> impl Iterator<Item = &str> {
        self.doc
            .keys()
            .map(String::as_str)
            .filter(|key| *key != SUMMONER_INFO_KEY)
    }

    /// Same as [`match_ids`](Self::match_ids), for derivers that cannot
    /// produce a meaningful chart from an empty history.
    pub fn match_ids_required(&self) -> Result<Vec<&str>, MalformedStoreError> {
        let ids: Vec<&str> = self.match_ids().collect();
        if ids.is_empty() {
            return Err(MalformedStoreError::NoMatches);
        }
        Ok(ids)
    }

    pub fn record(&self, match_id: &str) -> Option<&Value> {
        if match_id == SUMMONER_INFO_KEY {
            return None;
        }
        self.doc.get(match_id)
    }

    pub fn match_count(&self) -> usize {
        self.match_ids().count()
    }
}
