use crate::store::MatchRecordStore;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// One JSON document per player, written whole on every refresh and read
/// many times after.
pub fn cache_path(data_dir: &Path, game_name: &str, tag_line: &str) -> PathBuf {
    let no_space = game_name.replace(' ', "_");
    data_dir.join(format!("{}_{}.json", no_space, tag_line))
}

pub fn write_store(path: &Path, doc: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let serialized = serde_json::to_vec_pretty(doc)?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write cache file {}", path.display()))?;
    Ok(())
}

pub fn load_store(path: &Path) -> Result<MatchRecordStore> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read cache file {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("cache file {} is not valid JSON", path.display()))?;
    Ok(MatchRecordStore::from_value(value)?)
}
