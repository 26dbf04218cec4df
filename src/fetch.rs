use crate::riot_api::RiotClient;
use crate::store::SUMMONER_INFO_KEY;
use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

/// Builds one player's match history document: a `summonerInfo` entry plus
/// the `count` most recent matches keyed by match id, in the order the
/// match-list endpoint returned them.
///
/// Each match payload is narrowed at build time: the full participant list is
/// replaced with the single entry belonging to the queried player, so the
/// cached document only carries that player's stats.
pub fn build_store(
    client: &RiotClient,
    game_name: &str,
    tag_line: &str,
    count: usize,
) -> Result<Value> {
    let account = client
        .get_account_by_riot_id(game_name, tag_line)
        .with_context(|| format!("failed to look up {}#{}", game_name, tag_line))?;
    let puuid = account.puuid;

    let summoner = client
        .get_summoner_by_puuid(&puuid)
        .context("failed to fetch summoner info")?;

    let mut doc = Map::new();
    doc.insert(
        SUMMONER_INFO_KEY.to_string(),
        json!({
            "puuid": puuid,
            "summoner_name": game_name,
            "tagline": tag_line,
            "region": client.platform(),
            "summonerLevel": summoner.get("summonerLevel").cloned().unwrap_or(Value::Null),
            "profileIconId": summoner.get("profileIconId").cloned().unwrap_or(Value::Null),
        }),
    );

    let match_ids = client
        .get_match_ids_by_puuid(&puuid, count)
        .context("failed to fetch match id list")?;
    let total = match_ids.len();

    for (idx, match_id) in match_ids.iter().enumerate() {
        info!(%match_id, "fetching match {}/{}", idx + 1, total);

        let mut match_json = match client.get_match_json(match_id) {
            Ok(json) => json,
            Err(err) => {
                warn!(%match_id, "skipping match that failed to download: {}", err);
                continue;
            }
        };

        narrow_participants(&mut match_json, &puuid);
        doc.insert(match_id.clone(), match_json);
    }

    Ok(Value::Object(doc))
}

/// Replaces `info.participants` with the single participant record matching
/// `puuid`. If the player is absent from the list (seen with some
/// early-access modes), the field is dropped and the pipeline's per-match
/// tolerance takes over.
fn narrow_participants(match_json: &mut Value, puuid: &str) {
    let Some(info) = match_json.get_mut("info") else {
        return;
    };

    let own = info
        .get("participants")
        .and_then(Value::as_array)
        .and_then(|list| {
            list.iter()
                .find(|p| p.get("puuid").and_then(Value::as_str) == Some(puuid))
                .cloned()
        });

    let Some(info) = info.as_object_mut() else {
        return;
    };

    match own {
        Some(participant) => {
            info.insert("participants".to_string(), participant);
        }
        None => {
            info.remove("participants");
        }
    }
}
