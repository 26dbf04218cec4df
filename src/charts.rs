use crate::extract;
use crate::store::{MalformedStoreError, MatchRecordStore};
use chrono::{DateTime, NaiveDate};
use std::fmt;
use tracing::warn;

/// One cell of a chart table. Durations are carried as elapsed seconds, not
/// calendar timestamps; any datetime-axis trickery a charting frontend needs
/// to plot them stays on the rendering side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Int(i64),
    Date(NaiveDate),
    Elapsed(i64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::Int(value) => write!(f, "{}", value),
            CellValue::Date(value) => write!(f, "{}", value),
            CellValue::Elapsed(seconds) => {
                write!(f, "{}:{:02}:{:02}", seconds / 3600, seconds % 3600 / 60, seconds % 60)
            }
        }
    }
}

/// A chart-ready table: named columns plus rows in display order. This is the
/// contract boundary with whatever renders the chart; no plotting library
/// types leak in here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTable {
    pub title: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<CellValue>>,
}

/// A deriver's output: the table plus how many matches were excluded because
/// a field this chart needs was missing.
#[derive(Debug)]
pub struct Derivation {
    pub table: ChartTable,
    pub skipped: usize,
}

pub trait ChartDeriver {
    fn name(&self) -> &'static str;
    fn derive(&self, store: &MatchRecordStore) -> Result<Derivation, MalformedStoreError>;
}

/// Riot ships Arena under the internal mode name `CHERRY`; every chart that
/// shows a game mode applies the same display alias.
fn display_mode(mode: &str) -> &str {
    if mode == "CHERRY" { "ARENA" } else { mode }
}

fn bump(counts: &mut Vec<(String, i64)>, key: &str) {
    match counts.iter_mut().find(|(name, _)| name == key) {
        Some((_, count)) => *count += 1,
        None => counts.push((key.to_string(), 1)),
    }
}

/// One `(date, duration)` row per match that has both `gameCreation` and
/// `gameDuration`, in store order.
pub struct DurationOverTime;

impl ChartDeriver for DurationOverTime {
    fn name(&self) -> &'static str {
        "duration_over_time"
    }

    fn derive(&self, store: &MatchRecordStore) -> Result<Derivation, MalformedStoreError> {
        let mut rows = Vec::new();
        let mut skipped = 0;

        for match_id in store.match_ids() {
            let creation = extract::field_i64(store, match_id, "info.gameCreation");
            let duration = extract::field_i64(store, match_id, "info.gameDuration");

            let date = creation
                .and_then(|millis| DateTime::from_timestamp(millis / 1000, 0))
                .map(|dt| dt.date_naive());

            match (date, duration) {
                (Some(date), Some(duration)) => {
                    rows.push(vec![CellValue::Date(date), CellValue::Elapsed(duration)]);
                }
                _ => {
                    warn!(match_id, chart = self.name(), "match skipped: missing timing fields");
                    skipped += 1;
                }
            }
        }

        Ok(Derivation {
            table: ChartTable {
                title: "Duration of Recent Games",
                columns: vec!["date", "duration"],
                rows,
            },
            skipped,
        })
    }
}

/// Match count per game mode, grouped after the `CHERRY -> ARENA` alias.
pub struct GameModeDistribution;

impl ChartDeriver for GameModeDistribution {
    fn name(&self) -> &'static str {
        "game_mode_distribution"
    }

    fn derive(&self, store: &MatchRecordStore) -> Result<Derivation, MalformedStoreError> {
        let mut counts: Vec<(String, i64)> = Vec::new();
        let mut skipped = 0;

        for match_id in store.match_ids_required()? {
            match extract::field_str(store, match_id, "info.gameMode") {
                Some(mode) => bump(&mut counts, display_mode(mode)),
                None => {
                    warn!(match_id, chart = self.name(), "match skipped: missing gameMode");
                    skipped += 1;
                }
            }
        }

        let rows = counts
            .into_iter()
            .map(|(mode, count)| vec![CellValue::Text(mode), CellValue::Int(count)])
            .collect();

        Ok(Derivation {
            table: ChartTable {
                title: "Game Mode Distribution",
                columns: vec!["game_mode", "count"],
                rows,
            },
            skipped,
        })
    }
}

const OUTCOME_CATEGORIES: [&str; 4] =
    ["win", "gameEndedInSurrender", "gameEndedInEarlySurrender", "loss"];

/// Win / surrender / early-surrender / loss counts. Classification precedence:
/// a win is a win no matter how the game ended; an early surrender (remake)
/// trumps a regular surrender; everything else is a plain loss.
pub struct OutcomeDistribution;

impl ChartDeriver for OutcomeDistribution {
    fn name(&self) -> &'static str {
        "outcome_distribution"
    }

    fn derive(&self, store: &MatchRecordStore) -> Result<Derivation, MalformedStoreError> {
        let mut counts = [0i64; 4];
        let mut skipped = 0;

        for match_id in store.match_ids_required()? {
            let win = extract::field_bool(store, match_id, "info.participants.win");
            let surrender =
                extract::field_bool(store, match_id, "info.participants.gameEndedInSurrender");
            let early =
                extract::field_bool(store, match_id, "info.participants.gameEndedInEarlySurrender");

            let (Some(win), Some(surrender), Some(early)) = (win, surrender, early) else {
                warn!(match_id, chart = self.name(), "match skipped: missing outcome fields");
                skipped += 1;
                continue;
            };

            let category = if win {
                0
            } else if surrender && !early {
                1
            } else if !surrender && !early {
                3
            } else {
                2
            };
            counts[category] += 1;
        }

        let rows = OUTCOME_CATEGORIES
            .iter()
            .zip(counts)
            .map(|(category, count)| vec![CellValue::Text(category.to_string()), CellValue::Int(count)])
            .collect();

        Ok(Derivation {
            table: ChartTable {
                title: "Win / Surrender / Loss",
                columns: vec!["outcome", "count"],
                rows,
            },
            skipped,
        })
    }
}

/// One `(skillshotsHit, abilityUses, gameMode)` row per match whose
/// participant record carries both challenge counters.
pub struct SkillshotUsage;

impl ChartDeriver for SkillshotUsage {
    fn name(&self) -> &'static str {
        "skillshot_usage"
    }

    fn derive(&self, store: &MatchRecordStore) -> Result<Derivation, MalformedStoreError> {
        let mut rows = Vec::new();
        let mut skipped = 0;

        for match_id in store.match_ids() {
            let skillshots =
                extract::field_i64(store, match_id, "info.participants.challenges.skillshotsHit");
            let abilities =
                extract::field_i64(store, match_id, "info.participants.challenges.abilityUses");
            let mode = extract::field_str(store, match_id, "info.gameMode");

            let (Some(skillshots), Some(abilities), Some(mode)) = (skillshots, abilities, mode)
            else {
                warn!(match_id, chart = self.name(), "match skipped: missing challenge fields");
                skipped += 1;
                continue;
            };

            rows.push(vec![
                CellValue::Int(skillshots),
                CellValue::Int(abilities),
                CellValue::Text(display_mode(mode).to_string()),
            ]);
        }

        Ok(Derivation {
            table: ChartTable {
                title: "Skillshots Hit vs. Ability Uses",
                columns: vec!["skillshots_hit", "ability_uses", "game_mode"],
                rows,
            },
            skipped,
        })
    }
}

const LANE_BUCKETS: [&str; 6] = ["TOP", "JUNGLE", "MIDDLE", "BOTTOM", "SUPPORT", "NO ROLE"];

/// Match count per assigned lane. Classification is total: anything outside
/// the five named lanes, including a missing `lane` field, lands in the
/// `NO ROLE` bucket rather than being skipped.
pub struct LaneDistribution;

impl ChartDeriver for LaneDistribution {
    fn name(&self) -> &'static str {
        "lane_distribution"
    }

    fn derive(&self, store: &MatchRecordStore) -> Result<Derivation, MalformedStoreError> {
        let mut counts = [0i64; 6];

        for match_id in store.match_ids_required()? {
            let lane = extract::field_str(store, match_id, "info.participants.lane");
            let bucket = lane
                .and_then(|lane| LANE_BUCKETS[..5].iter().position(|known| *known == lane))
                .unwrap_or(5);
            counts[bucket] += 1;
        }

        let rows = LANE_BUCKETS
            .iter()
            .zip(counts)
            .map(|(bucket, count)| vec![CellValue::Text(bucket.to_string()), CellValue::Int(count)])
            .collect();

        Ok(Derivation {
            table: ChartTable {
                title: "Lane Distribution",
                columns: vec!["lane", "count"],
                rows,
            },
            skipped: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(value: serde_json::Value) -> MatchRecordStore {
        MatchRecordStore::from_value(value).unwrap()
    }

    fn mode_counts(derivation: &Derivation) -> Vec<(String, i64)> {
        derivation
            .table
            .rows
            .iter()
            .map(|row| match (&row[0], &row[1]) {
                (CellValue::Text(name), CellValue::Int(count)) => (name.clone(), *count),
                other => panic!("unexpected row shape: {:?}", other),
            })
            .collect()
    }

    #[test]
    fn elapsed_cell_formats_as_clock_time() {
        assert_eq!(CellValue::Elapsed(0).to_string(), "0:00:00");
        assert_eq!(CellValue::Elapsed(59).to_string(), "0:00:59");
        assert_eq!(CellValue::Elapsed(1865).to_string(), "0:31:05");
        assert_eq!(CellValue::Elapsed(7322).to_string(), "2:02:02");
    }

    #[test]
    fn duration_rows_follow_store_order_and_keep_elapsed_seconds() {
        let derivation = DurationOverTime
            .derive(&store(json!({
                "summonerInfo": {"puuid": "abc"},
                // 2024-03-01T12:00:00Z
                "NA1_2": {"info": {"gameCreation": 1709294400000i64, "gameDuration": 1865}},
                "NA1_1": {"info": {"gameCreation": 1709208000000i64, "gameDuration": 240}},
            })))
            .unwrap();

        assert_eq!(derivation.skipped, 0);
        assert_eq!(derivation.table.columns, vec!["date", "duration"]);
        assert_eq!(
            derivation.table.rows,
            vec![
                vec![
                    CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
                    CellValue::Elapsed(1865),
                ],
                vec![
                    CellValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
                    CellValue::Elapsed(240),
                ],
            ]
        );
    }

    #[test]
    fn duration_skips_matches_missing_either_timing_field() {
        let derivation = DurationOverTime
            .derive(&store(json!({
                "NA1_1": {"info": {"gameCreation": 1709294400000i64}},
                "NA1_2": {"info": {"gameDuration": 1800}},
                "NA1_3": {"info": {"gameCreation": 1709294400000i64, "gameDuration": 1800}},
            })))
            .unwrap();

        assert_eq!(derivation.table.rows.len(), 1);
        assert_eq!(derivation.skipped, 2);
    }

    #[test]
    fn game_modes_group_with_cherry_alias() {
        let derivation = GameModeDistribution
            .derive(&store(json!({
                "NA1_1": {"info": {"gameMode": "CLASSIC"}},
                "NA1_2": {"info": {"gameMode": "CHERRY"}},
                "NA1_3": {"info": {"gameMode": "CLASSIC"}},
                "NA1_4": {"info": {}},
            })))
            .unwrap();

        assert_eq!(
            mode_counts(&derivation),
            vec![("CLASSIC".to_string(), 2), ("ARENA".to_string(), 1)]
        );
        assert_eq!(derivation.skipped, 1);
    }

    #[test]
    fn game_mode_count_sum_matches_eligible_matches() {
        let derivation = GameModeDistribution
            .derive(&store(json!({
                "NA1_1": {"info": {"gameMode": "ARAM"}},
                "NA1_2": {"info": {"gameMode": "CLASSIC"}},
                "NA1_3": {"info": {}},
            })))
            .unwrap();

        let total: i64 = mode_counts(&derivation).iter().map(|(_, count)| count).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn outcome_precedence_covers_all_four_categories() {
        fn participant(win: bool, surrender: bool, early: bool) -> serde_json::Value {
            json!({"info": {"participants": {
                "win": win,
                "gameEndedInSurrender": surrender,
                "gameEndedInEarlySurrender": early,
            }}})
        }

        let derivation = OutcomeDistribution
            .derive(&store(json!({
                "NA1_1": participant(true, false, false),
                "NA1_2": participant(true, true, true),
                "NA1_3": participant(false, true, false),
                "NA1_4": participant(false, false, false),
                // Both surrender flags set: the early surrender wins.
                "NA1_5": participant(false, true, true),
                "NA1_6": participant(false, false, true),
            })))
            .unwrap();

        assert_eq!(
            mode_counts(&derivation),
            vec![
                ("win".to_string(), 2),
                ("gameEndedInSurrender".to_string(), 1),
                ("gameEndedInEarlySurrender".to_string(), 2),
                ("loss".to_string(), 1),
            ]
        );
        assert_eq!(derivation.skipped, 0);
    }

    #[test]
    fn outcome_skips_matches_missing_any_flag() {
        let derivation = OutcomeDistribution
            .derive(&store(json!({
                "NA1_1": {"info": {"participants": {"win": true}}},
                "NA1_2": {"info": {"participants": {
                    "win": false,
                    "gameEndedInSurrender": false,
                    "gameEndedInEarlySurrender": false,
                }}},
            })))
            .unwrap();

        let total: i64 = mode_counts(&derivation).iter().map(|(_, count)| count).sum();
        assert_eq!(total, 1);
        assert_eq!(derivation.skipped, 1);
    }

    #[test]
    fn skillshot_rows_need_both_counters() {
        let derivation = SkillshotUsage
            .derive(&store(json!({
                "NA1_1": {"info": {
                    "gameMode": "CHERRY",
                    "participants": {"challenges": {"skillshotsHit": 30, "abilityUses": 120}},
                }},
                "NA1_2": {"info": {
                    "gameMode": "CLASSIC",
                    "participants": {"challenges": {"skillshotsHit": 10}},
                }},
            })))
            .unwrap();

        assert_eq!(
            derivation.table.rows,
            vec![vec![
                CellValue::Int(30),
                CellValue::Int(120),
                CellValue::Text("ARENA".to_string()),
            ]]
        );
        assert_eq!(derivation.skipped, 1);
    }

    #[test]
    fn skillshot_table_is_empty_when_no_match_has_challenges() {
        let derivation = SkillshotUsage
            .derive(&store(json!({
                "NA1_1": {"info": {
                    "gameMode": "CLASSIC",
                    "participants": {"challenges": {"skillshotsHit": 10}},
                }},
            })))
            .unwrap();

        assert!(derivation.table.rows.is_empty());
        assert_eq!(derivation.skipped, 1);
    }

    #[test]
    fn lane_classification_is_total() {
        let derivation = LaneDistribution
            .derive(&store(json!({
                "NA1_1": {"info": {"participants": {"lane": "TOP"}}},
                "NA1_2": {"info": {"participants": {"lane": "BOTTOM"}}},
                "NA1_3": {"info": {"participants": {"lane": "AFK"}}},
                "NA1_4": {"info": {"participants": {}}},
                "NA1_5": {"info": {}},
            })))
            .unwrap();

        let counts = mode_counts(&derivation);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts[0], ("TOP".to_string(), 1));
        assert_eq!(counts[3], ("BOTTOM".to_string(), 1));
        assert_eq!(counts[5], ("NO ROLE".to_string(), 3));

        // No match is dropped for lane reasons.
        let total: i64 = counts.iter().map(|(_, count)| count).sum();
        assert_eq!(total, 5);
        assert_eq!(derivation.skipped, 0);
    }

    #[test]
    fn distribution_derivers_reject_empty_history() {
        let empty = store(json!({"summonerInfo": {"puuid": "abc"}}));
        assert!(GameModeDistribution.derive(&empty).is_err());
        assert!(OutcomeDistribution.derive(&empty).is_err());
        assert!(LaneDistribution.derive(&empty).is_err());

        // Row-emitting charts tolerate an empty history.
        assert!(DurationOverTime.derive(&empty).unwrap().table.rows.is_empty());
        assert!(SkillshotUsage.derive(&empty).unwrap().table.rows.is_empty());
    }
}
