use crate::charts::{
    ChartDeriver, ChartTable, DurationOverTime, GameModeDistribution, LaneDistribution,
    OutcomeDistribution, SkillshotUsage,
};
use crate::store::{MalformedStoreError, MatchRecordStore};
use thiserror::Error;

/// Surfaced to the caller when the store itself is structurally invalid.
/// Per-match missing fields never produce this; they only shrink individual
/// tables.
#[derive(Debug, Error)]
#[error("match history input is invalid: {0}")]
pub struct InvalidInputError(#[from] pub MalformedStoreError);

#[derive(Debug)]
pub struct ChartResult {
    pub name: &'static str,
    pub table: ChartTable,
    pub skipped: usize,
}

/// The fixed chart set, in display order.
pub fn default_derivers() -> Vec<Box<dyn ChartDeriver>> {
    vec![
        Box::new(DurationOverTime),
        Box::new(GameModeDistribution),
        Box::new(OutcomeDistribution),
        Box::new(SkillshotUsage),
        Box::new(LaneDistribution),
    ]
}

/// Runs every deriver in order against one immutable store. A structural
/// failure aborts the whole run and discards partial results; a half-rendered
/// chart set would be misleading analytics.
pub fn run_pipeline(
    store: &MatchRecordStore,
    derivers: &[Box<dyn ChartDeriver>],
) -> Result<Vec<ChartResult>, InvalidInputError> {
    let mut results = Vec::with_capacity(derivers.len());

    for deriver in derivers {
        let derivation = deriver.derive(store)?;
        if derivation.skipped > 0 {
            tracing::warn!(
                chart = deriver.name(),
                skipped = derivation.skipped,
                "matches excluded for missing fields"
            );
        }
        results.push(ChartResult {
            name: deriver.name(),
            table: derivation.table,
            skipped: derivation.skipped,
        });
    }

    Ok(results)
}
