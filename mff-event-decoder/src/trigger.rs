//! Trigger channel synthesis
//!
//! Combines several binary per-code trigger rows into one weighted trigger
//! channel. Simultaneous activations across rows make a single channel
//! ambiguous, so the combiner refuses to produce one; the caller can keep
//! processing everything else.

/// Merge binary trigger rows into one weighted channel.
///
/// Row `i` contributes `remapping[i]` (default `i + 1`) at every sample where
/// it is nonzero. Any sample column where two or more rows are active at once
/// yields `None` with a log line instead of a partial result. Rows beyond the
/// length of an explicit `remapping` are ignored.
pub fn combine_triggers(rows: &[Vec<f64>], remapping: Option<&[f64]>) -> Option<Vec<f64>> {
    let n_samples = rows.first().map(|row| row.len()).unwrap_or(0);

    for col in 0..n_samples {
        let active = rows
            .iter()
            .filter(|row| row.get(col).copied().unwrap_or(0.0) != 0.0)
            .count();
        if active > 1 {
            log::warn!(
                "Found multiple events at the same time sample, cannot build a single trigger channel"
            );
            return None;
        }
    }

    let default_weights: Vec<f64>;
    let weights = match remapping {
        Some(weights) => weights,
        None => {
            default_weights = (1..=rows.len()).map(|i| i as f64).collect();
            &default_weights
        }
    };

    let mut trigger = vec![0.0; n_samples];
    for (row, &weight) in rows.iter().zip(weights.iter()) {
        for (col, &value) in row.iter().enumerate() {
            if value != 0.0 {
                if let Some(slot) = trigger.get_mut(col) {
                    *slot += weight;
                }
            }
        }
    }

    Some(trigger)
}
