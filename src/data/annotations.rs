use serde::Deserialize;
use std::collections::HashMap;

/// Number of distinct dot colors; counts beyond this render as a "+N" suffix.
pub const PALETTE_SIZE: u32 = 7;

/// Per-day event counts for one displayed month, exactly as the server
/// returns them: an object keyed by unpadded day-of-month strings.
/// Fetched fresh per month, never cached or persisted.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationMap(HashMap<String, u32>);

impl AnnotationMap {
    pub fn count_for(&self, day: u32) -> u32 {
        self.0.get(&day.to_string()).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Days that carry at least one event, sorted numerically. Non-numeric
    /// keys (which a well-behaved server never sends) are skipped.
    pub fn annotated_days(&self) -> Vec<(u32, u32)> {
        let mut days: Vec<(u32, u32)> = self
            .0
            .iter()
            .filter_map(|(k, &count)| k.parse::<u32>().ok().map(|day| (day, count)))
            .filter(|&(_, count)| count > 0)
            .collect();
        days.sort_unstable();
        days
    }
}

#[cfg(test)]
impl AnnotationMap {
    pub fn from_pairs(pairs: &[(&str, u32)]) -> Self {
        AnnotationMap(
            pairs
                .iter()
                .map(|&(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

/// Dot-row shape for one day cell: how many colored dots to draw and the
/// overflow count for the "+N" suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerRow {
    pub dots: u32,
    pub overflow: Option<u32>,
}

pub fn markers_for(count: u32) -> MarkerRow {
    MarkerRow {
        dots: count.min(PALETTE_SIZE),
        overflow: (count > PALETTE_SIZE).then(|| count - PALETTE_SIZE),
    }
}
