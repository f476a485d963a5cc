//! Sparse run-length ("lines") representation of probability columns
//!
//! Each downsampled time frame becomes a [`TimeColumn`]: for every distinct
//! probability value, the list of contiguous position intervals holding that
//! value. Stroking one vertical line per interval is far cheaper than filling
//! every position bin, and the runs are layered: a lower value keeps running
//! underneath a higher one, so painting in ascending value order reproduces
//! the column.

use crate::downsample::DownsampledSeries;
use crate::error::EncodeError;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Half-open interval `[start, end)` of position bins sharing one value
///
/// `end` is `None` only while the run is still open during encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: u32,
    pub end: Option<u32>,
}

impl Run {
    fn open(start: u32) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Runs per probability value for a single time frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeColumn {
    /// Keyed by value; iteration is in ascending value order
    pub value_runs: BTreeMap<u32, Vec<Run>>,
    pub min: Option<u32>,
    pub max: Option<u32>,
}

impl TimeColumn {
    pub fn is_empty(&self) -> bool {
        self.value_runs.values().all(|runs| runs.is_empty())
    }

    /// Iterate closed runs as `(value, start, end)` in paint order
    pub fn closed_runs(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        self.value_runs.iter().flat_map(|(&value, runs)| {
            runs.iter()
                .filter_map(move |run| run.end.map(|end| (value, run.start, end)))
        })
    }

    /// Rebuild the position -> value mapping (highest covering value wins)
    pub fn flatten(&self) -> BTreeMap<u32, u32> {
        let mut result = BTreeMap::new();
        for (value, start, end) in self.closed_runs() {
            for position in start..end {
                let entry = result.entry(position).or_insert(value);
                *entry = (*entry).max(value);
            }
        }
        result
    }

    fn open_run(&mut self, value: u32, position: u32) -> Result<(), EncodeError> {
        let runs = self
            .value_runs
            .get_mut(&value)
            .ok_or(EncodeError::UnseededValue { value })?;
        // An already-open run for this value simply keeps going
        if !matches!(runs.last(), Some(run) if run.is_open()) {
            runs.push(Run::open(position));
        }
        Ok(())
    }

    /// Close open runs whose value lies in `range`
    fn close_runs(&mut self, closing_position: u32, range: impl std::ops::RangeBounds<u32>) {
        for (_, runs) in self.value_runs.range_mut(range) {
            if let Some(run) = runs.last_mut() {
                if run.is_open() {
                    run.end = Some(closing_position);
                }
            }
        }
    }
}

/// Encode one frame's `(value, position)` samples into runs
///
/// Positions need not be sorted; duplicate positions are not expected.
pub fn encode_column(values: &[u32], positions: &[u32]) -> Result<TimeColumn, EncodeError> {
    let count = values.len().min(positions.len());
    let values = &values[..count];
    let positions = &positions[..count];

    let mut column = TimeColumn {
        value_runs: values.iter().map(|&v| (v, Vec::new())).collect(),
        min: values.iter().copied().min(),
        max: values.iter().copied().max(),
    };

    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by_key(|&i| positions[i]);

    let mut last: Option<(u32, u32)> = None;
    for i in order {
        let (p, v) = (positions[i], values[i]);
        match last {
            Some((last_position, last_value)) if last_position.checked_add(1) == Some(p) => {
                if v != last_value {
                    column.open_run(v, p)?;
                    if v < last_value {
                        // Higher layers directly above end here
                        column.close_runs(p, (v + 1)..=last_value);
                    }
                }
            }
            Some((last_position, _)) => {
                column.close_runs(last_position.saturating_add(1), ..);
                column.open_run(v, p)?;
            }
            None => column.open_run(v, p)?,
        }
        last = Some((p, v));
    }

    if let Some((last_position, _)) = last {
        // Runs reaching u32::MAX are cut one bin short
        column.close_runs(last_position.saturating_add(1), ..);
    }

    Ok(column)
}

/// Encode every frame of a series into time columns (in parallel)
pub fn lines_representation(series: &DownsampledSeries) -> Result<Vec<TimeColumn>, EncodeError> {
    let sample_count = series.values.len().min(series.positions.len());
    let mut offsets = Vec::with_capacity(series.frame_bounds.len());
    let mut next = 0usize;
    for &count in &series.frame_bounds {
        let start = next.min(sample_count);
        next += count as usize;
        offsets.push((start, next.min(sample_count)));
    }

    offsets
        .par_iter()
        .map(|&(start, end)| encode_column(&series.values[start..end], &series.positions[start..end]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs_of(column: &TimeColumn, value: u32) -> Vec<(u32, u32)> {
        column.value_runs[&value]
            .iter()
            .map(|run| (run.start, run.end.expect("run left open")))
            .collect()
    }

    fn assert_round_trip(values: &[u32], positions: &[u32]) {
        let column = encode_column(values, positions).unwrap();
        let expected: BTreeMap<u32, u32> = positions.iter().copied().zip(values.iter().copied()).collect();
        assert_eq!(column.flatten(), expected, "values {:?} positions {:?}", values, positions);
        assert!(column.value_runs.values().flatten().all(|run| !run.is_open()));
    }

    #[test]
    fn test_two_value_column() {
        let column = encode_column(&[5, 5, 3], &[0, 1, 2]).unwrap();
        assert_eq!(runs_of(&column, 5), vec![(0, 2)]);
        assert_eq!(runs_of(&column, 3), vec![(2, 3)]);
        assert_eq!(column.min, Some(3));
        assert_eq!(column.max, Some(5));
    }

    #[test]
    fn test_lower_value_runs_underneath() {
        // 3 under a 5 peak: the 3 run spans the whole island
        let column = encode_column(&[3, 5, 3], &[0, 1, 2]).unwrap();
        assert_eq!(runs_of(&column, 3), vec![(0, 3)]);
        assert_eq!(runs_of(&column, 5), vec![(1, 2)]);
    }

    #[test]
    fn test_gap_closes_runs() {
        let column = encode_column(&[4, 4, 4], &[0, 1, 5]).unwrap();
        assert_eq!(runs_of(&column, 4), vec![(0, 2), (5, 6)]);
    }

    #[test]
    fn test_positions_at_u32_limit() {
        let top = u32::MAX;
        let column = encode_column(&[4, 4, 6], &[0, top - 1, top]).unwrap();
        assert_eq!(runs_of(&column, 4), vec![(0, 1), (top - 1, top)]);
        assert_eq!(runs_of(&column, 6), vec![(top, top)]);
        assert!(column.value_runs.values().flatten().all(|run| !run.is_open()));
    }

    #[test]
    fn test_unsorted_positions() {
        let column = encode_column(&[3, 5, 5], &[2, 0, 1]).unwrap();
        assert_eq!(runs_of(&column, 5), vec![(0, 2)]);
        assert_eq!(runs_of(&column, 3), vec![(2, 3)]);
    }

    #[test]
    fn test_zero_value_at_origin_is_kept() {
        assert_round_trip(&[0, 0, 7], &[0, 1, 2]);
    }

    #[test]
    fn test_round_trip_layered_profiles() {
        assert_round_trip(&[5, 3, 5], &[0, 1, 2]);
        assert_round_trip(&[3, 5, 4], &[0, 1, 2]);
        assert_round_trip(&[4, 2, 5, 3], &[0, 1, 2, 3]);
        assert_round_trip(&[1, 2, 3, 4, 3, 2, 1], &[10, 11, 12, 13, 14, 15, 16]);
        assert_round_trip(&[9, 1, 9, 1, 9], &[0, 1, 2, 3, 4]);
        assert_round_trip(&[2, 8, 8, 2, 6, 6], &[3, 4, 5, 9, 10, 11]);
    }

    #[test]
    fn test_round_trip_pseudo_random_columns() {
        // Deterministic LCG so the test is reproducible
        let mut state: u64 = 0x2545_f491;
        let mut next = move |modulo: u64| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (state >> 33) % modulo
        };
        for _ in 0..200 {
            let len = next(40) as usize;
            let mut positions: Vec<u32> = Vec::new();
            let mut p = next(5) as u32;
            for _ in 0..len {
                positions.push(p);
                p += 1 + if next(4) == 0 { next(6) as u32 } else { 0 };
            }
            let values: Vec<u32> = positions.iter().map(|_| next(8) as u32).collect();
            assert_round_trip(&values, &positions);
        }
    }

    #[test]
    fn test_empty_column() {
        let column = encode_column(&[], &[]).unwrap();
        assert!(column.is_empty());
        assert_eq!(column.min, None);
    }

    #[test]
    fn test_unseeded_value_is_an_error() {
        let mut column = TimeColumn::default();
        assert_eq!(
            column.open_run(7, 0),
            Err(EncodeError::UnseededValue { value: 7 })
        );
    }

    #[test]
    fn test_lines_representation_per_frame() {
        let series = DownsampledSeries {
            values: vec![5, 5, 3, 2],
            positions: vec![0, 1, 2, 4],
            frame_bounds: vec![3, 0, 1],
            scale_factor: 1,
        };
        let columns = lines_representation(&series).unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(runs_of(&columns[0], 5), vec![(0, 2)]);
        assert!(columns[1].is_empty());
        assert_eq!(runs_of(&columns[2], 2), vec![(4, 5)]);
    }
}
