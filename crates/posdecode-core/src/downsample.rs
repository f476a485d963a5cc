//! Scale-aware downsampling of sparse decoded position series
//!
//! A native series is compressed by an integer scale factor: every group of
//! `scale_factor` consecutive frames becomes one output frame whose samples
//! are the distinct positions touched in the group, aggregated by mean or max.
//! Scale factors are always powers of a base factor so that zooming back and
//! forth lands on scale levels that were already computed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Aggregation applied to samples that share a position within one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownsampleMode {
    /// Sum per position, divided by the scale factor and rounded up
    #[default]
    Mean,
    /// Largest value seen per position
    Max,
}

/// Sparse series after downsampling (same shape as the native series)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownsampledSeries {
    pub values: Vec<u32>,
    pub positions: Vec<u32>,
    /// Sample count per downsampled frame
    pub frame_bounds: Vec<u32>,
    pub scale_factor: usize,
}

impl DownsampledSeries {
    /// Number of downsampled frames
    pub fn len(&self) -> usize {
        self.frame_bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_bounds.is_empty()
    }
}

/// Sum `array[start..end]`, clamping `end` to the array length
pub fn sum_range(array: &[u32], start: usize, end: usize) -> usize {
    let end = end.min(array.len());
    if start >= end {
        return 0;
    }
    array[start..end].iter().map(|&n| n as usize).sum()
}

/// Compute the scale factor needed to fit the visible frames into the render budget
///
/// Returns the smallest power `base^x` (x >= 0) such that
/// `visible_range_count / base^x <= max_range_count`, i.e.
/// `x = ceil(log(visible / max) / log(base))`, never less than 1.
pub fn compute_scale_factor(base_scale_factor: usize, visible_range_count: usize, max_range_count: usize) -> usize {
    if base_scale_factor < 2 {
        log::warn!(
            "compute_scale_factor: base scale factor {} cannot grow, using 1",
            base_scale_factor
        );
        return 1;
    }
    let max_range_count = max_range_count.max(1);

    // Integer search is exact where the log formula can land a hair above an integer
    let mut factor = 1usize;
    while visible_range_count > max_range_count.saturating_mul(factor) {
        factor = match factor.checked_mul(base_scale_factor) {
            Some(next) => next,
            None => break,
        };
    }
    factor
}

/// Downsample a sparse series by an integer scale factor
///
/// `scale_factor == 1` returns the input unchanged. `scale_factor == 0` is
/// rejected with a warning.
pub fn static_downsample(
    values: &[u32],
    positions: &[u32],
    frame_bounds: &[u32],
    scale_factor: usize,
    mode: DownsampleMode,
) -> Option<DownsampledSeries> {
    if scale_factor < 1 {
        log::warn!("static_downsample: scale factor {} is less than 1, refusing to downsample", scale_factor);
        return None;
    }
    if scale_factor == 1 {
        return Some(DownsampledSeries {
            values: values.to_vec(),
            positions: positions.to_vec(),
            frame_bounds: frame_bounds.to_vec(),
            scale_factor: 1,
        });
    }

    let output_frames = frame_bounds.len().div_ceil(scale_factor);
    let mut result = DownsampledSeries {
        values: Vec::new(),
        positions: Vec::new(),
        frame_bounds: Vec::with_capacity(output_frames),
        scale_factor,
    };

    let sample_count = values.len().min(positions.len());
    let mut first_unfinished = 0usize;
    let mut group: IndexMap<u32, u64> = IndexMap::new();

    for group_start in (0..frame_bounds.len()).step_by(scale_factor) {
        group.clear();
        let points = sum_range(frame_bounds, group_start, group_start + scale_factor);
        let end = (first_unfinished + points).min(sample_count);

        for j in first_unfinished..end {
            let value = values[j] as u64;
            let entry = group.entry(positions[j]).or_insert(0);
            match mode {
                DownsampleMode::Mean => *entry += value,
                DownsampleMode::Max => *entry = (*entry).max(value),
            }
        }

        result.frame_bounds.push(group.len() as u32);
        for (&position, &aggregate) in &group {
            result.positions.push(position);
            let emitted = match mode {
                DownsampleMode::Mean => aggregate.div_ceil(scale_factor as u64),
                DownsampleMode::Max => aggregate,
            };
            result.values.push(emitted.min(u32::MAX as u64) as u32);
        }

        first_unfinished += points;
    }

    Some(result)
}

/// Map a native (inclusive) frame range to downsampled indices
///
/// Returns `(floor(first / scale), ceil(last / scale))`.
pub fn downsampled_range(scale_factor: usize, first_selected: usize, last_selected: usize) -> (usize, usize) {
    let scale_factor = scale_factor.max(1);
    (
        first_selected / scale_factor,
        last_selected.div_ceil(scale_factor),
    )
}

/// Downsample the observed (ground truth) positions by taking group medians
pub fn downsample_observed_positions(scale_factor: usize, positions: &[f64]) -> Option<Vec<f64>> {
    if scale_factor < 1 {
        log::warn!("downsample_observed_positions: scale factor {} is less than 1", scale_factor);
        return None;
    }
    if scale_factor == 1 {
        return Some(positions.to_vec());
    }
    Some(positions.chunks(scale_factor).map(median).collect())
}

fn median(group: &[f64]) -> f64 {
    let mut sorted = group.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Native frame range `(first, last)` covered by a visible time window
///
/// A missing start defaults to the data start; a missing end runs to the last
/// frame. Both results are clamped into the data.
pub fn visible_frames(
    start_time_sec: f64,
    sampling_frequency_hz: f64,
    data_length: usize,
    visible_start_sec: Option<f64>,
    visible_end_sec: Option<f64>,
) -> (usize, usize) {
    if data_length == 0 {
        return (0, 0);
    }
    let last_index = data_length - 1;

    let visible_start = visible_start_sec.unwrap_or(start_time_sec).max(start_time_sec);
    let first = ((visible_start - start_time_sec) * sampling_frequency_hz).floor();
    let first = (first.max(0.0) as usize).min(last_index);

    let last = match visible_end_sec {
        None => last_index,
        Some(end) => {
            let span = ((end - visible_start_sec.unwrap_or(0.0)) * sampling_frequency_hz).floor();
            first.saturating_add(span.max(0.0) as usize).min(last_index)
        }
    };

    (first, last)
}
