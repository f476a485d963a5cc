//! Decoded position data model
//!
//! The sparse probability matrix arrives as three parallel arrays: `values`
//! (quantized probabilities), `positions` (position bin per sample) and
//! `frameBounds` (number of samples belonging to each native time frame).

use crate::error::DataError;
use crate::types::DEFAULT_SAMPLING_FREQUENCY_HZ;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Decoded linear position payload, as delivered by the hosting application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPositionData {
    pub values: Vec<u32>,
    pub positions: Vec<u32>,
    pub frame_bounds: Vec<u32>,
    /// Position bin labels (the top of each bin's range)
    pub positions_key: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_sec: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_frequency_hz: Option<f64>,
    /// Ground-truth position per native frame, same units as `positions_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_positions: Option<Vec<f64>>,
}

/// Tagged wrapper enforcing the `type` discriminant on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum TaggedViewData {
    #[serde(rename = "DecodedLinearPositionData")]
    DecodedLinearPosition(DecodedPositionData),
}

impl DecodedPositionData {
    /// Parse and validate a JSON payload
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let TaggedViewData::DecodedLinearPosition(data) =
            serde_json::from_str(json).map_err(|e| DataError::Parse(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    /// Parse and validate a YAML payload
    pub fn from_yaml(yaml: &str) -> Result<Self, DataError> {
        let TaggedViewData::DecodedLinearPosition(data) =
            serde_yaml::from_str(yaml).map_err(|e| DataError::Parse(e.to_string()))?;
        data.validate()?;
        Ok(data)
    }

    /// Serialize with the `type` discriminant
    pub fn to_json(&self) -> Result<String, DataError> {
        serde_json::to_string(&TaggedViewData::DecodedLinearPosition(self.clone()))
            .map_err(|e| DataError::Parse(e.to_string()))
    }

    /// Check the structural invariants between the parallel arrays
    pub fn validate(&self) -> Result<(), DataError> {
        let frame_total: usize = self.frame_bounds.iter().map(|&n| n as usize).sum();
        if frame_total != self.values.len() || frame_total != self.positions.len() {
            return Err(DataError::SampleCountMismatch {
                frame_total,
                values: self.values.len(),
                positions: self.positions.len(),
            });
        }

        match self.positions_key.first() {
            Some(&first) if first > 0.0 && first.is_finite() => {}
            _ => return Err(DataError::InvalidPositionsKey),
        }

        // Runs end one past their last bin, so the largest usable bin is key.len()
        let key_len = self.positions_key.len();
        if let Some((sample, &position)) = self
            .positions
            .iter()
            .enumerate()
            .find(|(_, &p)| p as usize > key_len)
        {
            return Err(DataError::PositionOutOfRange {
                sample,
                position,
                key_len,
            });
        }

        if let Some(observed) = &self.observed_positions {
            if observed.len() != self.frame_bounds.len() {
                return Err(DataError::ObservedLengthMismatch {
                    observed: observed.len(),
                    frames: self.frame_bounds.len(),
                });
            }
        }

        let fs = self.sampling_frequency_hz();
        if !(fs.is_finite() && fs > 0.0) {
            return Err(DataError::InvalidSamplingFrequency(fs));
        }

        Ok(())
    }

    pub fn start_time_sec(&self) -> f64 {
        self.start_time_sec.unwrap_or(0.0)
    }

    pub fn sampling_frequency_hz(&self) -> f64 {
        self.sampling_frequency_hz
            .unwrap_or(DEFAULT_SAMPLING_FREQUENCY_HZ)
    }

    /// Number of native time frames
    pub fn frame_count(&self) -> usize {
        self.frame_bounds.len()
    }

    /// End of the recording in seconds (exclusive)
    pub fn end_time_sec(&self) -> f64 {
        self.start_time_sec() + self.frame_count() as f64 / self.sampling_frequency_hz()
    }

    /// Start time of native frame `index` in seconds
    pub fn frame_time(&self, index: usize) -> f64 {
        self.start_time_sec() + index as f64 / self.sampling_frequency_hz()
    }

    /// Times of every native frame, in order
    pub fn frame_times(&self) -> Vec<f64> {
        (0..self.frame_count()).map(|i| self.frame_time(i)).collect()
    }
}

/// Load decoded position data from disk
///
/// `.json` files are parsed as JSON, everything else as YAML.
pub fn load_data(path: &Path) -> Result<DecodedPositionData, DataError> {
    log::info!("load_data: Loading from {:?}", path);

    let contents = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let data = if is_json {
        DecodedPositionData::from_json(&contents)?
    } else {
        DecodedPositionData::from_yaml(&contents)?
    };

    log::info!(
        "load_data: {} frames, {} samples, {} position bins",
        data.frame_count(),
        data.values.len(),
        data.positions_key.len()
    );

    Ok(data)
}
