//! Common constants for decoded position data

/// Sampling frequency assumed when the data does not carry one (per-millisecond frames)
pub const DEFAULT_SAMPLING_FREQUENCY_HZ: f64 = 1000.0;

/// Discriminant identifying decoded linear position payloads
pub const DECODED_LINEAR_POSITION_TYPE: &str = "DecodedLinearPositionData";

/// Number of entries in an 8-bit colour lookup table
pub const COLOR_LEVELS: usize = 256;

/// Frame count below which the sync tolerance is never applied
pub const SYNC_TOLERANCE_MIN_FRAMES: usize = 100;
