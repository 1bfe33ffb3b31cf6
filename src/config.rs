// src/config.rs
// =============================================================================
// Configuration for scoring and for the image-size probes.
//
// The scoring numbers are fixed: every run is graded against the same scale.
// The probe settings can be tuned from the command line (see cli.rs).
// =============================================================================

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Score needed (in percent) for a "passed" verdict
pub const PASSING_SCORE: f64 = 60.0;

/// Nominal points for a passing rule, used to normalize the percentage
pub const DEFAULT_SUCCESS_POINTS: i32 = 1;

/// Nominal points for a failing rule, used to normalize the percentage
pub const DEFAULT_ERROR_POINTS: i32 = -2;

/// Images strictly larger than this are "oversized" (500 KB)
pub const MAX_IMAGE_BYTES: u64 = 500 * 1024;

/// Settings for one analysis run
///
/// Only the network phase is tunable; the grading scale above is not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraderConfig {
    /// Byte limit for a single image
    pub max_image_bytes: u64,
    /// How long a single HEAD probe may take
    #[serde(with = "duration_secs")]
    pub probe_timeout: Duration,
    /// How many probes may be in flight at once
    pub probe_concurrency: usize,
    /// Whether to run the network phase at all
    pub check_image_sizes: bool,
    /// Base URL for resolving relative image sources
    pub base_url: Option<String>,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_BYTES,
            probe_timeout: Duration::from_secs(10),
            probe_concurrency: 8,
            check_image_sizes: true,
            base_url: None,
        }
    }
}

// Durations are written as whole seconds in JSON
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
