//! # Configuration
//!
//! Alignment configuration - the knobs of the resampling policy.
//!
//! Everything that is a policy decision is configurable, not hardcoded:
//! - What happens to devices with no records in the window
//! - How many segments a single request may ask for

use serde::{Deserialize, Serialize};

/// Behavior for a registered device with zero records in the window
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Leave the device out of every snapshot
    #[default]
    Omit,

    /// Emit an all-zero reading for the device at every instant
    ///
    /// Guarantees every registered device appears in every snapshot.
    ZeroBaseline,
}

impl FallbackPolicy {
    /// Name of this policy (for config files and logs)
    pub fn name(&self) -> &'static str {
        match self {
            FallbackPolicy::Omit => "omit",
            FallbackPolicy::ZeroBaseline => "zero_baseline",
        }
    }
}

impl std::fmt::Display for FallbackPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "omit" => Ok(FallbackPolicy::Omit),
            "zero_baseline" | "zero" => Ok(FallbackPolicy::ZeroBaseline),
            other => Err(format!(
                "unknown fallback policy '{}' (expected 'omit' or 'zero_baseline')",
                other
            )),
        }
    }
}

/// Default upper bound on segments per request
pub const DEFAULT_MAX_SEGMENTS: usize = 10_000;

/// Main alignment configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignConfig {
    /// What to do with devices that have no records in the window
    pub fallback: FallbackPolicy,

    /// Largest segment count a request may ask for
    ///
    /// Output size is `segments * devices`, so this bounds memory per request.
    pub max_segments: usize,
}

impl AlignConfig {
    /// Create a configuration with the given fallback policy
    pub fn new(fallback: FallbackPolicy) -> Self {
        Self {
            fallback,
            max_segments: DEFAULT_MAX_SEGMENTS,
        }
    }

    /// Set the fallback policy
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Set the segment limit
    pub fn with_max_segments(mut self, max_segments: usize) -> Self {
        self.max_segments = max_segments;
        self
    }
}

impl Default for AlignConfig {
    /// Default configuration: omit silent devices, 10 000 segments max
    fn default() -> Self {
        Self::new(FallbackPolicy::default())
    }
}
