use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Configuration {
    /// Fixed asset pool every batch is shuffled from.
    pub assets: Vec<PathBuf>,
    /// Horizontal gap between two items, in logical pixels.
    pub gap_px: f64,
    /// Fraction of an item that must be dragged past before snapping forward.
    pub snap_threshold: f64,
    /// Fraction of a sentinel that must be on screen to request more images.
    pub visibility_threshold: f64,
    /// Simulated latency of a batch fetch.
    #[serde(with = "humantime_serde")]
    pub fetch_delay: Duration,
    /// Width of the scrollable viewport, in logical pixels.
    pub viewport_width: f64,
    /// Optional deterministic seed for batch order and image ids.
    pub shuffle_seed: Option<u64>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(!self.assets.is_empty(), "assets must list at least one image");
        ensure!(
            self.gap_px.is_finite() && self.gap_px >= 0.0,
            "gap-px must be zero or positive"
        );
        ensure!(
            self.snap_threshold > 0.0 && self.snap_threshold < 1.0,
            "snap-threshold must be between 0 and 1 (exclusive)"
        );
        ensure!(
            self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0,
            "visibility-threshold must be in (0, 1]"
        );
        ensure!(
            self.viewport_width.is_finite() && self.viewport_width > 0.0,
            "viewport-width must be positive"
        );
        Ok(self)
    }

    fn default_assets() -> Vec<PathBuf> {
        (1..=8)
            .map(|i| PathBuf::from(format!("assets/img-{i}.jpg")))
            .collect()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            assets: Self::default_assets(),
            gap_px: 16.0,
            snap_threshold: 0.4,
            visibility_threshold: 0.5,
            fetch_delay: Duration::from_secs(1),
            viewport_width: 960.0,
            shuffle_seed: None,
        }
    }
}
