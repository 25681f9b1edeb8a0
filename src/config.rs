use std::path::Path;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use tracing::warn;

use crate::error::Error;

pub use carousel_config::CarouselTiming;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    #[serde(flatten)]
    pub timing: CarouselTiming,
    /// Opaque slide labels, in display order.
    #[serde(default)]
    pub slides: Vec<String>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::load(path).with_context(|| format!("failed to read {}", path.display()))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(s)?)
    }

    fn load(path: &Path) -> Result<Self, Error> {
        let s = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&s)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(!self.slides.is_empty(), "slides must list at least one entry");
        for (idx, slide) in self.slides.iter().enumerate() {
            ensure!(
                !slide.trim().is_empty(),
                "slides[{}] must not be blank",
                idx
            );
        }
        self.timing.validate("")?;
        if !self.timing.transition_fits_interval() {
            warn!(
                transition_delay = ?self.timing.transition_delay,
                autoplay_interval = ?self.timing.autoplay_interval,
                "transition-delay exceeds autoplay-interval; autoplay will interrupt every transition"
            );
        }
        Ok(self)
    }
}
