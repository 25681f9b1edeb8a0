use std::time::Duration;

use anyhow::{Result, ensure};
use serde::Deserialize;

pub use timing::CarouselTiming;

mod timing {
    use super::*;

    /// Timing knobs shared by the controller and the binary.
    #[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
    #[serde(rename_all = "kebab-case", default)]
    pub struct CarouselTiming {
        /// Time the navigation lock stays engaged after a slide change.
        #[serde(with = "humantime_serde")]
        pub transition_delay: Duration,
        /// Period between automatic advances while autoplay runs.
        #[serde(with = "humantime_serde")]
        pub autoplay_interval: Duration,
        /// Transition property whose start/end toggles the cosmetic marker.
        pub marker_property: String,
        /// Start autoplay as part of initialization.
        pub autoplay: bool,
    }

    impl CarouselTiming {
        pub const DEFAULT_TRANSITION_DELAY: Duration = Duration::from_millis(900);
        pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(6000);
        pub const DEFAULT_MARKER_PROPERTY: &'static str = "opacity";

        /// True when the lock clears before the next autoplay tick can land.
        pub fn transition_fits_interval(&self) -> bool {
            self.transition_delay <= self.autoplay_interval
        }

        pub fn validate(&self, prefix: &str) -> Result<()> {
            ensure!(
                !self.autoplay_interval.is_zero(),
                "{}autoplay-interval must be positive",
                prefix
            );
            ensure!(
                !self.marker_property.trim().is_empty(),
                "{}marker-property must not be blank",
                prefix
            );
            Ok(())
        }
    }

    impl Default for CarouselTiming {
        fn default() -> Self {
            Self {
                transition_delay: Self::DEFAULT_TRANSITION_DELAY,
                autoplay_interval: Self::DEFAULT_AUTOPLAY_INTERVAL,
                marker_property: Self::DEFAULT_MARKER_PROPERTY.to_string(),
                autoplay: true,
            }
        }
    }
}
