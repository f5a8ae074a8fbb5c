use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationRequest, AxisMode, Channel, InputEvent};
use crate::clock::{interval_for_rate, FixedIntervalSource};
use crate::curve::{CurveCache, CurveSpec};
use crate::error::{AnimationError, ConfigError, Result};

/// Motion parameters per gesture type, as supplied by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default = "GestureProfile::scroll")]
    pub scroll: GestureProfile,
    #[serde(default = "GestureProfile::pointer")]
    pub pointer: GestureProfile,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            scroll: GestureProfile::scroll(),
            pointer: GestureProfile::pointer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Expected refresh rate, used for fixed-interval timing and as the
    /// nominal vsync interval
    #[serde(default = "default_refresh_hz")]
    pub refresh_hz: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            refresh_hz: default_refresh_hz(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureProfile {
    /// Animation length in milliseconds
    #[serde(default = "default_duration_ms")]
    pub duration_ms: f64,
    /// Multiplier from raw input delta to pixels
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
    /// Easing curve
    #[serde(default)]
    pub curve: CurveSpec,
    /// Proportional or per-axis curves
    #[serde(default)]
    pub axis_mode: AxisMode,
}

impl GestureProfile {
    fn scroll() -> Self {
        Self {
            duration_ms: default_duration_ms(),
            sensitivity: default_sensitivity(),
            curve: CurveSpec::ease_out(),
            axis_mode: AxisMode::Proportional,
        }
    }

    fn pointer() -> Self {
        Self {
            duration_ms: 120.0,
            sensitivity: default_sensitivity(),
            curve: CurveSpec::ease_in_out(),
            axis_mode: AxisMode::Proportional,
        }
    }

    /// Returns the animation duration.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::InvalidDuration`] unless `duration_ms` is a
    /// positive, finite number of milliseconds.
    pub fn duration(&self) -> Result<Duration> {
        let invalid = || AnimationError::InvalidDuration {
            millis: self.duration_ms,
        };
        let nanos = (self.duration_ms * 1e6).round();
        #[allow(clippy::cast_precision_loss)]
        let in_range = nanos >= 1.0 && nanos <= u64::MAX as f64;
        if !in_range {
            return Err(invalid().into());
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let nanos = nanos as u64;
        Ok(Duration::from_nanos(nanos))
    }

    /// Builds an animation request for a raw input event.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile's duration is invalid.
    pub fn request(&self, event: &InputEvent) -> Result<AnimationRequest> {
        Ok(AnimationRequest {
            channel: event.channel,
            distance: event.delta * self.sensitivity,
            duration: self.duration()?,
            curve: self.curve.clone(),
            axis_mode: self.axis_mode.clone(),
        })
    }

    fn curves(&self) -> impl Iterator<Item = &CurveSpec> {
        let y_curve = match &self.axis_mode {
            AxisMode::Proportional => None,
            AxisMode::Decoupled { y_curve } => Some(y_curve),
        };
        std::iter::once(&self.curve).chain(y_curve)
    }
}

impl MotionConfig {
    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed input.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] on malformed input.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        Self::from_toml_str(&content)
    }

    /// Returns the profile for `channel`.
    #[must_use]
    pub fn profile(&self, channel: Channel) -> &GestureProfile {
        match channel {
            Channel::Scroll => &self.scroll,
            Channel::Pointer => &self.pointer,
        }
    }

    /// Checks every value and fits every curve, warming `cache` with the
    /// results.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an invalid refresh rate, duration or
    /// sensitivity, or a curve that cannot be fitted.
    pub fn validate(&self, cache: &mut CurveCache) -> Result<()> {
        interval_for_rate(self.display.refresh_hz)?;
        for profile in [&self.scroll, &self.pointer] {
            profile.duration()?;
            if !profile.sensitivity.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "sensitivity must be finite, got {}",
                    profile.sensitivity
                ))
                .into());
            }
            for curve in profile.curves() {
                cache.get_or_fit(curve)?;
            }
        }
        Ok(())
    }

    /// Returns a fixed-interval tick source at the configured refresh rate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the refresh rate is not positive.
    pub fn fixed_tick_source(&self) -> Result<FixedIntervalSource> {
        FixedIntervalSource::from_refresh_rate(self.display.refresh_hz)
    }

    /// Returns the nominal refresh interval.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the refresh rate is not positive.
    pub fn refresh_interval(&self) -> Result<Duration> {
        interval_for_rate(self.display.refresh_hz)
    }
}

fn default_refresh_hz() -> f64 {
    60.0
}

fn default_duration_ms() -> f64 {
    220.0
}

fn default_sensitivity() -> f64 {
    1.0
}
