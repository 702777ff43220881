#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Environment Settings
//!
//! Every tunable number of the landing environment lives in [`EnvConfig`]:
//! box dimensions, respawn ceiling, tick rate, action speeds, reward
//! coefficients and the frame transform. A JSON file only needs to name the
//! values it overrides; everything else falls back to the defaults.
//!
//! Configuration problems are reported once, at startup, by
//! [`EnvConfig::validate`]. Code holding a [`ValidatedConfig`] can rely on the
//! landing box sitting strictly inside the flight box and on the respawn
//! altitude interval being non-empty.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("`{0}` must not be empty")]
    EmptyName(&'static str),
    #[error(
        "landing box ({landing_half_size} x {landing_height}) must fit strictly inside \
         flight box ({flight_half_size} x {flight_height})"
    )]
    NotNested {
        landing_half_size: f64,
        landing_height: f64,
        flight_half_size: f64,
        flight_height: f64,
    },
    #[error("respawn height {respawn_height} exceeds flight height {flight_height}")]
    RespawnAboveFlightBox { respawn_height: f64, flight_height: f64 },
    #[error("respawn altitude interval [{low}, {high}) above the marker is empty")]
    EmptySpawnInterval { low: f64, high: f64 },
    #[error("minimum operating altitude {value} must lie within [0, {landing_height}]")]
    OperatingAltitude { value: f64, landing_height: f64 },
    #[error("tick rate {value} Hz does not give a usable tick period")]
    TickRate { value: f64 },
    #[error("resize ratio {value} must lie within (0, 1]")]
    ResizeRatio { value: f64 },
}

/// Frames are only ever scaled down.
pub const MAX_RESIZE_RATIO: f64 = 1.0;

/// Horizontal half-size and height of a marker-anchored box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxDims {
    pub half_size: f64,
    pub height: f64,
}

/// Which reward policy scores each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardVariant {
    /// Terminate outside the flight box, succeed on landing inside the
    /// landing box, penalise hovering too low, shape by horizontal distance.
    #[default]
    Standard,
    /// Like `Standard`, but leaving the flight box does not end the episode.
    Unbounded,
    /// Sparse: only a landing command or leaving the flight box ends the
    /// episode.
    LandOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardConfig {
    pub variant: RewardVariant,
    pub success: f64,
    pub out_of_bounds: f64,
    pub failed_landing: f64,
    pub wrong_altitude: f64,
    pub shaping_scale: f64,
    /// Height above the marker under which a vehicle inside the landing box
    /// is expected to have committed to landing.
    pub min_operating_altitude: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            variant: RewardVariant::Standard,
            success: 1.0,
            out_of_bounds: -1.0,
            failed_landing: -1.0,
            wrong_altitude: -0.5,
            shaping_scale: 0.01,
            min_operating_altitude: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub resize_ratio: f64,
    pub crop: CropRect,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            resize_ratio: 0.233_333_333,
            crop: CropRect { x: 33, y: 0, width: 84, height: 84 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    pub vehicle_name: String,
    pub marker_name: String,
    pub flight_box: BoxDims,
    pub landing_box: BoxDims,
    /// Ceiling of the respawn altitude, measured from the marker.
    pub respawn_height: f64,
    pub tick_rate_hz: f64,
    /// Speed of every move action except descending.
    pub velocity: f64,
    pub descend_velocity: f64,
    /// Consecutive failed pose queries before the status reports degraded.
    pub degraded_after: u32,
    pub reward: RewardConfig,
    pub frame: FrameConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            vehicle_name: "quadrotor".to_string(),
            marker_name: "marker2".to_string(),
            flight_box: BoxDims { half_size: 1.5, height: 20.0 },
            landing_box: BoxDims { half_size: 0.75, height: 1.5 },
            respawn_height: 15.0,
            tick_rate_hz: 30.0,
            velocity: 0.5,
            descend_velocity: 0.2,
            degraded_after: 30,
            reward: RewardConfig::default(),
            frame: FrameConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    /// Returns `ConfigError::Io` if the file cannot be read, or
    /// `ConfigError::Parse` if it is not a valid config document.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        info!("Loaded environment config from {}", path.display());
        Ok(config)
    }

    /// Respawn altitudes above the marker, as the open range `(low, high)`.
    #[must_use]
    pub fn spawn_altitude_range(&self) -> (f64, f64) {
        let low = self.landing_box.height + 1.0;
        let high = self.respawn_height - self.landing_box.height;
        (low, high)
    }

    /// Check every invariant the environment relies on.
    ///
    /// # Errors
    /// Returns the first violated invariant as a `ConfigError`.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.vehicle_name.trim().is_empty() {
            return Err(ConfigError::EmptyName("vehicle_name"));
        }
        if self.marker_name.trim().is_empty() {
            return Err(ConfigError::EmptyName("marker_name"));
        }

        let positives = [
            ("flight_box.half_size", self.flight_box.half_size),
            ("flight_box.height", self.flight_box.height),
            ("landing_box.half_size", self.landing_box.half_size),
            ("landing_box.height", self.landing_box.height),
            ("respawn_height", self.respawn_height),
            ("tick_rate_hz", self.tick_rate_hz),
            ("velocity", self.velocity),
            ("descend_velocity", self.descend_velocity),
            ("frame.resize_ratio", self.frame.resize_ratio),
            ("frame.crop.width", f64::from(self.frame.crop.width)),
            ("frame.crop.height", f64::from(self.frame.crop.height)),
        ];
        for (field, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        if self.landing_box.half_size >= self.flight_box.half_size
            || self.landing_box.height >= self.flight_box.height
        {
            return Err(ConfigError::NotNested {
                landing_half_size: self.landing_box.half_size,
                landing_height: self.landing_box.height,
                flight_half_size: self.flight_box.half_size,
                flight_height: self.flight_box.height,
            });
        }

        if self.respawn_height > self.flight_box.height {
            return Err(ConfigError::RespawnAboveFlightBox {
                respawn_height: self.respawn_height,
                flight_height: self.flight_box.height,
            });
        }

        let (low, high) = self.spawn_altitude_range();
        if high <= low {
            return Err(ConfigError::EmptySpawnInterval { low, high });
        }

        let min_alt = self.reward.min_operating_altitude;
        if !(0.0..=self.landing_box.height).contains(&min_alt) {
            return Err(ConfigError::OperatingAltitude {
                value: min_alt,
                landing_height: self.landing_box.height,
            });
        }

        if self.frame.resize_ratio > MAX_RESIZE_RATIO {
            return Err(ConfigError::ResizeRatio { value: self.frame.resize_ratio });
        }

        let tick_period = match Duration::try_from_secs_f64(1.0 / self.tick_rate_hz) {
            Ok(period) if !period.is_zero() => period,
            _ => return Err(ConfigError::TickRate { value: self.tick_rate_hz }),
        };

        Ok(ValidatedConfig { config: self, tick_period })
    }
}

impl FromStr for EnvConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

/// An [`EnvConfig`] that passed [`EnvConfig::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    config: EnvConfig,
    tick_period: Duration,
}

impl ValidatedConfig {
    #[must_use]
    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    #[must_use]
    pub fn into_inner(self) -> EnvConfig {
        self.config
    }
}

impl Deref for ValidatedConfig {
    type Target = EnvConfig;

    fn deref(&self) -> &EnvConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = EnvConfig::default().validate().unwrap();
        assert_eq!(cfg.spawn_altitude_range(), (2.5, 13.5));
        assert_eq!(cfg.tick_period(), Duration::from_secs_f64(1.0 / 30.0));
    }

    #[test]
    fn landing_box_wider_than_flight_box_is_rejected() {
        let mut cfg = EnvConfig::default();
        cfg.landing_box.half_size = 2.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::NotNested { .. })));
    }

    #[test]
    fn equal_heights_are_not_strictly_nested() {
        let mut cfg = EnvConfig::default();
        cfg.landing_box.height = cfg.flight_box.height;
        assert!(matches!(cfg.validate(), Err(ConfigError::NotNested { .. })));
    }

    #[test]
    fn empty_spawn_interval_is_rejected() {
        let mut cfg = EnvConfig::default();
        cfg.respawn_height = 4.0;
        // low = 2.5, high = 4.0 - 1.5 = 2.5
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptySpawnInterval { .. }), "got {err}");
    }

    #[test]
    fn vanishing_tick_rate_is_rejected() {
        let mut cfg = EnvConfig::default();
        cfg.tick_rate_hz = 1e-300;
        assert!(matches!(cfg.validate(), Err(ConfigError::TickRate { .. })));
    }

    #[test]
    fn tick_rate_too_high_for_a_period_is_rejected() {
        let mut cfg = EnvConfig::default();
        cfg.tick_rate_hz = 1e300;
        assert!(matches!(cfg.validate(), Err(ConfigError::TickRate { .. })));
    }

    #[test]
    fn upscaling_resize_ratio_is_rejected() {
        let mut cfg = EnvConfig::default();
        cfg.frame.resize_ratio = 1e12;
        assert!(matches!(cfg.validate(), Err(ConfigError::ResizeRatio { .. })));

        let mut cfg = EnvConfig::default();
        cfg.frame.resize_ratio = MAX_RESIZE_RATIO;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn nan_is_not_positive() {
        let mut cfg = EnvConfig::default();
        cfg.velocity = f64::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive { field: "velocity", .. })
        ));
    }
}
