//! Smoother configuration, sensitivity presets and device profiles.
//!
//! # Presets
//! | preset | max pos Δ | max rot Δ | baseline gain | buffer |
//! |--------|-----------|-----------|---------------|--------|
//! | low    | 0.2       | 0.3       | 0.03          | 8      |
//! | medium | 0.5       | 0.8       | 0.07          | 5      |
//! | high   | 1.0       | 1.5       | 0.15          | 3      |
//!
//! Low sensitivity means a long buffer, tight outlier thresholds and a slow
//! baseline gain; high sensitivity is the inverse.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors reported by [`SmootherConfig::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("smoothing bounds out of order: min {min} > max {max}")]
    BoundsOrder { min: f64, max: f64 },

    #[error("{field} must lie in [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },

    #[error("buffer_size must be at least 1")]
    EmptyBuffer,

    #[error("unknown sensitivity level: {0}")]
    UnknownSensitivity(String),

    #[error("unknown device class: {0}")]
    UnknownDevice(String),
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Tuning for one [`PoseSmoother`](crate::smoother::PoseSmoother).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    /// Per-frame position change (Euclidean) above which a sample is an outlier
    pub max_position_delta: f64,
    /// Per-frame rotation change (sum of |Δ| per axis, radians) above which a sample is an outlier
    pub max_rotation_delta: f64,
    /// Per-frame scale change (x axis) above which a sample is an outlier
    pub max_scale_delta: f64,
    /// Baseline interpolation gain
    pub smoothing_factor: f64,
    /// Lower clamp of the adaptive gain
    pub min_smoothing_factor: f64,
    /// Upper clamp of the adaptive gain
    pub max_smoothing_factor: f64,
    /// Moving-average window length
    pub buffer_size: usize,
    /// Frames after acquisition during which samples are only buffered
    pub stabilization_frames: u32,
    /// Speed (units/s) above which motion counts as fast
    pub velocity_threshold: f64,
    /// Weight applied to the velocity look-ahead
    pub prediction_strength: f64,
    /// Frame interval (s) treated as a stall
    pub stall_threshold: f64,
    /// Multiplier applied to the baseline gain on each stall
    pub stall_gain: f64,
    /// Blend weight of the instantaneous derivative into the velocity estimate
    pub velocity_blend: f64,
    /// Upper bound on the fast-motion divisor of the baseline gain
    pub max_slowdown: f64,
    /// Push the buffer average back into the buffer when a frame is rejected
    pub reinforce_on_abrupt: bool,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            max_position_delta: 0.5,
            max_rotation_delta: 0.8,
            max_scale_delta: 0.3,
            smoothing_factor: 0.07,
            min_smoothing_factor: 0.02,
            max_smoothing_factor: 0.3,
            buffer_size: 5,
            stabilization_frames: 15,
            velocity_threshold: 0.1,
            prediction_strength: 0.1,
            stall_threshold: 0.05, // 50 ms
            stall_gain: 1.2,
            velocity_blend: 0.3,
            max_slowdown: 5.0,
            reinforce_on_abrupt: true,
        }
    }
}

impl SmootherConfig {
    /// Default config with a sensitivity preset applied.
    pub fn preset(level: Sensitivity) -> Self {
        let mut cfg = Self::default();
        level.apply(&mut cfg);
        cfg
    }

    /// Config for a device class.
    pub fn for_device(device: DeviceClass) -> Self {
        let mut cfg = Self::default();
        device.apply(&mut cfg);
        cfg
    }

    /// Check every field; returns the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("max_position_delta", self.max_position_delta),
            ("max_rotation_delta", self.max_rotation_delta),
            ("max_scale_delta", self.max_scale_delta),
            ("smoothing_factor", self.smoothing_factor),
            ("min_smoothing_factor", self.min_smoothing_factor),
            ("max_smoothing_factor", self.max_smoothing_factor),
            ("velocity_threshold", self.velocity_threshold),
            ("stall_threshold", self.stall_threshold),
            ("stall_gain", self.stall_gain),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.max_slowdown.is_finite() && self.max_slowdown >= 1.0) {
            return Err(ConfigError::NotPositive {
                field: "max_slowdown",
                value: self.max_slowdown,
            });
        }
        if self.min_smoothing_factor > self.max_smoothing_factor {
            return Err(ConfigError::BoundsOrder {
                min: self.min_smoothing_factor,
                max: self.max_smoothing_factor,
            });
        }
        let unit = [
            ("max_smoothing_factor", self.max_smoothing_factor),
            ("prediction_strength", self.prediction_strength),
            ("velocity_blend", self.velocity_blend),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfUnitRange { field, value });
            }
        }
        if self.buffer_size == 0 {
            return Err(ConfigError::EmptyBuffer);
        }
        Ok(())
    }

    /// Clamp every field into its valid range, falling back to the default
    /// value for fields that are not finite.
    pub fn sanitized(&self) -> Self {
        let d = Self::default();
        let pos = |v: f64, fallback: f64| if v.is_finite() && v > 0.0 { v } else { fallback };
        let unit = |v: f64, fallback: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback };

        let mut min = unit(pos(self.min_smoothing_factor, d.min_smoothing_factor), d.min_smoothing_factor);
        let mut max = unit(pos(self.max_smoothing_factor, d.max_smoothing_factor), d.max_smoothing_factor);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        Self {
            max_position_delta: pos(self.max_position_delta, d.max_position_delta),
            max_rotation_delta: pos(self.max_rotation_delta, d.max_rotation_delta),
            max_scale_delta: pos(self.max_scale_delta, d.max_scale_delta),
            smoothing_factor: pos(self.smoothing_factor, d.smoothing_factor).clamp(min, max),
            min_smoothing_factor: min,
            max_smoothing_factor: max,
            buffer_size: self.buffer_size.max(1),
            stabilization_frames: self.stabilization_frames,
            velocity_threshold: pos(self.velocity_threshold, d.velocity_threshold),
            prediction_strength: unit(self.prediction_strength, d.prediction_strength),
            stall_threshold: pos(self.stall_threshold, d.stall_threshold),
            stall_gain: pos(self.stall_gain, d.stall_gain),
            velocity_blend: unit(self.velocity_blend, d.velocity_blend),
            max_slowdown: if self.max_slowdown.is_finite() {
                self.max_slowdown.max(1.0)
            } else {
                d.max_slowdown
            },
            reinforce_on_abrupt: self.reinforce_on_abrupt,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensitivity presets
// ---------------------------------------------------------------------------

/// Coarse sensitivity profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    /// Overwrite the preset-controlled fields of `cfg`.
    pub fn apply(self, cfg: &mut SmootherConfig) {
        let (pos, rot, gain, buffer) = match self {
            Sensitivity::Low => (0.2, 0.3, 0.03, 8),
            Sensitivity::Medium => (0.5, 0.8, 0.07, 5),
            Sensitivity::High => (1.0, 1.5, 0.15, 3),
        };
        cfg.max_position_delta = pos;
        cfg.max_rotation_delta = rot;
        cfg.smoothing_factor = gain;
        cfg.buffer_size = buffer;
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

impl FromStr for Sensitivity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Sensitivity::Low),
            "medium" => Ok(Sensitivity::Medium),
            "high" => Ok(Sensitivity::High),
            other => Err(ConfigError::UnknownSensitivity(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Device profiles
// ---------------------------------------------------------------------------

/// Device class chosen by the host application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Desktop,
    /// Phones and other devices with low frame rates and noisy cameras
    Constrained,
}

impl DeviceClass {
    /// Overwrite the device-controlled fields of `cfg`.
    pub fn apply(self, cfg: &mut SmootherConfig) {
        match self {
            DeviceClass::Desktop => {
                Sensitivity::Medium.apply(cfg);
            }
            DeviceClass::Constrained => {
                Sensitivity::Low.apply(cfg);
                cfg.buffer_size = 6;
                cfg.prediction_strength = 0.03;
                cfg.reinforce_on_abrupt = false;
            }
        }
    }
}

impl FromStr for DeviceClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desktop" => Ok(DeviceClass::Desktop),
            "constrained" => Ok(DeviceClass::Constrained),
            other => Err(ConfigError::UnknownDevice(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_medium_and_valid() {
        let cfg = SmootherConfig::default();
        assert_eq!(cfg, SmootherConfig::preset(Sensitivity::Medium));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn presets_order_buffers_and_thresholds() {
        let low = SmootherConfig::preset(Sensitivity::Low);
        let high = SmootherConfig::preset(Sensitivity::High);
        assert_eq!(low.buffer_size, 8);
        assert_eq!(high.buffer_size, 3);
        assert!(low.max_position_delta < high.max_position_delta);
        assert!(low.max_rotation_delta < high.max_rotation_delta);
        assert!(low.smoothing_factor < high.smoothing_factor);
        // Untouched by presets
        assert_eq!(low.stabilization_frames, 15);
        assert_eq!(low.prediction_strength, 0.1);
    }

    #[test]
    fn constrained_device_profile() {
        let cfg = SmootherConfig::for_device(DeviceClass::Constrained);
        assert_eq!(cfg.buffer_size, 6);
        assert_eq!(cfg.prediction_strength, 0.03);
        assert_eq!(cfg.max_position_delta, 0.2);
        assert!(!cfg.reinforce_on_abrupt);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parse_sensitivity() {
        assert_eq!("LOW".parse::<Sensitivity>(), Ok(Sensitivity::Low));
        assert_eq!("high".parse::<Sensitivity>(), Ok(Sensitivity::High));
        assert!(matches!(
            "extreme".parse::<Sensitivity>(),
            Err(ConfigError::UnknownSensitivity(_))
        ));
    }

    #[test]
    fn parse_device_class() {
        assert_eq!("Constrained".parse::<DeviceClass>(), Ok(DeviceClass::Constrained));
        assert_eq!("desktop".parse::<DeviceClass>(), Ok(DeviceClass::Desktop));
        assert!(matches!(
            "watch".parse::<DeviceClass>(),
            Err(ConfigError::UnknownDevice(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = SmootherConfig {
            min_smoothing_factor: 0.5,
            max_smoothing_factor: 0.2,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::BoundsOrder { .. })));

        let cfg = SmootherConfig {
            buffer_size: 0,
            ..Default::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyBuffer));

        let cfg = SmootherConfig {
            velocity_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NotPositive { field: "velocity_threshold", .. })
        ));

        let cfg = SmootherConfig {
            prediction_strength: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::OutOfUnitRange { field: "prediction_strength", .. })
        ));
    }

    #[test]
    fn sanitized_is_always_valid() {
        let cfg = SmootherConfig {
            max_position_delta: f64::NAN,
            smoothing_factor: 4.0,
            min_smoothing_factor: 0.6,
            max_smoothing_factor: 0.1,
            buffer_size: 0,
            velocity_threshold: -1.0,
            prediction_strength: f64::INFINITY,
            max_slowdown: 0.2,
            ..Default::default()
        };
        let s = cfg.sanitized();
        assert!(s.validate().is_ok(), "{:?}", s.validate());
        assert_eq!(s.max_position_delta, 0.5);
        assert_eq!(s.min_smoothing_factor, 0.1);
        assert_eq!(s.max_smoothing_factor, 0.6);
        assert_eq!(s.smoothing_factor, 0.6);
        assert_eq!(s.buffer_size, 1);
        assert_eq!(s.velocity_threshold, 0.1);
        assert_eq!(s.prediction_strength, 0.1);
        assert_eq!(s.max_slowdown, 1.0);
    }

    #[test]
    fn serde_fills_missing_fields() {
        let cfg: SmootherConfig =
            serde_json::from_str(r#"{ "buffer_size": 7, "prediction_strength": 0.05 }"#).unwrap();
        assert_eq!(cfg.buffer_size, 7);
        assert_eq!(cfg.prediction_strength, 0.05);
        assert_eq!(cfg.max_position_delta, 0.5);
    }
}
