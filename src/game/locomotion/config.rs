// Locomotion tuning
//
// Every character shares the same tuning by default. Files may override any
// subset of fields; missing sections fall back to BASE_LOCOMOTION.

use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::util::{FloatCurve, Rotator, VectorCurve};

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Capsule sizes per stance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterDimensions {
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    pub crouched_half_height: f32,
    pub swimming_capsule_radius: f32,
    pub swimming_capsule_half_height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSettings {
    pub max_walk_speed: f32,
    pub max_swim_speed: f32,
    pub sprint_speed: f32,
    pub out_of_stamina_speed: f32,
    pub max_acceleration: f32,
    /// Minimum normal Z of a surface the character can stand on
    pub walkable_floor_z: f32,
}

/// Jump-off reorientation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationSettings {
    /// Degrees per second on each axis
    pub forced_rotation_rate: Rotator,
    /// Per-axis angular tolerance (degrees) at which the override clears
    pub forced_rotation_tolerance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderSettings {
    pub climbing_regular_speed: f32,
    pub climbing_max_speed: f32,
    pub braking_deceleration: f32,
    /// Stand-off from the ladder along its forward axis
    pub character_offset: f32,
    pub max_top_offset: f32,
    pub min_bottom_offset: f32,
    pub jump_off_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiplineSettings {
    pub max_speed: f32,
    /// Gap between the cable and the top of the capsule
    pub character_offset: f32,
    /// Alpha curve for initial speed -> max speed. None reaches max speed at once.
    pub acceleration_curve: Option<Rc<FloatCurve>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRunSettings {
    pub max_time: f32,
    pub max_speed: f32,
    pub jump_off_speed: f32,
    pub probe_length: f32,
    /// Surfaces whose normal Z is below `-overhang_tolerance` are overhangs
    pub overhang_tolerance: f32,
    /// Per-component tolerance of the head-on collision guard
    pub head_on_tolerance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideSettings {
    pub max_speed: f32,
    pub max_time: f32,
    pub capsule_half_height: f32,
    /// How far ahead of the character the floor probe starts
    pub over_ledge_offset: f32,
    /// Extra floor probe length below a full-height capsule
    pub down_trace_length: f32,
    /// Alpha curve for start speed -> slide max speed. None reaches it at once.
    pub speed_curve: Option<Rc<FloatCurve>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgeDetectionSettings {
    pub min_ledge_height: f32,
    pub max_ledge_height: f32,
    pub forward_check_distance: f32,
    /// The probe measures heights from this far above the capsule bottom
    pub bottom_z_offset: f32,
    /// Pull-back from the wall face before probing down
    pub down_trace_pullback: f32,
    /// Extra lift above the landing point for the clearance check
    pub clearance_margin: f32,
}

/// Tuning for one family of mantle animations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MantlingSettings {
    /// X: position alpha, Y: XY correction alpha, Z: Z correction alpha
    pub curve: Option<Rc<VectorCurve>>,
    pub animation_correction_xy: f32,
    pub animation_correction_z: f32,
    pub max_height: f32,
    pub min_height: f32,
    pub max_height_start_time: f32,
    pub min_height_start_time: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MantleSettings {
    /// Ledges above this use the high settings
    pub low_max_height: f32,
    pub high: MantlingSettings,
    pub low: MantlingSettings,
}

/// Complete locomotion tuning for a character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    pub character: CharacterDimensions,
    pub speeds: SpeedSettings,
    pub rotation: RotationSettings,
    pub ladder: LadderSettings,
    pub zipline: ZiplineSettings,
    pub wall_run: WallRunSettings,
    pub slide: SlideSettings,
    pub ledge: LedgeDetectionSettings,
    pub mantle: MantleSettings,
}

const HIGH_MANTLE: MantlingSettings = MantlingSettings {
    curve: None,
    animation_correction_xy: 65.0,
    animation_correction_z: 200.0,
    max_height: 200.0,
    min_height: 100.0,
    max_height_start_time: 0.0,
    min_height_start_time: 0.5,
};

const LOW_MANTLE: MantlingSettings = MantlingSettings {
    curve: None,
    animation_correction_xy: 65.0,
    animation_correction_z: 100.0,
    max_height: 125.0,
    min_height: 40.0,
    max_height_start_time: 0.0,
    min_height_start_time: 0.3,
};

/// Reference tuning, in centimetres and seconds
pub const BASE_LOCOMOTION: LocomotionConfig = LocomotionConfig {
    character: CharacterDimensions {
        capsule_radius: 42.0,
        capsule_half_height: 96.0,
        crouched_half_height: 60.0,
        swimming_capsule_radius: 60.0,
        swimming_capsule_half_height: 60.0,
    },
    speeds: SpeedSettings {
        max_walk_speed: 600.0,
        max_swim_speed: 300.0,
        sprint_speed: 1200.0,
        out_of_stamina_speed: 75.0,
        max_acceleration: 2048.0,
        walkable_floor_z: 0.71,
    },
    rotation: RotationSettings {
        forced_rotation_rate: Rotator::new(360.0, 540.0, 360.0),
        forced_rotation_tolerance: 1e-3,
    },
    ladder: LadderSettings {
        climbing_regular_speed: 200.0,
        climbing_max_speed: 250.0,
        braking_deceleration: 2048.0,
        character_offset: 60.0,
        max_top_offset: 90.0,
        min_bottom_offset: 90.0,
        jump_off_speed: 500.0,
    },
    zipline: ZiplineSettings {
        max_speed: 2000.0,
        character_offset: 35.0,
        acceleration_curve: None,
    },
    wall_run: WallRunSettings {
        max_time: 1.5,
        max_speed: 1000.0,
        jump_off_speed: 350.0,
        probe_length: 200.0,
        overhang_tolerance: 0.005,
        head_on_tolerance: 0.7,
    },
    slide: SlideSettings {
        max_speed: 1000.0,
        max_time: 2.0,
        capsule_half_height: 45.0,
        over_ledge_offset: 40.0,
        down_trace_length: 10.0,
        speed_curve: None,
    },
    ledge: LedgeDetectionSettings {
        min_ledge_height: 40.0,
        max_ledge_height: 200.0,
        forward_check_distance: 100.0,
        bottom_z_offset: 2.0,
        down_trace_pullback: 10.0,
        clearance_margin: 2.0,
    },
    mantle: MantleSettings {
        low_max_height: 125.0,
        high: HIGH_MANTLE,
        low: LOW_MANTLE,
    },
};

impl Default for LocomotionConfig {
    fn default() -> Self {
        BASE_LOCOMOTION
    }
}

impl Default for CharacterDimensions {
    fn default() -> Self {
        BASE_LOCOMOTION.character
    }
}

impl Default for SpeedSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.speeds
    }
}

impl Default for RotationSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.rotation
    }
}

impl Default for LadderSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.ladder
    }
}

impl Default for ZiplineSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.zipline
    }
}

impl Default for WallRunSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.wall_run
    }
}

impl Default for SlideSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.slide
    }
}

impl Default for LedgeDetectionSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.ledge
    }
}

impl Default for MantleSettings {
    fn default() -> Self {
        BASE_LOCOMOTION.mantle
    }
}

impl Default for MantlingSettings {
    fn default() -> Self {
        HIGH_MANTLE
    }
}

impl LocomotionConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: LocomotionConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded locomotion config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Reference tuning with the stock mantle, zipline and slide curves installed
    pub fn with_default_curves(mut self) -> Self {
        self.mantle.high.curve = Some(Rc::new(stock_mantle_curve(1.6)));
        self.mantle.low.curve = Some(Rc::new(stock_mantle_curve(1.0)));
        self.zipline.acceleration_curve = Some(Rc::new(stock_curve(&[(0.0, 0.0), (1.5, 0.8), (3.0, 1.0)])));
        self.slide.speed_curve = Some(Rc::new(stock_curve(&[(0.0, 0.0), (0.5, 0.6), (2.0, 1.0)])));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.character;
        if c.capsule_radius <= 0.0 || c.capsule_half_height < c.capsule_radius {
            return Err(ConfigError::Invalid(
                "capsule half height must be at least the (positive) radius".to_string(),
            ));
        }
        if self.slide.capsule_half_height > c.capsule_half_height {
            return Err(ConfigError::Invalid(
                "slide capsule must not be taller than the standing capsule".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.speeds.walkable_floor_z) {
            return Err(ConfigError::Invalid(format!(
                "walkable_floor_z {} is outside [0, 1]",
                self.speeds.walkable_floor_z
            )));
        }
        if self.ledge.min_ledge_height >= self.ledge.max_ledge_height {
            return Err(ConfigError::Invalid(
                "min_ledge_height must be below max_ledge_height".to_string(),
            ));
        }
        if self.ladder.climbing_regular_speed > self.ladder.climbing_max_speed {
            return Err(ConfigError::Invalid(
                "ladder regular speed exceeds ladder max speed".to_string(),
            ));
        }

        let timers = [
            ("wall_run.max_time", self.wall_run.max_time),
            ("slide.max_time", self.slide.max_time),
        ];
        for (name, value) in timers {
            if value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

fn stock_curve(points: &[(f32, f32)]) -> FloatCurve {
    // Stock points are sorted and finite
    FloatCurve::from_points(points).unwrap_or_else(|_| FloatCurve::linear(1.0))
}

fn stock_mantle_curve(duration: f32) -> VectorCurve {
    let correction = stock_curve(&[(0.0, 0.0), (duration * 0.25, 1.0), (duration, 1.0)]);
    VectorCurve::new(
        stock_curve(&[(0.0, 0.0), (duration * 0.3, 0.1), (duration, 1.0)]),
        correction.clone(),
        correction,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LocomotionConfig::default();
        assert_eq!(config.speeds.sprint_speed, 1200.0);
        assert_eq!(config.speeds.out_of_stamina_speed, 75.0);
        assert_eq!(config.ladder.climbing_max_speed, 250.0);
        assert_eq!(config.zipline.max_speed, 2000.0);
        assert!(config.mantle.high.curve.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = LocomotionConfig::from_toml_str(
            r#"
            [speeds]
            sprint_speed = 900.0

            [ladder]
            climbing_regular_speed = 150.0

            [slide]
            speed_curve = [{ time = 0.0, value = 0.0 }, { time = 1.0, value = 1.0 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.speeds.sprint_speed, 900.0);
        assert_eq!(config.speeds.max_walk_speed, 600.0);
        assert_eq!(config.ladder.climbing_regular_speed, 150.0);
        assert_eq!(config.ladder.climbing_max_speed, 250.0);
        assert_eq!(config.slide.speed_curve.unwrap().time_range(), (0.0, 1.0));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = LocomotionConfig::from_toml_str(
            r#"
            [ledge]
            min_ledge_height = 250.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LocomotionConfig::from_toml_str("speeds = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_default_curves_installed() {
        let config = LocomotionConfig::default().with_default_curves();
        let high = config.mantle.high.curve.as_ref().unwrap();
        assert_eq!(high.time_range(), (0.0, 1.6));
        assert!(config.zipline.acceleration_curve.is_some());
        assert!(config.slide.speed_curve.is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid("bad".to_string());
        assert_eq!(err.to_string(), "Invalid config value: bad");
    }
}
