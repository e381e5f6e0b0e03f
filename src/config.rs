//! Rotation and scan settings
//!
//! Defaults reproduce the fixed twelve-angle sweep (0°, 30°, ... 330°).
//! Every knob can also be set from the environment:
//!
//! | variable              | field                   |
//! |-----------------------|-------------------------|
//! | `BARCODE_ANGLE_STEP`  | `rotation.angle_step`   |
//! | `BARCODE_ANGLE_COUNT` | `rotation.angle_count`  |
//! | `BARCODE_START_ANGLE` | `rotation.start_angle`  |
//! | `BARCODE_MAX_DIM`     | `max_dim` (0 = off)     |

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::models::RegionRect;

/// Environment variable overriding the angle step
pub const ENV_ANGLE_STEP: &str = "BARCODE_ANGLE_STEP";
/// Environment variable overriding the number of angles
pub const ENV_ANGLE_COUNT: &str = "BARCODE_ANGLE_COUNT";
/// Environment variable overriding the first angle
pub const ENV_START_ANGLE: &str = "BARCODE_START_ANGLE";
/// Environment variable overriding the downscale limit
pub const ENV_MAX_DIM: &str = "BARCODE_MAX_DIM";

fn parse_env_u32<F>(lookup: &F, name: &str, default: u32) -> u32
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
            log::warn!("ignoring {}={:?}: not an unsigned integer", name, raw);
            default
        }),
        None => default,
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Which angles the rotation search samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Degrees between consecutive angles
    pub angle_step: u32,
    /// Number of angles tried
    pub angle_count: u32,
    /// First angle tried, in degrees
    pub start_angle: u32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            angle_step: 30,
            angle_count: 12,
            start_angle: 0,
        }
    }
}

impl RotationConfig {
    /// Validated config with `angle_count` angles `angle_step` degrees apart
    pub fn new(angle_step: u32, angle_count: u32) -> Result<Self> {
        let config = Self {
            angle_step,
            angle_count,
            start_angle: 0,
        };
        config.validate()?;
        Ok(config)
    }

    /// Evenly spaced angles covering the full circle, `360 / angle_step` of them
    pub fn covering(angle_step: u32) -> Result<Self> {
        if angle_step == 0 {
            return Err(ScanError::Config("angle step must be positive".into()));
        }
        Self::new(angle_step, 360 / angle_step)
    }

    /// Reject configs that would try no angle or repeat an angle
    pub fn validate(&self) -> Result<()> {
        if !(1..=360).contains(&self.angle_step) {
            return Err(ScanError::Config(format!(
                "angle step {} outside 1..=360",
                self.angle_step
            )));
        }
        if self.angle_count == 0 {
            return Err(ScanError::Config("angle count must be positive".into()));
        }
        if self.angle_step as u64 * self.angle_count as u64 > 360 {
            return Err(ScanError::Config(format!(
                "{} angles of {} degrees wrap past a full turn",
                self.angle_count, self.angle_step
            )));
        }
        Ok(())
    }

    /// Angles in search order, each in `0..360`
    pub fn angles(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.angle_count).map(move |i| (self.start_angle % 360 + i * self.angle_step) % 360)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(process_env)
    }

    /// Apply overrides from `lookup` (variable name to value), then validate
    pub fn with_overrides<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            angle_step: parse_env_u32(&lookup, ENV_ANGLE_STEP, self.angle_step),
            angle_count: parse_env_u32(&lookup, ENV_ANGLE_COUNT, self.angle_count),
            start_angle: parse_env_u32(&lookup, ENV_START_ANGLE, self.start_angle) % 360,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Settings for scanning a whole uploaded image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Angle sweep applied to every region
    pub rotation: RotationConfig,
    /// Longest side after downscaling; 0 keeps full resolution
    pub max_dim: u32,
    /// Regions to crop and search; empty means the whole image
    pub regions: Vec<RegionRect>,
}

impl ScanConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse from a JSON string and validate
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.rotation.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(process_env)
    }

    /// Apply overrides from `lookup`, then validate
    pub fn with_overrides<F>(self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_dim = parse_env_u32(&lookup, ENV_MAX_DIM, self.max_dim);
        let rotation = self.rotation.with_overrides(lookup)?;
        Ok(Self {
            rotation,
            max_dim,
            regions: self.regions,
        })
    }
}
