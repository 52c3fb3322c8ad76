//! Distance field parameters.
//!
//! [`SdfParams`] tunes how the field is computed; the grid itself is
//! described separately by [`GridSpec`](crate::GridSpec). With the
//! `config` feature (on by default) parameters can be stored as TOML or
//! JSON:
//!
//! ```toml
//! exact_band = 2
//! max_sweep_cycles = 8
//! sweep = "enabled"
//! parallel = true
//! ```

use crate::propagate::SweepMode;
use crate::raster::RASTER_MARGIN;

/// Parameters for distance field computation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SdfParams {
    /// Cells around each triangle that get exact distances during the scan.
    /// Values below one are treated as one.
    pub exact_band: usize,
    /// Upper bound on eight-direction sweep cycles.
    pub max_sweep_cycles: usize,
    /// Whether to run the sweep after the scan.
    pub sweep: SweepMode,
    /// Use rayon for the scan and the sign pass.
    pub parallel: bool,
    /// Largest grid accepted when sizing from a mesh.
    pub max_voxels: usize,
}

impl Default for SdfParams {
    fn default() -> Self {
        Self {
            exact_band: RASTER_MARGIN,
            max_sweep_cycles: 4,
            sweep: SweepMode::Enabled,
            parallel: true,
            max_voxels: 100_000_000,
        }
    }
}

impl SdfParams {
    /// Narrow band and two sweep cycles, without waiting for a fixed point.
    pub fn fast() -> Self {
        Self {
            max_sweep_cycles: 2,
            ..Self::default()
        }
    }

    /// Wider exact band and enough cycles to converge on awkward meshes.
    pub fn exact() -> Self {
        Self {
            exact_band: 2,
            max_sweep_cycles: 8,
            ..Self::default()
        }
    }

    /// Scan-only parameters. Far points keep the sentinel distance.
    pub fn scan_only() -> Self {
        Self {
            sweep: SweepMode::Disabled,
            ..Self::default()
        }
    }

    /// Force serial execution.
    pub fn serial(mut self) -> Self {
        self.parallel = false;
        self
    }
}

// =========================================================================
// Serialization
// =========================================================================

#[cfg(feature = "config")]
impl SdfParams {
    /// Load parameters from a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load parameters from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Save parameters to a TOML file.
    pub fn save_toml(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let toml_str = self.to_toml()?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    /// Load parameters from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a file, choosing TOML or JSON by extension.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            let contents = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Self::from_toml_file(path)
        }
    }
}

/// Errors that can occur when loading or saving parameters.
#[cfg(feature = "config")]
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading or writing file.
    Io(std::io::Error),
    /// TOML parsing error.
    TomlParse(toml::de::Error),
    /// TOML serialization error.
    TomlSerialize(toml::ser::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
}

#[cfg(feature = "config")]
impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::TomlParse(e) => write!(f, "TOML parse error: {}", e),
            Self::TomlSerialize(e) => write!(f, "TOML serialize error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

#[cfg(feature = "config")]
impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::TomlParse(e) => Some(e),
            Self::TomlSerialize(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

#[cfg(feature = "config")]
impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(feature = "config")]
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::TomlParse(e)
    }
}

#[cfg(feature = "config")]
impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        Self::TomlSerialize(e)
    }
}

#[cfg(feature = "config")]
impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
