//! QC Configuration - tolerances, simulator flavour and engine options
//!
//! Every tolerance that decides a QC category is a field in this module.
//! Each struct implements `Default` with the values in [`super::defaults`],
//! so a run without a config file classifies exactly as documented.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a QC run.
///
/// Load with [`QcConfig::load`] which searches:
/// 1. an explicit path
/// 2. `$SWATINIT_QC_CONFIG`
/// 3. `./swatinit_qc.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QcConfig {
    /// Comparison tolerances
    #[serde(default)]
    pub tolerances: Tolerances,

    /// Which simulator produced the initial saturations
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Classification engine options
    #[serde(default)]
    pub engine: EngineConfig,

    /// Report rendering options
    #[serde(default)]
    pub report: ReportConfig,
}

impl QcConfig {
    /// Load configuration using the standard search order.
    ///
    /// An explicit path that fails to load is reported and the search falls
    /// back to the next source, mirroring the environment variable lookup.
    pub fn load(explicit: Option<&Path>) -> Self {
        // 1. Explicit path
        if let Some(path) = explicit {
            match Self::load_from_file(path) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded QC config");
                    return config;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to load QC config, falling back");
                }
            }
        }

        // 2. Environment variable
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded QC config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load QC config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        // 3. Local file
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded QC config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        // 4. Defaults
        info!("No QC config found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(Some(path.to_path_buf()), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Two-pass: unknown keys are reported as warnings first, then the
    /// document is deserialized and validated.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(None, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate tolerances and options for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let t = &self.tolerances;
        Self::check_tolerance(t.saturation, "tolerances.saturation", &mut errors);
        Self::check_tolerance(t.contact_depth, "tolerances.contact_depth", &mut errors);
        Self::check_tolerance(t.pressure, "tolerances.pressure", &mut errors);

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_tolerance(value: f64, name: &str, errors: &mut Vec<String>) {
        // NaN comparisons silently pass, so finiteness is checked first
        if !value.is_finite() {
            errors.push(format!("{name} must be finite (got {value})"));
            return;
        }
        if value <= 0.0 {
            errors.push(format!("{name} = {value} must be > 0"));
        } else if value > defaults::MAX_TOLERANCE {
            errors.push(format!(
                "{name} = {value} exceeds the maximum tolerance {}",
                defaults::MAX_TOLERANCE
            ));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(Option<PathBuf>, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(Some(path), e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Parse(None, e) => write!(f, "Config parse error: {e}"),
            Self::Serialize(e) => write!(f, "Config serialization error: {e}"),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Tolerances
// ============================================================================

/// Comparison tolerances applied by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    /// Saturation comparisons (SWAT vs SWATINIT, SWL, 1.0)
    #[serde(default = "default_saturation_tolerance")]
    pub saturation: f64,

    /// Cell depth vs contact depth (m)
    #[serde(default = "default_contact_depth_tolerance")]
    pub contact_depth: f64,

    /// Curve pressure vs in-place pressure (bar)
    #[serde(default = "default_pressure_tolerance")]
    pub pressure: f64,
}

fn default_saturation_tolerance() -> f64 { defaults::SATURATION_TOLERANCE }
fn default_contact_depth_tolerance() -> f64 { defaults::CONTACT_DEPTH_TOLERANCE }
fn default_pressure_tolerance() -> f64 { defaults::PRESSURE_TOLERANCE }

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            saturation: default_saturation_tolerance(),
            contact_depth: default_contact_depth_tolerance(),
            pressure: default_pressure_tolerance(),
        }
    }
}

impl Tolerances {
    /// Whether two saturations agree within the saturation tolerance.
    pub fn same_saturation(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.saturation
    }

    /// Whether two pressures agree within the pressure tolerance.
    pub fn same_pressure(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.pressure
    }
}

// ============================================================================
// Simulator
// ============================================================================

/// Simulator that produced SWAT.
///
/// The simulators differ in which endpoint keywords they honour when
/// scaling capillary pressure curves to SWATINIT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorFlavour {
    /// Eclipse100: honours PPCWMAX and SWLPC
    #[default]
    Eclipse,
    /// OPM Flow: ignores PPCWMAX and treats SWLPC as absent
    Flow,
}

impl SimulatorFlavour {
    /// Whether the simulator caps curve scaling at PPCWMAX.
    pub fn honours_ppcwmax(self) -> bool {
        matches!(self, Self::Eclipse)
    }

    /// Whether SWLPC replaces SWL as the truncation floor.
    pub fn honours_swlpc(self) -> bool {
        matches!(self, Self::Eclipse)
    }

    /// Whether the simulator reports PPCW for cells below the water contact
    /// whose SWATINIT it ignored. Eclipse leaves it undefined there.
    pub fn reports_ppcw_below_contact(self) -> bool {
        matches!(self, Self::Flow)
    }
}

impl fmt::Display for SimulatorFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eclipse => write!(f, "eclipse"),
            Self::Flow => write!(f, "flow"),
        }
    }
}

impl std::str::FromStr for SimulatorFlavour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "eclipse" | "e100" | "eclipse100" => Ok(Self::Eclipse),
            "flow" | "opm" | "opm-flow" => Ok(Self::Flow),
            other => Err(format!("unknown simulator flavour '{other}' (expected eclipse or flow)")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default)]
    pub flavour: SimulatorFlavour,
}

// ============================================================================
// Engine
// ============================================================================

/// Classification engine options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Classify cells on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool { true }

impl Default for EngineConfig {
    fn default() -> Self {
        Self { parallel: default_parallel() }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Report rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Unit label for volumes
    #[serde(default = "default_volume_unit")]
    pub volume_unit: String,

    /// Add a per-EQLNUM breakdown to the text report
    #[serde(default)]
    pub by_eqlnum: bool,
}

fn default_volume_unit() -> String { defaults::DEFAULT_VOLUME_UNIT.to_string() }

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            volume_unit: default_volume_unit(),
            by_eqlnum: false,
        }
    }
}
