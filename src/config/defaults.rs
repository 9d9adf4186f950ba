//! System-wide default constants.
//!
//! Centralises the tolerances and file names used when no configuration
//! file overrides them. Grouped by subsystem for easy discovery.

// ============================================================================
// Tolerances
// ============================================================================

/// Saturation tolerance used when comparing SWAT, SWATINIT and endpoints.
///
/// Simulators write saturations in single precision, so anything tighter
/// than ~1e-5 flags round-off as a discrepancy.
pub const SATURATION_TOLERANCE: f64 = 1e-4;

/// Depth tolerance (m) when testing a cell centre against a fluid contact.
///
/// Simulators and grid readers do not compute cell centres to the same
/// decimals.
pub const CONTACT_DEPTH_TOLERANCE: f64 = 1e-4;

/// Pressure tolerance (bar) when checking that an unscaled curve value
/// agrees with the hydrostatic in-place capillary pressure.
pub const PRESSURE_TOLERANCE: f64 = 1e-3;

/// Upper bound accepted for any tolerance. Larger values would swallow
/// real discrepancies.
pub const MAX_TOLERANCE: f64 = 0.1;

// ============================================================================
// Config Files
// ============================================================================

/// Environment variable pointing at a TOML configuration file.
pub const CONFIG_ENV_VAR: &str = "SWATINIT_QC_CONFIG";

/// Configuration file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "swatinit_qc.toml";

// ============================================================================
// Report
// ============================================================================

/// Volume unit printed in reports (reservoir cubic metres).
pub const DEFAULT_VOLUME_UNIT: &str = "rm3";
