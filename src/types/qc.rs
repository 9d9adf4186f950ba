//! Per-cell diagnosis: QcFlag, DerivedCurveFields, QcRecord

use serde::{Deserialize, Serialize};

use super::CellRecord;

// ============================================================================
// QC Flag
// ============================================================================

/// Why a cell's realized water saturation is what it is.
///
/// Declared in classification order; the derived `Ord` follows it, so
/// reports list categories in the order they are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QcFlag {
    /// SWATINIT below the connate floor, truncated up to it
    #[serde(rename = "SWL_TRUNC")]
    SwlTrunc,
    /// Hydrocarbons requested at or below the free water level
    #[serde(rename = "HC_BELOW_FWL")]
    HcBelowFwl,
    /// SWATINIT at or above the zero capillary pressure saturation
    #[serde(rename = "SWATINIT_1")]
    Swatinit1,
    /// Fully water saturated, as requested
    #[serde(rename = "WATER")]
    Water,
    /// Capillary pressure scaling capped by PPCWMAX
    #[serde(rename = "PPCWMAX")]
    Ppcwmax,
    /// Capillary pressure scaled to honour SWATINIT
    #[serde(rename = "PC_SCALED")]
    PcScaled,
}

impl QcFlag {
    pub const ALL: [QcFlag; 6] = [
        QcFlag::SwlTrunc,
        QcFlag::HcBelowFwl,
        QcFlag::Swatinit1,
        QcFlag::Water,
        QcFlag::Ppcwmax,
        QcFlag::PcScaled,
    ];

    /// Upper-case tag used in tables and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            QcFlag::SwlTrunc => "SWL_TRUNC",
            QcFlag::HcBelowFwl => "HC_BELOW_FWL",
            QcFlag::Swatinit1 => "SWATINIT_1",
            QcFlag::Water => "WATER",
            QcFlag::Ppcwmax => "PPCWMAX",
            QcFlag::PcScaled => "PC_SCALED",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QcFlag::SwlTrunc => "SWATINIT < SWL (or SWLPC), truncated up to the connate floor",
            QcFlag::HcBelowFwl => "Hydrocarbons requested below the contact, ignored",
            QcFlag::Swatinit1 => "SWATINIT at or above the zero-Pc saturation, Pc not scaled",
            QcFlag::Water => "Water leg, SWAT = SWATINIT = 1",
            QcFlag::Ppcwmax => "Pc scaling limited by PPCWMAX, SWATINIT not honoured",
            QcFlag::PcScaled => "Pc scaled to match SWATINIT",
        }
    }
}

impl std::fmt::Display for QcFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QcFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QcFlag::ALL
            .into_iter()
            .find(|flag| flag.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown QC flag '{s}'"))
    }
}

// ============================================================================
// QC Record
// ============================================================================

/// Capillary pressure quantities derived for one cell.
///
/// Kept as one value so a record carries either all three or none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedCurveFields {
    /// Capillary pressure from the (scaled) curve
    #[serde(rename = "PC")]
    pub pc: f64,
    /// Maximum capillary pressure after scaling
    #[serde(rename = "PPCW")]
    pub ppcw: f64,
    /// Vertical scale applied to the table
    #[serde(rename = "PC_SCALING")]
    pub pc_scaling: f64,
}

impl DerivedCurveFields {
    /// Fields of a curve used as tabulated.
    pub fn unscaled(pc: f64, max_pc: f64) -> Self {
        Self {
            pc,
            ppcw: max_pc,
            pc_scaling: 1.0,
        }
    }
}

/// Diagnosis for one cell, with the cell's own fields carried through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QcRecord {
    #[serde(flatten)]
    pub cell: CellRecord,
    #[serde(rename = "QC_FLAG")]
    pub qc_flag: QcFlag,
    /// Absent when the cell's curve fields are undefined. Under `PPCWMAX`,
    /// PC is the capped curve at SWATINIT, not the in-place pressure.
    #[serde(flatten)]
    pub derived: Option<DerivedCurveFields>,
    /// Hydrostatic capillary pressure at the cell centre, unscaled
    #[serde(rename = "PC_UNSCALED")]
    pub pc_unscaled: f64,
    #[serde(rename = "PPCWMAX")]
    pub ppcwmax: Option<f64>,
}

impl QcRecord {
    pub fn pc(&self) -> Option<f64> {
        self.derived.map(|d| d.pc)
    }

    pub fn ppcw(&self) -> Option<f64> {
        self.derived.map(|d| d.ppcw)
    }

    pub fn pc_scaling(&self) -> Option<f64> {
        self.derived.map(|d| d.pc_scaling)
    }

    /// Signed water volume discrepancy for this cell.
    pub fn water_volume(&self) -> f64 {
        self.cell.water_volume_change()
    }
}
