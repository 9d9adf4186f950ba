//! Grid Frame Loading
//!
//! A grid frame is the per-cell property table plus its SATNUM and EQLNUM
//! side tables, exported from a simulator run as one JSON document:
//!
//! ```json
//! {
//!   "cells":   [{"SWATINIT": 0.3, "SWAT": 0.5, "SWL": 0.5, "SWU": 1.0,
//!                "PORV": 1000.0, "SATNUM": 1, "EQLNUM": 1,
//!                "X": 0.0, "Y": 0.0, "Z": 1005.0}],
//!   "satfunc": [{"SATNUM": 1, "SW": [0.0, 1.0], "PCOW": [3.0, 0.0]}],
//!   "equil":   [{"EQLNUM": 1, "OWC": 1020.0, "PC_GRADIENT": 0.0196}]
//! }
//! ```
//!
//! Loading validates the whole document up front: required keywords present
//! on every cell, curve tables well formed, contacts consistent, and every
//! cell pointing at regions that exist. The engine never sees a partial
//! frame.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::contacts::{EquilibrationRegion, WaterContact};
use crate::curves::CapillaryCurveTable;
use crate::error::QcError;
use crate::types::CellRecord;

// ============================================================================
// Missing Input
// ============================================================================

/// Where a required keyword should have come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// INIT file, written from the deck's PROPS/GRID sections
    InitFile,
    /// INIT file endpoint arrays, written only with FILLEPS
    Filleps,
    /// Restart file at the first report step
    Restart,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::InitFile => write!(f, "INIT file"),
            InputSource::Filleps => write!(f, "INIT file (FILLEPS)"),
            InputSource::Restart => write!(f, "UNRST file"),
        }
    }
}

/// A keyword the classification cannot do without.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{keyword} missing from {origin}: {hint}")]
pub struct MissingRequiredInputError {
    pub keyword: &'static str,
    pub origin: InputSource,
    pub hint: &'static str,
}

impl MissingRequiredInputError {
    pub fn new(keyword: &'static str, origin: InputSource) -> Self {
        let hint = match (keyword, origin) {
            ("SWATINIT", _) => "INIT-file/deck does not have SWATINIT",
            ("SWL", _) => "SWL not found, add FILLEPS to the PROPS section of the deck",
            ("SWAT", _) => "SWAT not found at report step 0, add RPTRST with SWAT or ALLPROPS",
            (_, InputSource::Restart) => "not found in the restart file",
            _ => "not found in the INIT file",
        };
        Self { keyword, origin, hint }
    }
}

// ============================================================================
// Wire Format
// ============================================================================

#[derive(Debug, Deserialize)]
struct GridFrameDocument {
    cells: Vec<CellRow>,
    #[serde(default)]
    satfunc: Vec<SatfuncRow>,
    #[serde(default)]
    equil: Vec<EquilRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct CellRow {
    swatinit: Option<f64>,
    swat: Option<f64>,
    swl: Option<f64>,
    swlpc: Option<f64>,
    swu: Option<f64>,
    porv: f64,
    #[serde(default = "default_region")]
    satnum: u32,
    #[serde(default = "default_region")]
    eqlnum: u32,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    z: f64,
}

fn default_region() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct SatfuncRow {
    satnum: u32,
    sw: Vec<f64>,
    #[serde(alias = "PCGW")]
    pcow: Vec<f64>,
    ppcwmax: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct EquilRow {
    eqlnum: u32,
    owc: Option<f64>,
    gwc: Option<f64>,
    goc: Option<f64>,
    pc_gradient: f64,
    gas_pc_gradient: Option<f64>,
}

impl CellRow {
    fn into_record(self, index: usize) -> Result<CellRecord, QcError> {
        let swatinit = self
            .swatinit
            .ok_or_else(|| MissingRequiredInputError::new("SWATINIT", InputSource::InitFile))?;
        let swl = self
            .swl
            .ok_or_else(|| MissingRequiredInputError::new("SWL", InputSource::Filleps))?;
        let swat = self
            .swat
            .ok_or_else(|| MissingRequiredInputError::new("SWAT", InputSource::Restart))?;

        let record = CellRecord {
            index,
            swatinit,
            swat,
            swl,
            swlpc: self.swlpc,
            swu: self.swu.unwrap_or(1.0),
            porv: self.porv,
            satnum: self.satnum,
            eqlnum: self.eqlnum,
            x: self.x,
            y: self.y,
            z: self.z,
        };
        check_cell(&record)?;
        Ok(record)
    }
}

fn check_cell(cell: &CellRecord) -> Result<(), QcError> {
    let invalid = |reason: String| QcError::InvalidCell { cell: cell.index, reason };
    let saturations = [
        ("SWATINIT", cell.swatinit),
        ("SWAT", cell.swat),
        ("SWL", cell.swl),
        ("SWU", cell.swu),
    ];
    for (name, value) in saturations.into_iter().chain(cell.swlpc.map(|v| ("SWLPC", v))) {
        if !value.is_finite() {
            return Err(invalid(format!("{name} is not finite")));
        }
    }
    if !(cell.porv.is_finite() && cell.porv >= 0.0) {
        return Err(invalid(format!("PORV = {} must be a non-negative volume", cell.porv)));
    }
    if !cell.z.is_finite() {
        return Err(invalid("Z is not finite".to_string()));
    }
    Ok(())
}

// ============================================================================
// Grid Frame
// ============================================================================

/// Validated cells and the region tables they reference.
#[derive(Debug, Clone)]
pub struct GridFrame {
    cells: Vec<CellRecord>,
    satfunc: BTreeMap<u32, CapillaryCurveTable>,
    equil: BTreeMap<u32, EquilibrationRegion>,
}

impl GridFrame {
    /// Assemble a frame from already-built parts, checking region references.
    pub fn new(
        cells: Vec<CellRecord>,
        tables: Vec<CapillaryCurveTable>,
        regions: Vec<EquilibrationRegion>,
    ) -> Result<Self, QcError> {
        let mut satfunc = BTreeMap::new();
        for table in tables {
            let satnum = table.satnum();
            if satfunc.insert(satnum, table).is_some() {
                return Err(QcError::DuplicateRegion { keyword: "SATNUM", id: satnum });
            }
        }

        let mut equil = BTreeMap::new();
        for region in regions {
            let eqlnum = region.eqlnum();
            if equil.insert(eqlnum, region).is_some() {
                return Err(QcError::DuplicateRegion { keyword: "EQLNUM", id: eqlnum });
            }
        }

        for cell in &cells {
            if !satfunc.contains_key(&cell.satnum) {
                return Err(QcError::UnknownRegion {
                    keyword: "SATNUM",
                    id: cell.satnum,
                    cell: cell.index,
                });
            }
            if !equil.contains_key(&cell.eqlnum) {
                return Err(QcError::UnknownRegion {
                    keyword: "EQLNUM",
                    id: cell.eqlnum,
                    cell: cell.index,
                });
            }
        }

        Ok(Self { cells, satfunc, equil })
    }

    /// Load a grid frame JSON document from disk.
    pub fn load(path: &Path) -> Result<Self, QcError> {
        let contents = std::fs::read_to_string(path).map_err(|source| QcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let frame = Self::from_json_str(&contents)?;
        info!(
            path = %path.display(),
            cells = frame.cells.len(),
            satnum_regions = frame.satfunc.len(),
            eqlnum_regions = frame.equil.len(),
            "Loaded grid frame"
        );
        Ok(frame)
    }

    /// Parse and validate a grid frame JSON document.
    pub fn from_json_str(contents: &str) -> Result<Self, QcError> {
        let doc: GridFrameDocument = serde_json::from_str(contents)?;

        let cells = doc
            .cells
            .into_iter()
            .enumerate()
            .map(|(index, row)| row.into_record(index))
            .collect::<Result<Vec<_>, _>>()?;

        let tables = doc
            .satfunc
            .into_iter()
            .map(|row| CapillaryCurveTable::new(row.satnum, row.sw, row.pcow, row.ppcwmax))
            .collect::<Result<Vec<_>, _>>()?;

        let regions = doc
            .equil
            .into_iter()
            .map(|row| {
                let contact = WaterContact::from_depths(row.eqlnum, row.owc, row.gwc)?;
                EquilibrationRegion::with_goc(
                    row.eqlnum,
                    contact,
                    row.pc_gradient,
                    row.goc,
                    row.gas_pc_gradient,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            cells = cells.len(),
            tables = tables.len(),
            regions = regions.len(),
            "Parsed grid frame document"
        );
        Self::new(cells, tables, regions)
    }

    pub fn cells(&self) -> &[CellRecord] {
        &self.cells
    }

    pub fn table(&self, satnum: u32) -> Option<&CapillaryCurveTable> {
        self.satfunc.get(&satnum)
    }

    pub fn region(&self, eqlnum: u32) -> Option<&EquilibrationRegion> {
        self.equil.get(&eqlnum)
    }

    pub fn tables(&self) -> impl Iterator<Item = &CapillaryCurveTable> {
        self.satfunc.values()
    }

    pub fn regions(&self) -> impl Iterator<Item = &EquilibrationRegion> {
        self.equil.values()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
