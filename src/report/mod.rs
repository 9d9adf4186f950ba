//! QC Reporting
//!
//! Turns an engine outcome into something an engineer reads: a text summary
//! of water volume per category, the same numbers as JSON, and the full
//! per-cell QC table as CSV.

mod csv;

pub use csv::{write_qc_csv, QC_COLUMNS};

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{QcConfig, SimulatorFlavour};
use crate::engine::QcOutcome;
use crate::types::{QcFlag, QcRecord};
use crate::volumes::{totals_by_region, CategoryTotals};

/// Spread of the applied PC_SCALING over cells that were scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalingSummary {
    pub cells: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ScalingSummary {
    fn from_records<'a>(records: impl IntoIterator<Item = &'a QcRecord>) -> Option<Self> {
        let mut summary: Option<Self> = None;
        let mut sum = 0.0;
        for scale in records
            .into_iter()
            .filter(|r| matches!(r.qc_flag, QcFlag::PcScaled | QcFlag::Ppcwmax))
            .filter_map(QcRecord::pc_scaling)
        {
            sum += scale;
            let s = summary.get_or_insert(Self {
                cells: 0,
                min: scale,
                max: scale,
                mean: 0.0,
            });
            s.cells += 1;
            s.min = s.min.min(scale);
            s.max = s.max.max(scale);
        }
        summary.map(|mut s| {
            s.mean = sum / s.cells as f64;
            s
        })
    }
}

/// Summary of one QC run.
#[derive(Debug, Clone, Serialize)]
pub struct QcReport {
    pub generated_at: DateTime<Utc>,
    pub flavour: SimulatorFlavour,
    pub volume_unit: String,
    pub cell_count: usize,
    /// Regions the report is restricted to; empty means all
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub eqlnum_filter: Vec<u32>,
    pub totals: CategoryTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_eqlnum: Option<BTreeMap<u32, CategoryTotals>>,
    pub scaling: Option<ScalingSummary>,
}

impl QcReport {
    /// Build a report, optionally restricted to the EQLNUM regions in
    /// `eqlnums`.
    pub fn build(outcome: &QcOutcome, config: &QcConfig, eqlnums: &[u32]) -> Self {
        let selected: Vec<&QcRecord> = outcome
            .records
            .iter()
            .filter(|r| eqlnums.is_empty() || eqlnums.contains(&r.cell.eqlnum))
            .collect();

        let totals = if eqlnums.is_empty() {
            outcome.totals.clone()
        } else {
            CategoryTotals::from_records(selected.iter().copied())
        };

        let mut eqlnum_filter = eqlnums.to_vec();
        eqlnum_filter.sort_unstable();
        eqlnum_filter.dedup();

        Self {
            generated_at: Utc::now(),
            flavour: config.simulator.flavour,
            volume_unit: config.report.volume_unit.clone(),
            cell_count: selected.len(),
            eqlnum_filter,
            totals,
            by_eqlnum: config
                .report
                .by_eqlnum
                .then(|| totals_by_region(selected.iter().copied())),
            scaling: ScalingSummary::from_records(selected.iter().copied()),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary.
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    fn write_totals(&self, f: &mut fmt::Formatter<'_>, totals: &CategoryTotals) -> fmt::Result {
        let unit = &self.volume_unit;
        writeln!(
            f,
            "{:<14} {:>8} {:>18} {:>10}  {}",
            "QC_FLAG",
            "Cells",
            format!("Water ({unit})"),
            "% req.",
            "Description"
        )?;
        writeln!(f, "{}", "-".repeat(78))?;
        for (flag, total) in totals.iter() {
            let pct = totals
                .percent_of_requested(flag)
                .map_or_else(|| "-".to_string(), |p| format!("{p:.2}"));
            writeln!(
                f,
                "{:<14} {:>8} {:>18.2} {:>10}  {}",
                flag.as_str(),
                total.cells,
                total.water_volume,
                pct,
                flag.description()
            )?;
        }
        writeln!(f, "{}", "-".repeat(78))?;
        let requested = totals.total_requested_volume();
        let pct = if requested > 0.0 {
            format!("{:.2}", 100.0 * totals.total_volume() / requested)
        } else {
            "-".to_string()
        };
        writeln!(
            f,
            "{:<14} {:>8} {:>18.2} {:>10}",
            "Total",
            totals.total_cells(),
            totals.total_volume(),
            pct
        )
    }
}

impl fmt::Display for QcReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SWATINIT QC ({}, {} cells) - {}",
            self.flavour,
            self.cell_count,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        if !self.eqlnum_filter.is_empty() {
            let regions: Vec<String> = self.eqlnum_filter.iter().map(u32::to_string).collect();
            writeln!(f, "EQLNUM: {}", regions.join(", "))?;
        }
        writeln!(f)?;
        self.write_totals(f, &self.totals)?;

        if let Some(regions) = &self.by_eqlnum {
            for (eqlnum, totals) in regions {
                writeln!(f, "\nEQLNUM {eqlnum}")?;
                self.write_totals(f, totals)?;
            }
        }

        if let Some(s) = &self.scaling {
            writeln!(
                f,
                "\nPC_SCALING over {} cells: min {:.4}, mean {:.4}, max {:.4}",
                s.cells, s.min, s.mean, s.max
            )?;
        }
        Ok(())
    }
}
