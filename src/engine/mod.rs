//! QC Engine
//!
//! Runs the classifier over every cell of a [`GridFrame`] and reduces the
//! resulting records into category totals.
//!
//! The frame is immutable and cells are classified independently, so the
//! fan-out needs no locks: `rayon` splits the cell slice across its pool and
//! collects records back in cell order. Totals are a fold/reduce over the
//! records. Sequential and parallel runs produce identical output.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::config::QcConfig;
use crate::error::QcError;
use crate::grid_frame::GridFrame;
use crate::types::{CellRecord, QcFlag, QcRecord};
use crate::volumes::CategoryTotals;

/// Records and totals from one engine run.
#[derive(Debug, Clone)]
pub struct QcOutcome {
    /// One record per cell, in cell index order
    pub records: Vec<QcRecord>,
    pub totals: CategoryTotals,
}

impl QcOutcome {
    /// Records with the given flag.
    pub fn with_flag(&self, flag: QcFlag) -> impl Iterator<Item = &QcRecord> {
        self.records.iter().filter(move |r| r.qc_flag == flag)
    }
}

/// Stateless SWATINIT QC engine.
#[derive(Debug, Clone, Copy)]
pub struct QcEngine {
    classifier: Classifier,
    parallel: bool,
}

impl QcEngine {
    pub fn new(config: &QcConfig) -> Self {
        Self {
            classifier: Classifier::new(config.tolerances, config.simulator.flavour),
            parallel: config.engine.parallel,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify every cell of `frame` and total the water volume per flag.
    pub fn run(&self, frame: &GridFrame) -> Result<QcOutcome, QcError> {
        let start = Instant::now();
        info!(
            cells = frame.len(),
            flavour = %self.classifier.flavour(),
            parallel = self.parallel,
            "Running SWATINIT QC"
        );

        let records = if self.parallel {
            frame
                .cells()
                .par_iter()
                .map(|cell| self.classify_cell(frame, cell))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            frame
                .cells()
                .iter()
                .map(|cell| self.classify_cell(frame, cell))
                .collect::<Result<Vec<_>, _>>()?
        };

        let totals = if self.parallel {
            CategoryTotals::from_records_par(&records)
        } else {
            CategoryTotals::from_records(&records)
        };

        for (flag, total) in totals.iter() {
            debug!(
                flag = %flag,
                cells = total.cells,
                water_volume = total.water_volume,
                "Category total"
            );
        }

        let truncated = totals.cells(QcFlag::SwlTrunc);
        let below_fwl = totals.cells(QcFlag::HcBelowFwl);
        if truncated + below_fwl > 0 {
            warn!(
                swl_trunc = truncated,
                hc_below_fwl = below_fwl,
                "SWATINIT not honoured in some cells"
            );
        }

        info!(
            cells = records.len(),
            water_volume = totals.total_volume(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "SWATINIT QC complete"
        );

        Ok(QcOutcome { records, totals })
    }

    fn classify_cell(&self, frame: &GridFrame, cell: &CellRecord) -> Result<QcRecord, QcError> {
        let table = frame.table(cell.satnum).ok_or(QcError::UnknownRegion {
            keyword: "SATNUM",
            id: cell.satnum,
            cell: cell.index,
        })?;
        let region = frame.region(cell.eqlnum).ok_or(QcError::UnknownRegion {
            keyword: "EQLNUM",
            id: cell.eqlnum,
            cell: cell.index,
        })?;
        Ok(self.classifier.classify(cell, table, region))
    }
}
