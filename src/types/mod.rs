//! Shared data structures for the SWATINIT QC pipeline
//!
//! - CellRecord: per-cell simulator state (input)
//! - QcFlag, DerivedCurveFields, QcRecord: per-cell diagnosis (output)

mod cell;
mod qc;

pub use cell::*;
pub use qc::*;
