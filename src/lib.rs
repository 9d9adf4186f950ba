//! swatinit-qc: SWATINIT quality control for reservoir simulation models
//!
//! Explains, cell by cell, why a simulator's initial water saturation (SWAT)
//! differs from the requested one (SWATINIT), and how much water the
//! difference amounts to per explanation.
//!
//! ## Pipeline
//!
//! - **Grid frame**: validated per-cell table plus SATNUM/EQLNUM side tables
//! - **Curves**: capillary pressure tables with evaluation and inversion
//! - **Contacts**: hydrostatic in-place capillary pressure from contact depths
//! - **Scaling**: the vertical Pc scale the simulator must have applied
//! - **Classifier**: one QC flag and derived curve fields per cell
//! - **Volumes**: signed water volume per QC flag
//! - **Report**: text, JSON and CSV output

pub mod classifier;
pub mod config;
pub mod contacts;
pub mod curves;
pub mod engine;
pub mod error;
pub mod grid_frame;
pub mod report;
pub mod scaling;
pub mod types;
pub mod volumes;

pub use config::{QcConfig, SimulatorFlavour, Tolerances};
pub use engine::{QcEngine, QcOutcome};
pub use error::QcError;
pub use grid_frame::{GridFrame, InputSource, MissingRequiredInputError};
pub use report::QcReport;
pub use types::{CellRecord, DerivedCurveFields, QcFlag, QcRecord};
pub use volumes::CategoryTotals;
