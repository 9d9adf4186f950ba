//! Cell Classifier
//!
//! Explains one cell's realized SWAT against its requested SWATINIT. The
//! branches are tested in a fixed order and the first match wins:
//!
//! | # | Flag           | Condition                                         |
//! |---|----------------|---------------------------------------------------|
//! | 1 | `SWL_TRUNC`    | SWAT at the connate floor, SWATINIT below it      |
//! | 2 | `HC_BELOW_FWL` | at/below contact and SWAT differs from SWATINIT   |
//! | 3 | `SWATINIT_1`   | above contact, SWATINIT at zero-Pc saturation/SWU |
//! | 4 | `WATER`        | SWAT and SWATINIT both 1                          |
//! | 5 | `PPCWMAX`      | requested scale exceeds the PPCWMAX cap           |
//! | 6 | `PC_SCALED`    | everything else                                   |
//!
//! Classification is a pure function of the cell and its two region objects.

use tracing::trace;

use crate::config::{SimulatorFlavour, Tolerances};
use crate::contacts::EquilibrationRegion;
use crate::curves::{CapillaryCurveTable, EndpointScaledCurve};
use crate::scaling::{ScalingOutcome, ScalingResolver};
use crate::types::{CellRecord, DerivedCurveFields, QcFlag, QcRecord};

/// Per-cell SWATINIT classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    tolerances: Tolerances,
    flavour: SimulatorFlavour,
}

impl Classifier {
    pub fn new(tolerances: Tolerances, flavour: SimulatorFlavour) -> Self {
        Self { tolerances, flavour }
    }

    pub fn tolerances(&self) -> Tolerances {
        self.tolerances
    }

    pub fn flavour(&self) -> SimulatorFlavour {
        self.flavour
    }

    /// Classify one cell against its SATNUM table and EQLNUM region.
    pub fn classify(
        &self,
        cell: &CellRecord,
        table: &CapillaryCurveTable,
        region: &EquilibrationRegion,
    ) -> QcRecord {
        let tol = self.tolerances;
        let floor = cell.truncation_floor(self.flavour.honours_swlpc());
        let curve = EndpointScaledCurve::new(table, floor, cell.swu);
        let below = region.is_below_contact(cell.z, tol.contact_depth);
        let pc_unscaled = region.in_place_pc(cell.z);
        let ppcwmax = table.ppcwmax().filter(|_| self.flavour.honours_ppcwmax());
        let resolver = ScalingResolver::new(&curve, tol).with_ppcwmax(ppcwmax);

        let (qc_flag, derived) =
            self.decide(cell, &curve, &resolver, floor, below, pc_unscaled, ppcwmax);

        trace!(
            cell = cell.index,
            flag = %qc_flag,
            below_contact = below,
            pc_unscaled,
            "Cell classified"
        );

        QcRecord {
            cell: *cell,
            qc_flag,
            derived,
            pc_unscaled,
            ppcwmax,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn decide(
        &self,
        cell: &CellRecord,
        curve: &EndpointScaledCurve<'_>,
        resolver: &ScalingResolver<'_, '_>,
        floor: f64,
        below: bool,
        pc_unscaled: f64,
        ppcwmax: Option<f64>,
    ) -> (QcFlag, Option<DerivedCurveFields>) {
        let tol = self.tolerances;
        let max_pc = curve.max_pc();

        // 1. Requested saturation truncated up to the connate floor
        if tol.same_saturation(cell.swat, floor) && cell.swatinit < floor - tol.saturation {
            return (QcFlag::SwlTrunc, None);
        }

        // 2. Simulator ignores hydrocarbons requested in the water leg
        if below && !tol.same_saturation(cell.swat, cell.swatinit) {
            let derived = (self.flavour.reports_ppcw_below_contact()
                && curve.contains(cell.swat, tol.saturation))
            .then(|| DerivedCurveFields::unscaled(curve.evaluate_pc(cell.swat, 1.0), max_pc));
            return (QcFlag::HcBelowFwl, derived);
        }

        // 3. Nothing to scale: the request is at or past zero capillary pressure
        if !below {
            let threshold = curve
                .zero_pc_saturation()
                .map_or(cell.swu, |sat| sat.min(cell.swu));
            if cell.swatinit >= threshold - tol.saturation {
                let pc = curve.evaluate_pc(cell.swat, 1.0);
                let derived = tol
                    .same_pressure(pc, pc_unscaled)
                    .then(|| DerivedCurveFields::unscaled(pc, max_pc));
                return (QcFlag::Swatinit1, derived);
            }
        }

        // 4. Water leg, as requested
        if tol.same_saturation(cell.swat, 1.0) && tol.same_saturation(cell.swatinit, 1.0) {
            return (QcFlag::Water, Some(DerivedCurveFields::unscaled(0.0, max_pc)));
        }

        // 5. Scale needed for SWATINIT is above what PPCWMAX allows
        if let (ScalingOutcome::Capped { capped, .. }, Some(ppcwmax)) = (
            resolver.resolve_capped(pc_unscaled, cell.swatinit, below),
            ppcwmax,
        ) {
            let derived = DerivedCurveFields {
                pc: curve.evaluate_pc(cell.swatinit, capped),
                ppcw: ppcwmax,
                pc_scaling: capped,
            };
            return (QcFlag::Ppcwmax, Some(derived));
        }

        // 6. Scaled to honour SWATINIT
        let derived = resolver
            .resolve(pc_unscaled, cell.swat, below)
            .scale()
            .map(|scale| DerivedCurveFields {
                pc: curve.evaluate_pc(cell.swatinit, scale),
                ppcw: scale * max_pc,
                pc_scaling: scale,
            });
        (QcFlag::PcScaled, derived)
    }
}

// ============================================================================
// Tests
// ============================================================================
