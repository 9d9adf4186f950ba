//! Scaling Resolver
//!
//! Infers the vertical capillary pressure scale factor the simulator must
//! have applied to one cell's curve so that the curve passes through the
//! hydrostatic in-place pressure at a given saturation:
//!
//! ```text
//! s = pc_unscaled / curve.evaluate_pc(saturation, 1.0)
//! ```
//!
//! When no meaningful scale exists the resolver returns a sentinel rather
//! than an error. Those cells still get a category; only their derived
//! curve fields stay empty.

use serde::{Deserialize, Serialize};

use crate::config::Tolerances;
use crate::curves::EndpointScaledCurve;

/// Result of resolving a scale factor for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScalingOutcome {
    /// Positive finite scale that reproduces the in-place pressure
    Resolved { scale: f64 },
    /// The requested scale pushed the endpoint past PPCWMAX
    Capped { requested: f64, capped: f64 },
    /// Saturation at zero curve pressure, zero or non-finite pressure, or a
    /// non-positive ratio
    Undefined,
    /// Cell at or below the contact; no scaling is implied
    NotApplicable,
}

impl ScalingOutcome {
    /// Scale factor actually in effect, if any.
    pub fn scale(&self) -> Option<f64> {
        match *self {
            Self::Resolved { scale } => Some(scale),
            Self::Capped { capped, .. } => Some(capped),
            Self::Undefined | Self::NotApplicable => None,
        }
    }

    pub fn is_capped(&self) -> bool {
        matches!(self, Self::Capped { .. })
    }
}

/// Scale resolution against one cell's endpoint-scaled curve.
#[derive(Debug, Clone, Copy)]
pub struct ScalingResolver<'c, 'a> {
    curve: &'c EndpointScaledCurve<'a>,
    tolerances: Tolerances,
    ppcwmax: Option<f64>,
}

impl<'c, 'a> ScalingResolver<'c, 'a> {
    pub fn new(curve: &'c EndpointScaledCurve<'a>, tolerances: Tolerances) -> Self {
        Self {
            curve,
            tolerances,
            ppcwmax: None,
        }
    }

    /// Ceiling on the scaled endpoint pressure. `None` disables capping.
    pub fn with_ppcwmax(mut self, ppcwmax: Option<f64>) -> Self {
        self.ppcwmax = ppcwmax;
        self
    }

    /// Largest scale the cap allows, `ppcwmax / max_pc`.
    pub fn cap(&self) -> Option<f64> {
        let max_pc = self.curve.max_pc();
        match self.ppcwmax {
            Some(ppcwmax) if max_pc > 0.0 => Some(ppcwmax / max_pc),
            _ => None,
        }
    }

    /// Scale implied at `saturation`, ignoring any cap.
    pub fn resolve(&self, pc_unscaled: f64, saturation: f64, below_contact: bool) -> ScalingOutcome {
        if below_contact {
            return ScalingOutcome::NotApplicable;
        }
        if let Some(zero_sat) = self.curve.zero_pc_saturation() {
            if self.tolerances.same_saturation(saturation, zero_sat) {
                return ScalingOutcome::Undefined;
            }
        }

        let curve_pc = self.curve.evaluate_pc(saturation, 1.0);
        if !pc_unscaled.is_finite() || !curve_pc.is_finite() || pc_unscaled == 0.0 || curve_pc == 0.0 {
            return ScalingOutcome::Undefined;
        }

        let scale = pc_unscaled / curve_pc;
        if scale.is_finite() && scale > 0.0 {
            ScalingOutcome::Resolved { scale }
        } else {
            ScalingOutcome::Undefined
        }
    }

    /// Scale implied at `saturation`, capped where the endpoint would exceed
    /// PPCWMAX by more than the pressure tolerance.
    pub fn resolve_capped(
        &self,
        pc_unscaled: f64,
        saturation: f64,
        below_contact: bool,
    ) -> ScalingOutcome {
        let outcome = self.resolve(pc_unscaled, saturation, below_contact);
        let (ScalingOutcome::Resolved { scale }, Some(ppcwmax), Some(cap)) =
            (outcome, self.ppcwmax, self.cap())
        else {
            return outcome;
        };

        if scale * self.curve.max_pc() > ppcwmax + self.tolerances.pressure {
            ScalingOutcome::Capped {
                requested: scale,
                capped: cap,
            }
        } else {
            outcome
        }
    }
}
