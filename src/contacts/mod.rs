//! Contact Geometry
//!
//! Fluid contact depths per equilibration region (EQLNUM) and the hydrostatic
//! relation that turns a cell's height above a contact into the unscaled
//! capillary pressure the simulator had to honour at initialisation.
//!
//! Depths are true vertical depth, positive downwards. Gradients are the
//! density difference times gravity, in pressure units per metre.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unscaled capillary pressure at `depth` for a contact at `contact_depth`.
///
/// Positive above the contact, zero at it and negative below it.
pub fn pc_at_depth(depth: f64, contact_depth: f64, gradient: f64) -> f64 {
    (contact_depth - depth) * gradient
}

/// Whether `depth` is at or below the contact, using the default contact
/// depth tolerance.
pub fn is_below_contact(depth: f64, contact_depth: f64) -> bool {
    is_below_contact_within(
        depth,
        contact_depth,
        crate::config::defaults::CONTACT_DEPTH_TOLERANCE,
    )
}

/// Whether `depth` is at or below the contact. Cell centres within `tol` of
/// the contact count as at it.
pub fn is_below_contact_within(depth: f64, contact_depth: f64, tol: f64) -> bool {
    depth > contact_depth - tol
}

// ============================================================================
// Equilibration Regions
// ============================================================================

/// The contact below which a cell is fully water saturated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "depth")]
pub enum WaterContact {
    /// Oil-water contact
    #[serde(rename = "OWC")]
    Owc(f64),
    /// Gas-water contact, for regions without an oil zone
    #[serde(rename = "GWC")]
    Gwc(f64),
}

impl WaterContact {
    /// Pick the water contact from optional OWC and GWC depths.
    pub fn from_depths(eqlnum: u32, owc: Option<f64>, gwc: Option<f64>) -> Result<Self, ContactError> {
        match (owc, gwc) {
            (Some(d), None) => Ok(Self::Owc(d)),
            (None, Some(d)) => Ok(Self::Gwc(d)),
            (None, None) => Err(ContactError::MissingWaterContact { eqlnum }),
            (Some(_), Some(_)) => Err(ContactError::AmbiguousWaterContact { eqlnum }),
        }
    }

    pub fn depth(&self) -> f64 {
        match *self {
            Self::Owc(d) | Self::Gwc(d) => d,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Owc(_) => "OWC",
            Self::Gwc(_) => "GWC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContactError {
    #[error("EQLNUM {eqlnum}: {name} depth is not finite")]
    NonFiniteDepth { eqlnum: u32, name: &'static str },

    #[error("EQLNUM {eqlnum}: {name} must be a finite non-negative gradient, got {value}")]
    InvalidGradient {
        eqlnum: u32,
        name: &'static str,
        value: f64,
    },

    #[error("EQLNUM {eqlnum}: GOC at {goc} m is below the water contact at {contact} m")]
    GocBelowContact { eqlnum: u32, goc: f64, contact: f64 },

    #[error("EQLNUM {eqlnum}: GOC given without a gas-water gradient")]
    MissingGasGradient { eqlnum: u32 },

    #[error("EQLNUM {eqlnum}: GOC given for a region with a gas-water contact")]
    GocWithGasWaterContact { eqlnum: u32 },

    #[error("EQLNUM {eqlnum}: neither OWC nor GWC given")]
    MissingWaterContact { eqlnum: u32 },

    #[error("EQLNUM {eqlnum}: both OWC and GWC given")]
    AmbiguousWaterContact { eqlnum: u32 },
}

/// Contacts and gradients for one EQLNUM region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquilibrationRegion {
    eqlnum: u32,
    water_contact: WaterContact,
    goc: Option<f64>,
    pc_gradient: f64,
    gas_pc_gradient: Option<f64>,
}

impl EquilibrationRegion {
    /// Region with a single water contact.
    pub fn new(
        eqlnum: u32,
        water_contact: WaterContact,
        pc_gradient: f64,
    ) -> Result<Self, ContactError> {
        Self::with_goc(eqlnum, water_contact, pc_gradient, None, None)
    }

    /// Region with an optional gas-oil contact above an oil-water contact.
    ///
    /// Above the GOC the pressure keeps accumulating with the gas-water
    /// gradient on top of the full oil column.
    pub fn with_goc(
        eqlnum: u32,
        water_contact: WaterContact,
        pc_gradient: f64,
        goc: Option<f64>,
        gas_pc_gradient: Option<f64>,
    ) -> Result<Self, ContactError> {
        let contact = water_contact.depth();
        if !contact.is_finite() {
            return Err(ContactError::NonFiniteDepth {
                eqlnum,
                name: water_contact.label(),
            });
        }
        check_gradient(eqlnum, "PC_GRADIENT", pc_gradient)?;

        if let Some(goc) = goc {
            if !goc.is_finite() {
                return Err(ContactError::NonFiniteDepth { eqlnum, name: "GOC" });
            }
            if matches!(water_contact, WaterContact::Gwc(_)) {
                return Err(ContactError::GocWithGasWaterContact { eqlnum });
            }
            if goc > contact {
                return Err(ContactError::GocBelowContact { eqlnum, goc, contact });
            }
            match gas_pc_gradient {
                Some(g) => check_gradient(eqlnum, "GAS_PC_GRADIENT", g)?,
                None => return Err(ContactError::MissingGasGradient { eqlnum }),
            }
        }

        Ok(Self {
            eqlnum,
            water_contact,
            goc,
            pc_gradient,
            gas_pc_gradient,
        })
    }

    pub fn eqlnum(&self) -> u32 {
        self.eqlnum
    }

    pub fn water_contact(&self) -> WaterContact {
        self.water_contact
    }

    /// Depth of the free water level for this region.
    pub fn contact_depth(&self) -> f64 {
        self.water_contact.depth()
    }

    pub fn goc(&self) -> Option<f64> {
        self.goc
    }

    pub fn pc_gradient(&self) -> f64 {
        self.pc_gradient
    }

    /// Unscaled in-place capillary pressure at `depth`.
    pub fn in_place_pc(&self, depth: f64) -> f64 {
        let contact = self.contact_depth();
        match (self.goc, self.gas_pc_gradient) {
            (Some(goc), Some(gas_gradient)) if depth < goc => {
                pc_at_depth(goc, contact, self.pc_gradient)
                    + pc_at_depth(depth, goc, gas_gradient)
            }
            _ => pc_at_depth(depth, contact, self.pc_gradient),
        }
    }

    /// Whether `depth` is at or below the water contact within `tol`.
    pub fn is_below_contact(&self, depth: f64, tol: f64) -> bool {
        is_below_contact_within(depth, self.contact_depth(), tol)
    }
}

fn check_gradient(eqlnum: u32, name: &'static str, value: f64) -> Result<(), ContactError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ContactError::InvalidGradient { eqlnum, name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pc_sign_around_contact() {
        assert!((pc_at_depth(1005.0, 1020.0, 0.04496) - 0.6744).abs() < 1e-9);
        assert_eq!(pc_at_depth(1020.0, 1020.0, 0.1), 0.0);
        assert!(pc_at_depth(1030.0, 1020.0, 0.1) < 0.0);
    }

    #[test]
    fn test_contact_tolerance() {
        assert!(is_below_contact(1020.0, 1020.0));
        assert!(is_below_contact(1019.99995, 1020.0));
        assert!(!is_below_contact(1019.99, 1020.0));
        assert!(is_below_contact_within(1019.99, 1020.0, 0.1));
    }

    #[test]
    fn test_goc_adds_gas_column() {
        let region =
            EquilibrationRegion::with_goc(1, WaterContact::Owc(1020.0), 0.02, Some(1000.0), Some(0.08))
                .unwrap();
        // Oil zone: plain OWC relation
        assert!((region.in_place_pc(1010.0) - 0.2).abs() < 1e-12);
        // Gas zone: 20 m oil column plus 10 m gas column
        assert!((region.in_place_pc(990.0) - (0.4 + 0.8)).abs() < 1e-12);
        let single = EquilibrationRegion::new(1, WaterContact::Owc(1020.0), 0.02).unwrap();
        assert!(region.in_place_pc(990.0) > single.in_place_pc(990.0));
    }

    #[test]
    fn test_rejects_goc_below_owc() {
        let err = EquilibrationRegion::with_goc(
            4,
            WaterContact::Owc(1000.0),
            0.02,
            Some(1010.0),
            Some(0.08),
        )
        .unwrap_err();
        assert!(matches!(err, ContactError::GocBelowContact { eqlnum: 4, .. }));
    }

    #[test]
    fn test_rejects_goc_without_gas_gradient() {
        let err = EquilibrationRegion::with_goc(2, WaterContact::Owc(1000.0), 0.02, Some(990.0), None)
            .unwrap_err();
        assert_eq!(err, ContactError::MissingGasGradient { eqlnum: 2 });
    }

    #[test]
    fn test_water_contact_from_depths() {
        assert_eq!(WaterContact::from_depths(1, Some(1020.0), None), Ok(WaterContact::Owc(1020.0)));
        assert_eq!(WaterContact::from_depths(1, None, Some(990.0)), Ok(WaterContact::Gwc(990.0)));
        assert_eq!(
            WaterContact::from_depths(3, None, None),
            Err(ContactError::MissingWaterContact { eqlnum: 3 })
        );
        assert!(WaterContact::from_depths(3, Some(1.0), Some(2.0)).is_err());
    }

    #[test]
    fn test_rejects_bad_gradient_and_depth() {
        assert!(matches!(
            EquilibrationRegion::new(1, WaterContact::Owc(1000.0), -0.1).unwrap_err(),
            ContactError::InvalidGradient { name: "PC_GRADIENT", .. }
        ));
        assert!(matches!(
            EquilibrationRegion::new(1, WaterContact::Gwc(f64::NAN), 0.1).unwrap_err(),
            ContactError::NonFiniteDepth { name: "GWC", .. }
        ));
        assert!(matches!(
            EquilibrationRegion::with_goc(1, WaterContact::Gwc(1000.0), 0.1, Some(900.0), Some(0.1))
                .unwrap_err(),
            ContactError::GocWithGasWaterContact { eqlnum: 1 }
        ));
    }
}
