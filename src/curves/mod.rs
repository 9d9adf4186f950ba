//! Capillary Pressure Curves
//!
//! Tabulated water-oil (or gas-water) capillary pressure as a function of
//! water saturation, one table per saturation function region (SATNUM).
//!
//! - [`CapillaryCurveTable`] - validated control points with piecewise-linear
//!   evaluation and inversion, optionally scaled vertically
//! - [`EndpointScaledCurve`] - the table stretched horizontally onto one
//!   cell's connate-to-maximum saturation interval
//!
//! Pressures are non-increasing with saturation. At the low-saturation end
//! the curve holds its maximum (`max_pc`); towards full water saturation it
//! decreases to zero, or below zero for oil-wet rock.

mod endpoint;

pub use endpoint::EndpointScaledCurve;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// What is wrong with a capillary pressure table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveDefect {
    #[error("need at least 2 control points, got {0}")]
    TooFewPoints(usize),

    #[error("saturation and pressure columns differ in length ({sw} vs {pc})")]
    LengthMismatch { sw: usize, pc: usize },

    #[error("non-finite value at row {0}")]
    NonFinite(usize),

    #[error("saturation not strictly increasing at row {row} ({prev} -> {next})")]
    SaturationNotIncreasing { row: usize, prev: f64, next: f64 },

    #[error("capillary pressure increases with saturation at row {row} ({prev} -> {next})")]
    PressureNotMonotonic { row: usize, prev: f64, next: f64 },

    #[error("PPCWMAX must be a positive finite pressure, got {0}")]
    InvalidPpcwmax(f64),
}

/// A malformed saturation function region. Fatal before classification.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid capillary pressure curve for SATNUM {satnum}: {defect}")]
pub struct InvalidCurveError {
    pub satnum: u32,
    pub defect: CurveDefect,
}

// ============================================================================
// Curve Table
// ============================================================================

/// Capillary pressure table for one SATNUM region.
///
/// Immutable once built; construction enforces at least two finite control
/// points, strictly increasing saturation and non-increasing pressure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapillaryCurveTable {
    satnum: u32,
    sw: Vec<f64>,
    pc: Vec<f64>,
    ppcwmax: Option<f64>,
}

impl CapillaryCurveTable {
    /// Build a table from its saturation and pressure columns.
    pub fn new(
        satnum: u32,
        sw: Vec<f64>,
        pc: Vec<f64>,
        ppcwmax: Option<f64>,
    ) -> Result<Self, InvalidCurveError> {
        let fail = |defect| InvalidCurveError { satnum, defect };

        if sw.len() != pc.len() {
            return Err(fail(CurveDefect::LengthMismatch { sw: sw.len(), pc: pc.len() }));
        }
        if sw.len() < 2 {
            return Err(fail(CurveDefect::TooFewPoints(sw.len())));
        }
        if let Some(row) = sw
            .iter()
            .zip(&pc)
            .position(|(s, p)| !s.is_finite() || !p.is_finite())
        {
            return Err(fail(CurveDefect::NonFinite(row)));
        }
        for row in 1..sw.len() {
            if sw[row] <= sw[row - 1] {
                return Err(fail(CurveDefect::SaturationNotIncreasing {
                    row,
                    prev: sw[row - 1],
                    next: sw[row],
                }));
            }
            if pc[row] > pc[row - 1] {
                return Err(fail(CurveDefect::PressureNotMonotonic {
                    row,
                    prev: pc[row - 1],
                    next: pc[row],
                }));
            }
        }
        if let Some(cap) = ppcwmax {
            if !cap.is_finite() || cap <= 0.0 {
                return Err(fail(CurveDefect::InvalidPpcwmax(cap)));
            }
        }

        Ok(Self { satnum, sw, pc, ppcwmax })
    }

    /// Build a table from (saturation, pressure) pairs.
    pub fn from_points(
        satnum: u32,
        points: &[(f64, f64)],
        ppcwmax: Option<f64>,
    ) -> Result<Self, InvalidCurveError> {
        let (sw, pc) = points.iter().copied().unzip();
        Self::new(satnum, sw, pc, ppcwmax)
    }

    pub fn satnum(&self) -> u32 {
        self.satnum
    }

    pub fn saturations(&self) -> &[f64] {
        &self.sw
    }

    pub fn pressures(&self) -> &[f64] {
        &self.pc
    }

    /// External ceiling on the scaled endpoint pressure, if any.
    pub fn ppcwmax(&self) -> Option<f64> {
        self.ppcwmax
    }

    /// Curve value at the lowest saturation.
    pub fn max_pc(&self) -> f64 {
        self.pc[0]
    }

    /// Curve value at the highest saturation.
    pub fn min_pc(&self) -> f64 {
        self.pc[self.pc.len() - 1]
    }

    /// Lowest and highest tabulated saturation.
    pub fn saturation_range(&self) -> (f64, f64) {
        (self.sw[0], self.sw[self.sw.len() - 1])
    }

    /// Capillary pressure at `saturation`, multiplied by `scale`.
    ///
    /// Saturations outside the table clamp to the endpoint pressures.
    pub fn evaluate_pc(&self, saturation: f64, scale: f64) -> f64 {
        scale * self.interpolate_pc(saturation)
    }

    /// Saturation at which the `scale`-adjusted curve reaches `pressure`.
    ///
    /// Pressures above the curve clamp to the lowest saturation, pressures
    /// below it to the highest. On a flat segment the low-saturation end is
    /// returned for positive pressure and the high-saturation end for zero or
    /// negative pressure. A non-positive or non-finite `scale` gives NaN.
    pub fn evaluate_sw(&self, pressure: f64, scale: f64) -> f64 {
        if !(scale.is_finite() && scale > 0.0) || pressure.is_nan() {
            return f64::NAN;
        }
        self.invert(pressure / scale)
    }

    /// Lowest saturation at which the unscaled curve reaches zero pressure.
    ///
    /// `None` when the curve stays positive up to its last point, as for a
    /// curve with a capillary entry pressure.
    pub fn zero_pc_saturation(&self) -> Option<f64> {
        let i = self.pc.partition_point(|&p| p > 0.0);
        match i {
            0 => Some(self.sw[0]),
            i if i == self.pc.len() => None,
            i => Some(self.crossing(i - 1, 0.0)),
        }
    }

    fn interpolate_pc(&self, sw: f64) -> f64 {
        if sw.is_nan() {
            return f64::NAN;
        }
        let last = self.sw.len() - 1;
        if sw <= self.sw[0] {
            return self.pc[0];
        }
        if sw >= self.sw[last] {
            return self.pc[last];
        }
        // First row with a saturation above sw; 1..=last here
        let i = self.sw.partition_point(|&s| s <= sw);
        let (s0, s1) = (self.sw[i - 1], self.sw[i]);
        let (p0, p1) = (self.pc[i - 1], self.pc[i]);
        p0 + (p1 - p0) * (sw - s0) / (s1 - s0)
    }

    fn invert(&self, p: f64) -> f64 {
        if p > 0.0 {
            self.invert_towards_oil(p)
        } else {
            self.invert_towards_water(p)
        }
    }

    /// Lowest saturation where the curve has dropped to `p`.
    fn invert_towards_oil(&self, p: f64) -> f64 {
        let i = self.pc.partition_point(|&v| v > p);
        if i == 0 {
            return self.sw[0];
        }
        if i == self.pc.len() {
            return self.sw[i - 1];
        }
        self.crossing(i - 1, p)
    }

    /// Highest saturation where the curve is still at or above `p`.
    fn invert_towards_water(&self, p: f64) -> f64 {
        let k = self.pc.partition_point(|&v| v >= p);
        if k == 0 {
            return self.sw[0];
        }
        if k == self.pc.len() {
            return self.sw[k - 1];
        }
        self.crossing(k - 1, p)
    }

    /// Saturation where segment `row..row + 1` passes through pressure `p`.
    fn crossing(&self, row: usize, p: f64) -> f64 {
        let (s0, s1) = (self.sw[row], self.sw[row + 1]);
        let (p0, p1) = (self.pc[row], self.pc[row + 1]);
        if (p1 - p0).abs() < f64::MIN_POSITIVE {
            return s0;
        }
        s0 + (p - p0) * (s1 - s0) / (p1 - p0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(swl: f64, max_pc: f64) -> CapillaryCurveTable {
        CapillaryCurveTable::from_points(1, &[(swl, max_pc), (1.0, 0.0)], None).unwrap()
    }

    #[test]
    fn test_evaluate_linear_curve() {
        let curve = linear(0.0, 3.0);
        assert!((curve.evaluate_pc(0.5, 1.0) - 1.5).abs() < 1e-12);
        assert!((curve.evaluate_pc(0.5, 0.5) - 0.75).abs() < 1e-12);
        assert_eq!(curve.max_pc(), 3.0);
        assert_eq!(curve.min_pc(), 0.0);
    }

    #[test]
    fn test_evaluate_clamps_outside_domain() {
        let curve = linear(0.1, 3.0);
        assert_eq!(curve.evaluate_pc(0.0, 1.0), 3.0);
        assert_eq!(curve.evaluate_pc(1.2, 1.0), 0.0);
        assert_eq!(curve.evaluate_pc(-5.0, 2.0), 6.0);
    }

    #[test]
    fn test_invert_linear_curve() {
        let curve = linear(0.0, 3.0);
        assert!((curve.evaluate_sw(1.5, 1.0) - 0.5).abs() < 1e-12);
        // 3.01 * (1 - sw) = 1.96
        let sw = curve.evaluate_sw(1.96, 3.01 / 3.0);
        assert!((sw - (1.0 - 1.96 / 3.01)).abs() < 1e-12);
    }

    #[test]
    fn test_invert_clamps_outside_range() {
        let curve = linear(0.1, 3.0);
        assert_eq!(curve.evaluate_sw(10.0, 1.0), 0.1);
        assert_eq!(curve.evaluate_sw(-1.0, 1.0), 1.0);
    }

    #[test]
    fn test_invert_rejects_bad_scale() {
        let curve = linear(0.1, 3.0);
        assert!(curve.evaluate_sw(1.0, 0.0).is_nan());
        assert!(curve.evaluate_sw(1.0, -2.0).is_nan());
        assert!(curve.evaluate_sw(1.0, f64::INFINITY).is_nan());
    }

    #[test]
    fn test_flat_segment_picks_expected_end() {
        // Entry plateau at 0.5 bar between 0.3 and 0.6, zero plateau from 0.8
        let curve = CapillaryCurveTable::from_points(
            1,
            &[(0.1, 2.0), (0.3, 0.5), (0.6, 0.5), (0.8, 0.0), (1.0, 0.0)],
            None,
        )
        .unwrap();
        assert_eq!(curve.evaluate_sw(0.5, 1.0), 0.3);
        assert_eq!(curve.evaluate_sw(0.0, 1.0), 1.0);
        assert_eq!(curve.evaluate_sw(1.0, 2.0), 0.3);
    }

    #[test]
    fn test_oil_wet_curve_inverts_negative_pressure() {
        let curve = linear_oil_wet();
        // 3 - 6 * (sw - 0.1) / 0.9 = -1
        let sw = curve.evaluate_sw(-1.0, 1.0);
        assert!((sw - (0.1 + 0.9 * 4.0 / 6.0)).abs() < 1e-12);
    }

    fn linear_oil_wet() -> CapillaryCurveTable {
        CapillaryCurveTable::from_points(1, &[(0.1, 3.0), (1.0, -3.0)], None).unwrap()
    }

    #[test]
    fn test_zero_pc_saturation() {
        assert_eq!(linear(0.1, 3.0).zero_pc_saturation(), Some(1.0));
        let crossing = linear_oil_wet().zero_pc_saturation().unwrap();
        assert!((crossing - 0.55).abs() < 1e-12);
        let entry = CapillaryCurveTable::from_points(1, &[(0.1, 3.0), (1.0, 0.37)], None).unwrap();
        assert_eq!(entry.zero_pc_saturation(), None);
    }

    #[test]
    fn test_roundtrip_inside_domain() {
        let curve = CapillaryCurveTable::from_points(
            7,
            &[(0.15, 8.0), (0.3, 2.5), (0.5, 0.9), (0.8, 0.2), (1.0, 0.0)],
            None,
        )
        .unwrap();
        for &scale in &[0.1, 0.4496, 1.0, 3.7] {
            for i in 1..40 {
                let sw = 0.15 + 0.85 * f64::from(i) / 40.0;
                let back = curve.evaluate_sw(curve.evaluate_pc(sw, scale), scale);
                assert!((back - sw).abs() < 1e-9, "sw={sw} scale={scale} back={back}");
            }
        }
    }

    #[test]
    fn test_rejects_unsorted_saturation() {
        let err = CapillaryCurveTable::from_points(3, &[(0.5, 1.0), (0.4, 0.0)], None).unwrap_err();
        assert_eq!(err.satnum, 3);
        assert!(matches!(err.defect, CurveDefect::SaturationNotIncreasing { row: 1, .. }));
    }

    #[test]
    fn test_rejects_increasing_pressure() {
        let err = CapillaryCurveTable::from_points(
            2,
            &[(0.1, 3.0), (0.5, 1.0), (1.0, 1.5)],
            None,
        )
        .unwrap_err();
        assert!(matches!(err.defect, CurveDefect::PressureNotMonotonic { row: 2, .. }));
        assert!(err.to_string().contains("SATNUM 2"));
    }

    #[test]
    fn test_rejects_degenerate_tables() {
        assert!(matches!(
            CapillaryCurveTable::from_points(1, &[(0.1, 3.0)], None).unwrap_err().defect,
            CurveDefect::TooFewPoints(1)
        ));
        assert!(matches!(
            CapillaryCurveTable::new(1, vec![0.1, 1.0], vec![3.0], None).unwrap_err().defect,
            CurveDefect::LengthMismatch { sw: 2, pc: 1 }
        ));
        assert!(matches!(
            CapillaryCurveTable::from_points(1, &[(0.1, f64::NAN), (1.0, 0.0)], None)
                .unwrap_err()
                .defect,
            CurveDefect::NonFinite(0)
        ));
        assert!(matches!(
            CapillaryCurveTable::from_points(1, &[(0.1, 3.0), (1.0, 0.0)], Some(0.0))
                .unwrap_err()
                .defect,
            CurveDefect::InvalidPpcwmax(_)
        ));
    }
}
