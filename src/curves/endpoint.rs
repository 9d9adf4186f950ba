//! Two-point horizontal endpoint scaling.
//!
//! A cell's own connate and maximum water saturation stretch the table's
//! saturation axis so that the table's first point lands on the cell's
//! floor and its last point on the cell's SWU. Pressures are not touched
//! here; vertical scaling is the `scale` argument.

use super::CapillaryCurveTable;

/// A curve table viewed through one cell's saturation endpoints.
#[derive(Debug, Clone, Copy)]
pub struct EndpointScaledCurve<'a> {
    table: &'a CapillaryCurveTable,
    floor: f64,
    swu: f64,
}

impl<'a> EndpointScaledCurve<'a> {
    /// `floor` is the truncation floor (SWL, or SWLPC when honoured) and
    /// `swu` the maximum water saturation. A degenerate interval
    /// (`swu <= floor` or non-finite endpoints) falls back to the table's
    /// own saturation axis.
    pub fn new(table: &'a CapillaryCurveTable, floor: f64, swu: f64) -> Self {
        Self { table, floor, swu }
    }

    pub fn table(&self) -> &'a CapillaryCurveTable {
        self.table
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn swu(&self) -> f64 {
        self.swu
    }

    pub fn max_pc(&self) -> f64 {
        self.table.max_pc()
    }

    pub fn ppcwmax(&self) -> Option<f64> {
        self.table.ppcwmax()
    }

    /// Capillary pressure at a cell saturation, times `scale`.
    pub fn evaluate_pc(&self, saturation: f64, scale: f64) -> f64 {
        self.table.evaluate_pc(self.to_table(saturation), scale)
    }

    /// Cell saturation at which the scaled curve reaches `pressure`.
    pub fn evaluate_sw(&self, pressure: f64, scale: f64) -> f64 {
        let sw = self.table.evaluate_sw(pressure, scale);
        if sw.is_nan() {
            return sw;
        }
        self.to_cell(sw)
    }

    /// Lowest cell saturation with zero unscaled capillary pressure.
    pub fn zero_pc_saturation(&self) -> Option<f64> {
        self.table.zero_pc_saturation().map(|sw| self.to_cell(sw))
    }

    /// Whether `saturation` lies on the cell's curve domain, within `tol`.
    pub fn contains(&self, saturation: f64, tol: f64) -> bool {
        let (lo, hi) = self.domain();
        saturation >= lo - tol && saturation <= hi + tol
    }

    /// Cell saturation interval covered by the curve.
    pub fn domain(&self) -> (f64, f64) {
        if self.is_degenerate() {
            self.table.saturation_range()
        } else {
            (self.floor, self.swu)
        }
    }

    fn is_degenerate(&self) -> bool {
        !(self.floor.is_finite() && self.swu.is_finite() && self.swu > self.floor)
    }

    fn to_table(&self, sw: f64) -> f64 {
        if self.is_degenerate() {
            return sw;
        }
        let (lo, hi) = self.table.saturation_range();
        lo + (sw - self.floor) / (self.swu - self.floor) * (hi - lo)
    }

    fn to_cell(&self, sw: f64) -> f64 {
        if self.is_degenerate() {
            return sw;
        }
        let (lo, hi) = self.table.saturation_range();
        self.floor + (sw - lo) / (hi - lo) * (self.swu - self.floor)
    }
}
