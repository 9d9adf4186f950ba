//! Volumetric Aggregation
//!
//! Signed water volume discrepancy `(SWAT - SWATINIT) * PORV` summed per QC
//! category. Positive volumes mean the model holds more water than the
//! engineer requested.
//!
//! Totals form a commutative monoid under [`CategoryTotals::merge`], so
//! partial sums over any partition of the cells combine to the same result.
//! The parallel reduction relies on that.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::types::{QcFlag, QcRecord};

/// Running sums for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub cells: usize,
    /// Σ (SWAT - SWATINIT) * PORV
    pub water_volume: f64,
    /// Σ SWATINIT * PORV
    pub requested_water_volume: f64,
    /// Σ PORV
    pub pore_volume: f64,
}

impl CategoryTotal {
    fn add(&mut self, record: &QcRecord) {
        self.cells += 1;
        self.water_volume += record.water_volume();
        self.requested_water_volume += record.cell.requested_water_volume();
        self.pore_volume += record.cell.porv;
    }

    fn merge(&mut self, other: &CategoryTotal) {
        self.cells += other.cells;
        self.water_volume += other.water_volume;
        self.requested_water_volume += other.requested_water_volume;
        self.pore_volume += other.pore_volume;
    }
}

/// Per-category totals. Categories without cells are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTotals(BTreeMap<QcFlag, CategoryTotal>);

impl CategoryTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequential reduction over `records`.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a QcRecord>,
    {
        let mut totals = Self::new();
        for record in records {
            totals.add(record);
        }
        totals
    }

    /// Parallel reduction over `records`.
    pub fn from_records_par(records: &[QcRecord]) -> Self {
        records
            .par_iter()
            .fold(Self::new, |mut acc, record| {
                acc.add(record);
                acc
            })
            .reduce(Self::new, |mut a, b| {
                a.merge(&b);
                a
            })
    }

    pub fn add(&mut self, record: &QcRecord) {
        self.0.entry(record.qc_flag).or_default().add(record);
    }

    pub fn merge(&mut self, other: &CategoryTotals) {
        for (flag, total) in &other.0 {
            self.0.entry(*flag).or_default().merge(total);
        }
    }

    pub fn get(&self, flag: QcFlag) -> Option<&CategoryTotal> {
        self.0.get(&flag)
    }

    /// Signed water volume for `flag`; zero when no cell has it.
    pub fn volume(&self, flag: QcFlag) -> f64 {
        self.get(flag).map_or(0.0, |t| t.water_volume)
    }

    pub fn cells(&self, flag: QcFlag) -> usize {
        self.get(flag).map_or(0, |t| t.cells)
    }

    pub fn total_volume(&self) -> f64 {
        self.0.values().map(|t| t.water_volume).sum()
    }

    pub fn total_cells(&self) -> usize {
        self.0.values().map(|t| t.cells).sum()
    }

    pub fn total_requested_volume(&self) -> f64 {
        self.0.values().map(|t| t.requested_water_volume).sum()
    }

    /// Water volume of `flag` as a percentage of all requested water.
    ///
    /// `None` when nothing was requested.
    pub fn percent_of_requested(&self, flag: QcFlag) -> Option<f64> {
        let requested = self.total_requested_volume();
        (requested > 0.0).then(|| 100.0 * self.volume(flag) / requested)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QcFlag, &CategoryTotal)> {
        self.0.iter().map(|(flag, total)| (*flag, total))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Category totals grouped by EQLNUM.
pub fn totals_by_region<'a, I>(records: I) -> BTreeMap<u32, CategoryTotals>
where
    I: IntoIterator<Item = &'a QcRecord>,
{
    let mut regions: BTreeMap<u32, CategoryTotals> = BTreeMap::new();
    for record in records {
        regions.entry(record.cell.eqlnum).or_default().add(record);
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellRecord;

    fn record(flag: QcFlag, swatinit: f64, swat: f64, porv: f64, eqlnum: u32) -> QcRecord {
        QcRecord {
            cell: CellRecord {
                index: 0,
                swatinit,
                swat,
                swl: 0.1,
                swlpc: None,
                swu: 1.0,
                porv,
                satnum: 1,
                eqlnum,
                x: 0.0,
                y: 0.0,
                z: 1000.0,
            },
            qc_flag: flag,
            derived: None,
            pc_unscaled: 0.0,
            ppcwmax: None,
        }
    }

    fn sample() -> Vec<QcRecord> {
        vec![
            record(QcFlag::SwlTrunc, 0.3, 0.5, 1000.0, 1),
            record(QcFlag::Swatinit1, 1.0, 0.1, 10.0, 1),
            record(QcFlag::Swatinit1, 1.0, 0.2, 10.0, 2),
            record(QcFlag::PcScaled, 0.4, 0.4, 50.0, 2),
        ]
    }

    #[test]
    fn test_totals_per_category() {
        let totals = CategoryTotals::from_records(&sample());
        assert_eq!(totals.cells(QcFlag::Swatinit1), 2);
        assert!((totals.volume(QcFlag::SwlTrunc) - 200.0).abs() < 1e-9);
        assert!((totals.volume(QcFlag::Swatinit1) - (-9.0 - 8.0)).abs() < 1e-9);
        assert_eq!(totals.volume(QcFlag::Water), 0.0);
        assert!(totals.get(QcFlag::Water).is_none());
    }

    #[test]
    fn test_totals_partition_cells() {
        let records = sample();
        let totals = CategoryTotals::from_records(&records);
        assert_eq!(totals.total_cells(), records.len());
        let direct: f64 = records.iter().map(|r| r.water_volume()).sum();
        assert!((totals.total_volume() - direct).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let records: Vec<QcRecord> = sample().into_iter().cycle().take(4000).collect();
        let seq = CategoryTotals::from_records(&records);
        let par = CategoryTotals::from_records_par(&records);
        for flag in QcFlag::ALL {
            assert_eq!(seq.cells(flag), par.cells(flag));
            assert!((seq.volume(flag) - par.volume(flag)).abs() < 1e-6, "{flag}");
        }
    }

    #[test]
    fn test_merge_is_additive() {
        let records = sample();
        let (left, right) = records.split_at(2);
        let mut merged = CategoryTotals::from_records(left);
        merged.merge(&CategoryTotals::from_records(right));
        assert_eq!(merged, CategoryTotals::from_records(&records));
    }

    #[test]
    fn test_percent_of_requested() {
        let totals = CategoryTotals::from_records(&sample());
        // requested = 300 + 10 + 10 + 20 = 340
        let pct = totals.percent_of_requested(QcFlag::SwlTrunc).unwrap();
        assert!((pct - 100.0 * 200.0 / 340.0).abs() < 1e-9);
        assert!(CategoryTotals::new().percent_of_requested(QcFlag::Water).is_none());
    }

    #[test]
    fn test_by_region() {
        let regions = totals_by_region(&sample());
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[&1].total_cells(), 2);
        assert_eq!(regions[&2].cells(QcFlag::PcScaled), 1);
    }
}
