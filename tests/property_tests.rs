//! Property Tests
//!
//! Invariants that must hold for every cell of a model, checked over a
//! deterministic sweep of saturations, depths and curve shapes.

use swatinit_qc::config::QcConfig;
use swatinit_qc::contacts::{EquilibrationRegion, WaterContact};
use swatinit_qc::curves::{CapillaryCurveTable, EndpointScaledCurve};
use swatinit_qc::{CellRecord, GridFrame, QcEngine, QcFlag};

/// SWAT agrees with SWATINIT to about the precision a restart file carries.
const SWAT_PRECISION: f64 = 1e-3;

fn tables() -> Vec<CapillaryCurveTable> {
    vec![
        CapillaryCurveTable::from_points(1, &[(0.0, 3.0), (1.0, 0.0)], Some(3.01)).unwrap(),
        CapillaryCurveTable::from_points(
            2,
            &[(0.12, 9.0), (0.2, 4.0), (0.35, 1.5), (0.6, 0.4), (0.85, 0.0), (1.0, 0.0)],
            None,
        )
        .unwrap(),
        // Oil-wet tail
        CapillaryCurveTable::from_points(3, &[(0.15, 5.0), (0.5, 0.8), (0.7, 0.0), (1.0, -2.0)], Some(8.0))
            .unwrap(),
    ]
}

fn regions() -> Vec<EquilibrationRegion> {
    vec![
        EquilibrationRegion::new(1, WaterContact::Owc(1050.0), 0.0196).unwrap(),
        EquilibrationRegion::with_goc(2, WaterContact::Owc(1100.0), 0.03, Some(1000.0), Some(0.09))
            .unwrap(),
    ]
}

/// Cells spread over saturations, depths and both regions, including cells
/// the simulator could not honour.
fn sweep() -> Vec<CellRecord> {
    let mut cells = Vec::new();
    for satnum in 1..=3u32 {
        for eqlnum in 1..=2u32 {
            for i in 0..=10 {
                for j in 0..=10 {
                    for k in 0..6 {
                        let swl = [0.0, 0.12, 0.15][satnum as usize - 1];
                        let swatinit = f64::from(i) / 10.0;
                        let swat = swl + (1.0 - swl) * f64::from(j) / 10.0;
                        cells.push(CellRecord {
                            index: cells.len(),
                            swatinit,
                            swat,
                            swl,
                            swlpc: (k % 3 == 0).then_some(swl + 0.05),
                            swu: 1.0,
                            porv: 10.0 + f64::from(k),
                            satnum,
                            eqlnum,
                            x: f64::from(i),
                            y: f64::from(j),
                            z: 900.0 + 40.0 * f64::from(k),
                        });
                    }
                }
            }
        }
    }
    cells
}

fn frame() -> GridFrame {
    GridFrame::new(sweep(), tables(), regions()).unwrap()
}

#[test]
fn derived_fields_are_finite_when_present() {
    let outcome = QcEngine::new(&QcConfig::default()).run(&frame()).unwrap();
    for record in &outcome.records {
        if let Some(d) = record.derived {
            assert!(
                d.pc.is_finite() && d.ppcw.is_finite() && d.pc_scaling.is_finite(),
                "non-finite fields for cell {}: {d:?}",
                record.cell.index
            );
            assert!(d.pc_scaling > 0.0, "cell {}: {d:?}", record.cell.index);
        }
        assert_eq!(record.pc().is_some(), record.pc_scaling().is_some());
        assert_eq!(record.ppcw().is_some(), record.pc_scaling().is_some());
    }
}

#[test]
fn truncated_cells_have_no_fields() {
    let outcome = QcEngine::new(&QcConfig::default()).run(&frame()).unwrap();
    assert!(outcome.with_flag(QcFlag::SwlTrunc).count() > 0);
    assert!(outcome.with_flag(QcFlag::SwlTrunc).all(|r| r.derived.is_none()));
}

#[test]
fn totals_partition_the_cells() {
    let frame = frame();
    let outcome = QcEngine::new(&QcConfig::default()).run(&frame).unwrap();
    let totals = &outcome.totals;
    assert_eq!(totals.total_cells(), frame.len());

    let direct: f64 = frame.cells().iter().map(CellRecord::water_volume_change).sum();
    assert!(
        (totals.total_volume() - direct).abs() < 1e-6 * direct.abs().max(1.0),
        "totals {} vs direct {direct}",
        totals.total_volume()
    );

    let per_flag: usize = QcFlag::ALL.iter().map(|&f| totals.cells(f)).sum();
    assert_eq!(per_flag, frame.len());
}

#[test]
fn parallel_run_is_deterministic() {
    let frame = frame();
    let mut config = QcConfig::default();
    let a = QcEngine::new(&config).run(&frame).unwrap();
    config.engine.parallel = false;
    let b = QcEngine::new(&config).run(&frame).unwrap();
    assert_eq!(a.records, b.records);
    for flag in QcFlag::ALL {
        assert_eq!(a.totals.cells(flag), b.totals.cells(flag));
    }
}

#[test]
fn inversion_round_trips_inside_domain() {
    for table in tables() {
        let (lo, hi) = table.saturation_range();
        for &(floor, swu) in &[(lo, hi), (lo + 0.05, hi), (lo + 0.02, hi - 0.1)] {
            let curve = EndpointScaledCurve::new(&table, floor, swu);
            for &scale in &[0.05, 0.5, 1.0, 2.5, 40.0] {
                for i in 1..50 {
                    let sw = floor + (swu - floor) * f64::from(i) / 50.0;
                    let pc = curve.evaluate_pc(sw, scale);
                    let back = curve.evaluate_sw(pc, scale);
                    // Flat zero-pressure segments resolve to their wet end
                    let expected = if table.pressures().iter().filter(|&&p| p == 0.0).count() > 1
                        && pc == 0.0
                    {
                        back
                    } else {
                        sw
                    };
                    assert!(
                        (back - expected).abs() < 1e-9,
                        "SATNUM {} floor {floor} scale {scale}: sw {sw} -> pc {pc} -> {back}",
                        table.satnum()
                    );
                }
            }
        }
    }
}

/// Water-wet cells above their contacts, with SWAT set the way Eclipse
/// initialises it: truncated up to SWL, solved on the unscaled curve when
/// SWATINIT is at zero Pc, solved on the capped curve when PPCWMAX limits
/// the scaling, and equal to SWATINIT otherwise.
fn initialised_sweep(tables: &[CapillaryCurveTable], regions: &[EquilibrationRegion]) -> Vec<CellRecord> {
    let mut cells = Vec::new();
    for table in &tables[..2] {
        let swl = table.saturation_range().0;
        for region in regions {
            for i in 0..=20 {
                for k in 0..15 {
                    let swatinit = f64::from(i) / 20.0;
                    let z = 900.0 + 10.0 * f64::from(k);
                    let curve = EndpointScaledCurve::new(table, swl, 1.0);
                    let pc = region.in_place_pc(z);
                    let zero_pc = curve.zero_pc_saturation().unwrap_or(1.0);
                    let swat = if swatinit < swl {
                        swl
                    } else if swatinit >= zero_pc {
                        curve.evaluate_sw(pc, 1.0)
                    } else {
                        let needed = pc / curve.evaluate_pc(swatinit, 1.0);
                        match table.ppcwmax() {
                            Some(ppcwmax) if needed * curve.max_pc() > ppcwmax => {
                                curve.evaluate_sw(pc, ppcwmax / curve.max_pc())
                            }
                            _ => swatinit,
                        }
                    };
                    cells.push(CellRecord {
                        index: cells.len(),
                        swatinit,
                        swat,
                        swl,
                        swlpc: None,
                        swu: 1.0,
                        porv: 10.0,
                        satnum: table.satnum(),
                        eqlnum: region.eqlnum(),
                        x: f64::from(i),
                        y: 0.0,
                        z,
                    });
                }
            }
        }
    }
    cells
}

#[test]
fn scaled_cells_honour_swatinit() {
    let (tables, regions) = (tables(), regions());
    let cells = initialised_sweep(&tables, &regions);
    let frame = GridFrame::new(cells, tables, regions).unwrap();
    let outcome = QcEngine::new(&QcConfig::default()).run(&frame).unwrap();

    assert!(outcome.with_flag(QcFlag::PcScaled).count() > 0);
    assert!(outcome.with_flag(QcFlag::Ppcwmax).count() > 0);
    assert!(outcome.with_flag(QcFlag::SwlTrunc).count() > 0);
    assert_eq!(outcome.with_flag(QcFlag::HcBelowFwl).count(), 0);

    for record in outcome.with_flag(QcFlag::PcScaled) {
        assert!(record.derived.is_some(), "cell {} has no scaling", record.cell.index);
        assert!(
            (record.cell.swat - record.cell.swatinit).abs() < SWAT_PRECISION,
            "cell {}: SWAT {} vs SWATINIT {}",
            record.cell.index,
            record.cell.swat,
            record.cell.swatinit
        );
    }
}
