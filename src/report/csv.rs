//! QC table export, one CSV row per cell.
//!
//! Missing values (SWLPC, PPCWMAX and the derived curve fields) are written
//! as empty fields.

use std::io::{self, Write};

use crate::types::QcRecord;

/// Column order of the exported QC table.
pub const QC_COLUMNS: [&str; 19] = [
    "INDEX",
    "X",
    "Y",
    "Z",
    "SATNUM",
    "EQLNUM",
    "SWATINIT",
    "SWAT",
    "SWL",
    "SWLPC",
    "SWU",
    "PORV",
    "QC_FLAG",
    "PC_UNSCALED",
    "PC",
    "PPCW",
    "PC_SCALING",
    "PPCWMAX",
    "WATER_VOLUME",
];

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn row(record: &QcRecord) -> [String; 19] {
    let c = &record.cell;
    [
        c.index.to_string(),
        c.x.to_string(),
        c.y.to_string(),
        c.z.to_string(),
        c.satnum.to_string(),
        c.eqlnum.to_string(),
        c.swatinit.to_string(),
        c.swat.to_string(),
        c.swl.to_string(),
        opt(c.swlpc),
        c.swu.to_string(),
        c.porv.to_string(),
        record.qc_flag.as_str().to_string(),
        record.pc_unscaled.to_string(),
        opt(record.pc()),
        opt(record.ppcw()),
        opt(record.pc_scaling()),
        opt(record.ppcwmax),
        record.water_volume().to_string(),
    ]
}

/// Write the header and one row per record.
pub fn write_qc_csv<'a, W, I>(writer: &mut W, records: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a QcRecord>,
{
    writeln!(writer, "{}", QC_COLUMNS.join(","))?;
    let mut rows = 0;
    for record in records {
        writeln!(writer, "{}", row(record).join(","))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}
