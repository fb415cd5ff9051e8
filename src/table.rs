use std::{collections::BTreeSet, fs::File, io, path::Path};

use anyhow::{bail, Context, Result};
use liboffload::CellRecord;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::bounds::Bounds;

const REQUIRED_COLUMNS: [(&str, &str); 4] = [
    ("name", "小区名称"),
    ("longitude", "经度"),
    ("latitude", "纬度"),
    ("azimuth", "方位角"),
];

/// A raw table row under either the English or the Chinese headers; numbers
/// are parsed afterwards so that a bad value drops the row instead of failing the file
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(alias = "小区名称")]
    name: String,
    #[serde(alias = "经度")]
    longitude: String,
    #[serde(alias = "纬度")]
    latitude: String,
    #[serde(alias = "方位角")]
    azimuth: String,
}

impl Row {
    fn parse(self) -> Option<CellRecord> {
        let number = |s: &str| s.parse::<f64>().ok().filter(|v| v.is_finite());
        Some(CellRecord {
            longitude: number(&self.longitude)?,
            latitude: number(&self.latitude)?,
            azimuth: number(&self.azimuth)?,
            name: self.name,
        })
    }
}

#[derive(Debug, Default)]
pub struct Table {
    pub cells: Vec<CellRecord>,
    pub invalid: usize,
    pub out_of_bounds: usize,
}

pub fn load(path: &Path, bounds: &Bounds) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read(file, bounds).with_context(|| format!("Failed to load {}", path.display()))
}

pub fn read<R: io::Read>(reader: R, bounds: &Bounds) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|(en, zh)| !headers.iter().any(|h| h == *en || h == *zh))
        .map(|(en, _)| *en)
        .collect();
    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }
    let headers = reader.byte_headers()?.clone();

    let mut table = Table::default();
    for record in reader.byte_records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        // short rows and text that is not UTF-8 fail here
        let row: Row = match record.deserialize(Some(&headers)) {
            Ok(x) => x,
            Err(e) => {
                debug!("line {line}: {e}");
                table.invalid += 1;
                continue;
            }
        };
        let Some(cell) = row.parse() else {
            table.invalid += 1;
            continue;
        };
        if !bounds.contains(&cell) {
            table.out_of_bounds += 1;
            continue;
        }
        if cell.name.is_empty() {
            bail!("cell name is empty on line {line}");
        }
        table.cells.push(cell);
    }

    if table.invalid > 0 {
        warn!("dropped {} rows with missing or non-numeric values", table.invalid);
    }
    if table.out_of_bounds > 0 {
        warn!("dropped {} rows outside the configured bounds", table.out_of_bounds);
    }
    if table.cells.is_empty() {
        bail!("no usable rows");
    }

    let mut seen = BTreeSet::new();
    let duplicates = table
        .cells
        .iter()
        .filter(|c| !seen.insert(c.name.as_str()))
        .count();
    if duplicates > 0 {
        warn!("{duplicates} rows repeat an earlier cell name");
    }

    Ok(table)
}

pub fn check(path: &Path, bounds: &Bounds) -> Result<()> {
    let table = load(path, bounds)?;
    info!(
        "{}: {} usable rows, {} invalid, {} out of bounds",
        path.display(),
        table.cells.len(),
        table.invalid,
        table.out_of_bounds
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(data: &str) -> Result<Table> {
        read(data.as_bytes(), &Bounds::default())
    }

    #[test]
    fn english_headers() {
        let table = read_str(
            "name,longitude,latitude,azimuth,vendor\n\
             L1,114.0,30.0,120,huawei\n\
             L2, 114.1 ,30.1,240,zte\n",
        )
        .unwrap();
        assert_eq!(
            table.cells,
            vec![
                CellRecord::new("L1", 114.0, 30.0, 120.0),
                CellRecord::new("L2", 114.1, 30.1, 240.0),
            ]
        );
    }

    #[test]
    fn chinese_headers() {
        let table = read_str(" 小区名称 ,经度,纬度,方位角\n南宁-1,108.38,22.82,0\n").unwrap();
        assert_eq!(table.cells, vec![CellRecord::new("南宁-1", 108.38, 22.82, 0.0)]);
    }

    #[test]
    fn drops_bad_rows() {
        let table = read_str(
            "name,longitude,latitude,azimuth\n\
             ok,114.0,30.0,0\n\
             text,abc,30.0,0\n\
             blank,114.0,,0\n\
             nan,114.0,NaN,0\n\
             west,10.0,30.0,0\n\
             heading,114.0,30.0,400\n",
        )
        .unwrap();
        assert_eq!(table.cells.len(), 1);
        assert_eq!(table.invalid, 3);
        assert_eq!(table.out_of_bounds, 2);
    }

    #[test]
    fn drops_short_rows() {
        let table = read_str(
            "name,longitude,latitude,azimuth\n\
             ok,114.0,30.0,0\n\
             short,114.0,30.0\n\
             ok2,114.1,30.1,90\n",
        )
        .unwrap();
        assert_eq!(
            table.cells,
            vec![
                CellRecord::new("ok", 114.0, 30.0, 0.0),
                CellRecord::new("ok2", 114.1, 30.1, 90.0),
            ]
        );
        assert_eq!(table.invalid, 1);
    }

    #[test]
    fn drops_rows_that_are_not_utf8() {
        let mut data = b"name,longitude,latitude,azimuth\nok,114.0,30.0,0\n".to_vec();
        // "南宁" in GBK
        data.extend_from_slice(b"\xc4\xcf\xc4\xfe,114.0,30.0,0\n");
        data.extend_from_slice(b"ok2,114.1,30.1,90\n");

        let table = read(data.as_slice(), &Bounds::default()).unwrap();
        assert_eq!(table.cells.len(), 2);
        assert_eq!(table.cells[1].name, "ok2");
        assert_eq!(table.invalid, 1);
    }

    #[test]
    fn rejects_missing_columns() {
        let err = read_str("name,longitude,latitude\nL1,114.0,30.0\n").unwrap_err();
        assert!(err.to_string().contains("azimuth"));
    }

    #[test]
    fn rejects_empty_names() {
        let err = read_str("name,longitude,latitude,azimuth\nL1,114,30,0\n,114,30,0\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn rejects_empty_tables() {
        assert!(read_str("name,longitude,latitude,azimuth\n").is_err());
        assert!(read_str("name,longitude,latitude,azimuth\nL1,0,0,0\n").is_err());
    }
}
