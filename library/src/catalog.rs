use std::io::BufRead;
use std::str::FromStr;

use crate::error::Error;
use crate::units::{AngleUnit, Unit};
use crate::Result;
use log::info;
use serde::{Deserialize, Serialize};

/// Column order of a filtered Hipparcos row.
pub const CATALOG_FIELDS: [&str; 7] = ["Vmag", "RAdeg", "DEdeg", "BTmag", "VTmag", "B-V", "V-I"];

/// One background star, ready for the sky renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarCatalogEntry {
    pub right_ascension_rad: f64,
    pub declination_rad: f64,
    pub visual_magnitude: f64,
    pub color_index_b_minus_v: f64,
}

impl StarCatalogEntry {
    /// Parses one row; `line` is 1-based and only used in error messages.
    pub fn from_row(line: usize, row: &str) -> Result<StarCatalogEntry> {
        let fields: Vec<&str> = row.split(',').map(str::trim).collect();
        if fields.len() != CATALOG_FIELDS.len() {
            return Err(Error::CatalogFormat {
                line,
                reason: format!(
                    "expected {} fields, found {}",
                    CATALOG_FIELDS.len(),
                    fields.len()
                ),
            });
        }

        let mut values = [0f64; 7];
        for (index, field) in fields.iter().enumerate() {
            values[index] = field
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| Error::CatalogFormat {
                    line,
                    reason: format!("{} is not numeric: '{}'", CATALOG_FIELDS[index], field),
                })?;
        }

        // BTmag, VTmag and V-I only have to be numeric.
        let [vmag, ra_deg, dec_deg, _bt_mag, _vt_mag, b_minus_v, _v_minus_i] = values;

        Ok(StarCatalogEntry {
            right_ascension_rad: AngleUnit::Degree.to_canonical(ra_deg),
            declination_rad: AngleUnit::Degree.to_canonical(dec_deg),
            visual_magnitude: vmag,
            color_index_b_minus_v: b_minus_v,
        })
    }
}

impl FromStr for StarCatalogEntry {
    type Err = Error;

    fn from_str(row: &str) -> Result<StarCatalogEntry> {
        StarCatalogEntry::from_row(1, row)
    }
}

pub fn parse_catalog(text: &str) -> Result<Vec<StarCatalogEntry>> {
    load_catalog(text.as_bytes())
}

/// Reads a whole catalog. Any bad row fails the load.
pub fn load_catalog<R: BufRead>(reader: R) -> Result<Vec<StarCatalogEntry>> {
    let mut entries = Vec::new();
    for (index, row) in reader.lines().enumerate() {
        let row = row.map_err(|err| Error::Io {
            path: "<catalog>".to_string(),
            source: err,
        })?;
        if row.trim().is_empty() {
            continue;
        }
        entries.push(StarCatalogEntry::from_row(index + 1, &row)?);
    }
    info!("Loaded {} catalog stars", entries.len());
    Ok(entries)
}
