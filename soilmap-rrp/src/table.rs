//! Semicolon-delimited table loading.
//!
//! Header cells are folded to upper case once, at load time, so every column
//! lookup uses the canonical upper-case name whatever casing the export used.
//! Cells are decoded lossily; legacy Latin-1 exports load with replacement
//! characters instead of aborting.
//!
//! # CSV Formats
//!
//! - **Studies**: `NO_ETUDE;ID_ETUDE;...`
//! - **Units**: `NO_ETUDE;NO_UCS;ID_UCS;NOM_UCS;REG_NAT;ALT_MIN;ALT_MOD;ALT_MAX;NB_UTS;COLOR_HEX`
//! - **Unit/component links**: `ID_UCS;ID_UTS;POURCENT`
//! - **Components**: `ID_UTS;RP_2008_NOM;...`

use anyhow::Context;
use soilmap_utils::headers::canonical_header;
use std::collections::HashMap;

/// A loaded table with canonical column names.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    columns: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

/// One row, read through its table's column index.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a HashMap<String, usize>,
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Cell under a canonical (upper-case) column name.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .get(column)
            .and_then(|&idx| self.cells.get(idx))
            .map(String::as_str)
    }

    /// Trimmed cell text, empty when the column or cell is missing.
    pub fn text(&self, column: &str) -> &'a str {
        self.get(column).map(str::trim).unwrap_or("")
    }
}

impl Table {
    /// Parse a semicolon-delimited table with a header row.
    pub fn parse(name: &str, data: &[u8]) -> anyhow::Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .from_reader(data);

        let columns = rdr
            .byte_headers()
            .with_context(|| format!("reading header of {}", name))?
            .iter()
            .enumerate()
            .map(|(idx, cell)| (canonical_header(&String::from_utf8_lossy(cell)), idx))
            .collect::<HashMap<_, _>>();

        let mut rows = Vec::new();
        for result in rdr.byte_records() {
            let record = result.with_context(|| format!("reading row of {}", name))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| String::from_utf8_lossy(cell).into_owned())
                    .collect(),
            );
        }
        log::info!("loader: Loaded {} rows from {}", rows.len(), name);
        Ok(Self {
            name: name.to_string(),
            columns,
            rows,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |cells| Row {
            columns: &self.columns,
            cells,
        })
    }
}
