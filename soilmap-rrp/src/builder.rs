//! Join the four RRP tables into one lookup keyed by `"<study>:<unit>"`.
//!
//! Units are resolved to their study by study number and to their components
//! through the link table by internal unit id. Each unit's component list is
//! sorted by percentage, largest first, keeping source order on ties.
//!
//! Numeric policy: ids and altitudes that do not parse are left out of the
//! record (a missing altitude is not a zero altitude), while link percentages
//! default to zero so the component still takes part in the sort.

use crate::models::{lookup_key, RrpComponent, RrpEntry};
use crate::table::{Row, Table};
use anyhow::Context;
use log::{info, warn};
use soilmap_utils::numbers::{key_part, parse_number, parse_number_or_zero, Numeric};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const STUDIES_FILE: &str = "table_etude.csv";
pub const UNITS_FILE: &str = "table_ucs.csv";
pub const LINKS_FILE: &str = "table_l_ucs_uts.csv";
pub const COMPONENTS_FILE: &str = "table_uts.csv";

/// The joined lookup, ordered by key so repeated builds are byte-identical.
pub type LookupTable = BTreeMap<String, RrpEntry>;

/// The four source tables.
#[derive(Debug, Clone)]
pub struct RrpTables {
    pub studies: Table,
    pub units: Table,
    pub links: Table,
    pub components: Table,
}

async fn read_table(dir: &Path, file: &str) -> anyhow::Result<Table> {
    let path = dir.join(file);
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Table::parse(file, &bytes)
}

impl RrpTables {
    /// Read the four tables concurrently from one directory.
    ///
    /// Any unreadable file fails the whole load.
    pub async fn load(dir: &Path) -> anyhow::Result<Self> {
        let (studies, units, links, components) = tokio::try_join!(
            read_table(dir, STUDIES_FILE),
            read_table(dir, UNITS_FILE),
            read_table(dir, LINKS_FILE),
            read_table(dir, COMPONENTS_FILE),
        )?;
        Ok(Self {
            studies,
            units,
            links,
            components,
        })
    }

    /// Parse the four tables from in-memory CSV text.
    pub fn from_csv(
        studies: &str,
        units: &str,
        links: &str,
        components: &str,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            studies: Table::parse(STUDIES_FILE, studies.as_bytes())?,
            units: Table::parse(UNITS_FILE, units.as_bytes())?,
            links: Table::parse(LINKS_FILE, links.as_bytes())?,
            components: Table::parse(COMPONENTS_FILE, components.as_bytes())?,
        })
    }
}

/// Index rows by one column. Later rows replace earlier ones.
fn index_by<'a>(table: &'a Table, column: &str) -> HashMap<String, Row<'a>> {
    table
        .rows()
        .map(|row| (key_part(row.text(column)), row))
        .collect()
}

/// Group rows by one column, keeping source order inside each group.
fn group_by<'a>(table: &'a Table, column: &str) -> HashMap<String, Vec<Row<'a>>> {
    let mut groups: HashMap<String, Vec<Row<'a>>> = HashMap::new();
    for row in table.rows() {
        groups
            .entry(key_part(row.text(column)))
            .or_default()
            .push(row);
    }
    groups
}

fn optional_text(row: &Row<'_>, column: &str) -> Option<String> {
    Some(row.text(column))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Stable sort, largest percentage first.
pub fn sort_components(components: &mut [RrpComponent]) {
    components.sort_by(|a, b| {
        b.percentage
            .partial_cmp(&a.percentage)
            .unwrap_or(Ordering::Equal)
    });
}

/// Join the tables into the keyed lookup.
pub fn join(tables: &RrpTables) -> LookupTable {
    let studies = index_by(&tables.studies, "NO_ETUDE");
    let components = index_by(&tables.components, "ID_UTS");
    let links = group_by(&tables.links, "ID_UCS");

    let mut lookup = LookupTable::new();
    for unit in tables.units.rows() {
        let study = studies.get(&key_part(unit.text("NO_ETUDE")));

        let mut uts: Vec<RrpComponent> = links
            .get(&key_part(unit.text("ID_UCS")))
            .map(|rows| {
                rows.iter()
                    .map(|link| RrpComponent {
                        percentage: parse_number_or_zero(link.text("POURCENT")),
                        component_name: components
                            .get(&key_part(link.text("ID_UTS")))
                            .and_then(|c| optional_text(c, "RP_2008_NOM")),
                    })
                    .collect()
            })
            .unwrap_or_default();
        sort_components(&mut uts);

        let component_count =
            parse_number(unit.text("NB_UTS")).unwrap_or(Numeric(uts.len() as f64));

        let entry = RrpEntry {
            study_id: study.and_then(|s| parse_number(s.text("ID_ETUDE"))),
            study_number: parse_number(unit.text("NO_ETUDE")),
            unit_number: parse_number(unit.text("NO_UCS")),
            unit_id: parse_number(unit.text("ID_UCS")),
            unit_name: unit.text("NOM_UCS").to_string(),
            natural_region: unit.text("REG_NAT").to_string(),
            altitude_min: parse_number(unit.text("ALT_MIN")),
            altitude_mode: parse_number(unit.text("ALT_MOD")),
            altitude_max: parse_number(unit.text("ALT_MAX")),
            component_count,
            components: uts,
            color_hex: optional_text(&unit, "COLOR_HEX"),
        };

        let key = lookup_key(
            &key_part(unit.text("NO_ETUDE")),
            &key_part(unit.text("NO_UCS")),
        );
        if lookup.insert(key.clone(), entry).is_some() {
            warn!("Duplicate unit key {}, keeping the later row", key);
        }
    }
    info!(
        "join: {} studies, {} units, {} links, {} components -> {} entries",
        tables.studies.len(),
        tables.units.len(),
        tables.links.len(),
        tables.components.len(),
        lookup.len()
    );
    lookup
}

/// Serialize the lookup as pretty JSON and move it into place in one step.
pub fn write_lookup(lookup: &LookupTable, output: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(lookup)?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file_name = output
        .file_name()
        .and_then(|n| n.to_str())
        .context("output path has no file name")?;
    let staging: PathBuf = output.with_file_name(format!(".{}.tmp", file_name));
    std::fs::write(&staging, json)
        .with_context(|| format!("failed to write {}", staging.display()))?;
    std::fs::rename(&staging, output)
        .with_context(|| format!("failed to move lookup into {}", output.display()))?;
    Ok(())
}

/// Load, join and write. Returns the number of entries written.
pub async fn build_lookup(input_dir: &Path, output: &Path) -> anyhow::Result<usize> {
    let tables = RrpTables::load(input_dir).await?;
    let lookup = join(&tables);
    write_lookup(&lookup, output)?;
    info!("Wrote {} entries to {}", lookup.len(), output.display());
    Ok(lookup.len())
}
