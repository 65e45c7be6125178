//! Regional soil reference (RRP) lookup.
//!
//! Joins the four relational exports of the RRP database offline into one
//! static JSON object so the map application never needs a database:
//!
//! ```text
//! table_etude ──(NO_ETUDE)── table_ucs ──(ID_UCS)── table_l_ucs_uts ──(ID_UTS)── table_uts
//! ```
//!
//! Each unit becomes one [`RrpEntry`] under `"<NO_ETUDE>:<NO_UCS>"`, with its
//! components sorted by `POURCENT`, largest first.
//!
//! # Usage
//!
//! ```rust
//! use soilmap_rrp::{join, RrpTables};
//!
//! let tables = RrpTables::from_csv(
//!     "NO_ETUDE;ID_ETUDE\n1;100\n",
//!     "NO_ETUDE;NO_UCS;ID_UCS;NOM_UCS\n1;7;55;Limon\n",
//!     "ID_UCS;ID_UTS;POURCENT\n55;501;30\n55;502;70\n",
//!     "ID_UTS;RP_2008_NOM\n501;Sand\n502;Clay\n",
//! )
//! .unwrap();
//! let lookup = join(&tables);
//! assert_eq!(lookup["1:7"].components[0].component_name.as_deref(), Some("Clay"));
//! ```

pub mod builder;
pub mod lookup;
pub mod models;
pub mod table;

pub use builder::{build_lookup, join, write_lookup, LookupTable, RrpTables};
pub use lookup::{CacheStatus, LookupCache, LookupSource, RrpLookup};
pub use models::{RrpComponent, RrpEntry};
