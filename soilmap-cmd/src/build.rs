//! Offline build of the RRP lookup JSON.

use log::info;
use std::path::Path;

/// Join the four RRP tables found in `input_dir` and write the lookup JSON.
///
/// Any unreadable input aborts the build before anything is written.
pub async fn run_build_lookup(input_dir: &str, output: &str) -> anyhow::Result<()> {
    info!("Building RRP lookup from {}", input_dir);
    let count = soilmap_rrp::build_lookup(Path::new(input_dir), Path::new(output)).await?;
    info!("Lookup build complete. {} units written to {}", count, output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use soilmap_rrp::builder::{COMPONENTS_FILE, LINKS_FILE, STUDIES_FILE, UNITS_FILE};

    #[tokio::test]
    async fn test_run_build_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("../fixtures/rrp");
        for file in [STUDIES_FILE, UNITS_FILE, LINKS_FILE, COMPONENTS_FILE] {
            std::fs::copy(fixtures.join(file), dir.path().join(file)).unwrap();
        }
        let output = dir.path().join("public/rrp_lookup.json");
        run_build_lookup(dir.path().to_str().unwrap(), output.to_str().unwrap())
            .await
            .unwrap();
        let json = std::fs::read_to_string(&output).unwrap();
        let lookup = soilmap_rrp::RrpLookup::from_json(&json).unwrap();
        assert_eq!(lookup.len(), 3);
        assert_eq!(lookup.get("1", "7").unwrap().unit_name, "Limon");
    }

    #[tokio::test]
    async fn test_run_build_lookup_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("rrp_lookup.json");
        let missing = dir.path().join("nope");
        assert!(run_build_lookup(missing.to_str().unwrap(), output.to_str().unwrap())
            .await
            .is_err());
        assert!(!output.exists());
    }
}
