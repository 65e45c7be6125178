//! Read one entry of the lookup JSON.

use soilmap_rrp::{LookupCache, LookupSource};

pub async fn run_lookup(location: &str, study: &str, unit: &str) -> anyhow::Result<()> {
    let cache = LookupCache::new(LookupSource::parse(location));
    let lookup = cache.get().await;
    match lookup.get(study, unit) {
        Some(entry) => println!("{}", serde_json::to_string_pretty(entry)?),
        None => anyhow::bail!("No soil unit {}:{} in {}", study, unit, location),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_lookup_missing_entry_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rrp_lookup.json");
        std::fs::write(&path, "{}").unwrap();
        let err = run_lookup(path.to_str().unwrap(), "1", "7").await.unwrap_err();
        assert!(err.to_string().contains("1:7"));
    }
}
