use crate::error::{FixupError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use tracing::info;

/// Static venue name -> canonical website table, loaded once at process start
/// and passed by reference into the resolver and driver.
#[derive(Debug, Default)]
pub struct VenueRegistry {
    venues: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    venues: HashMap<String, String>,
}

impl VenueRegistry {
    /// Load the registry from a TOML file with a single `[venues]` table of
    /// display name -> absolute URL entries.
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FixupError::Config(format!("Failed to read venue registry '{}': {}", path, e))
        })?;
        let file: RegistryFile = toml::from_str(&content)?;
        let registry = Self::from_entries(file.venues);
        info!(venues = registry.len(), path = %path, "venue registry loaded");
        Ok(registry)
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let venues = entries
            .into_iter()
            .map(|(name, url)| (normalize_name(&name), url))
            .collect();
        Self { venues }
    }

    /// Exact match on the normalized name only. Absence is a normal outcome.
    pub fn lookup(&self, venue_name: &str) -> Option<&str> {
        self.venues.get(&normalize_name(venue_name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().chars().map(fold_diacritic).collect()
}

/// Folds accent marks so "Café" and "Cafe" key identically. The Norwegian
/// letters æ/ø/å are letters of their own, not diacritics, and stay as-is.
fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_registry() -> VenueRegistry {
        VenueRegistry::from_entries([
            ("USF Verftet".to_string(), "https://usf.no".to_string()),
            ("Café Opera".to_string(), "https://cafeopera.no".to_string()),
            ("Østre".to_string(), "https://xn--stre-gra.no".to_string()),
        ])
    }

    #[test]
    fn test_lookup_is_case_and_whitespace_insensitive() {
        let registry = test_registry();
        assert_eq!(registry.lookup("usf verftet"), Some("https://usf.no"));
        assert_eq!(registry.lookup("  USF VERFTET  "), Some("https://usf.no"));
    }

    #[test]
    fn test_lookup_folds_diacritics_but_not_norwegian_letters() {
        let registry = test_registry();
        assert_eq!(registry.lookup("Cafe Opera"), Some("https://cafeopera.no"));
        // ø is a distinct letter; "Ostre" must not match "Østre"
        assert_eq!(registry.lookup("Ostre"), None);
        assert!(registry.lookup("østre").is_some());
    }

    #[test]
    fn test_lookup_requires_exact_normalized_match() {
        let registry = test_registry();
        assert_eq!(registry.lookup("USF"), None);
        assert_eq!(registry.lookup("Verftet"), None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[venues]").unwrap();
        writeln!(file, "\"USF Verftet\" = \"https://usf.no\"").unwrap();
        writeln!(file, "\"Grieghallen\" = \"https://grieghallen.no\"").unwrap();

        let registry = VenueRegistry::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("grieghallen"), Some("https://grieghallen.no"));
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        assert!(VenueRegistry::load("does-not-exist.toml").is_err());
    }
}
