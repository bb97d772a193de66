//! Optional TOML settings file (`cropwise.toml`).
//!
//! ```toml
//! catalog = "data/catalog.json"
//! record = "verification.json"
//!
//! [defaults]
//! quality = "gold"
//! professions = ["tiller", "artisan"]
//! fertilizer = "speed_gro"
//! season = "summer"
//! ```
//!
//! Every key is optional. Command-line flags and environment variables take
//! precedence over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::Season;
use crate::modifiers::QualityTier;

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "cropwise.toml";

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub catalog: Option<PathBuf>,
    pub record: Option<PathBuf>,
    #[serde(default)]
    pub defaults: Defaults,
}

/// The `[defaults]` table: pricing context used when flags are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub quality: Option<QualityTier>,
    #[serde(default)]
    pub professions: Vec<String>,
    pub fertilizer: Option<String>,
    pub season: Option<Season>,
}

/// Parse settings from a TOML string.
pub fn parse_toml(content: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(content)?;
    validate(&settings)?;
    Ok(settings)
}

/// Parse settings from a TOML file path.
pub fn parse_toml_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_toml(&content).with_context(|| format!("parsing config {}", path.display()))
}

fn validate(settings: &Settings) -> Result<()> {
    let d = &settings.defaults;
    for (i, id) in d.professions.iter().enumerate() {
        if id.trim().is_empty() {
            anyhow::bail!("defaults.professions[{}] is empty", i);
        }
        if d.professions[..i].contains(id) {
            anyhow::bail!("defaults.professions lists '{}' twice", id);
        }
    }
    if let Some(f) = &d.fertilizer {
        if f.trim().is_empty() {
            anyhow::bail!("defaults.fertilizer is empty");
        }
    }
    for (key, path) in [("catalog", &settings.catalog), ("record", &settings.record)] {
        if let Some(p) = path {
            if p.as_os_str().is_empty() {
                anyhow::bail!("{} path is empty", key);
            }
        }
    }
    Ok(())
}

/// Load the settings file.
///
/// An explicit path must exist. Without one, `cropwise.toml` in the working
/// directory is used if present, otherwise defaults.
pub fn load_optional(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => parse_toml_file(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.exists() {
                parse_toml_file(path)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse_toml("").unwrap(), Settings::default());
    }

    #[test]
    fn parses_full_file() {
        let s = parse_toml(
            r#"
            catalog = "data/catalog.json"
            record = "state/verification.json"

            [defaults]
            quality = "iridium"
            professions = ["tiller", "artisan"]
            fertilizer = "speed_gro"
            season = "fall"
            "#,
        )
        .unwrap();
        assert_eq!(s.catalog, Some(PathBuf::from("data/catalog.json")));
        assert_eq!(s.record, Some(PathBuf::from("state/verification.json")));
        assert_eq!(s.defaults.quality, Some(QualityTier::Iridium));
        assert_eq!(s.defaults.professions, vec!["tiller", "artisan"]);
        assert_eq!(s.defaults.fertilizer.as_deref(), Some("speed_gro"));
        assert_eq!(s.defaults.season, Some(Season::Fall));
    }

    #[test]
    fn rejects_unknown_quality() {
        assert!(parse_toml("[defaults]\nquality = \"diamond\"\n").is_err());
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(parse_toml("catalgo = \"x.json\"\n").is_err());
    }

    #[test]
    fn rejects_duplicate_profession() {
        let err = parse_toml("[defaults]\nprofessions = [\"tiller\", \"tiller\"]\n").unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn rejects_blank_fertilizer() {
        assert!(parse_toml("[defaults]\nfertilizer = \" \"\n").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_optional(Some(&missing)).unwrap_err();
        assert!(format!("{:#}", err).contains("reading config"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cropwise.toml");
        std::fs::write(&path, "[defaults]\nquality = \"silver\"\n").unwrap();
        let s = load_optional(Some(&path)).unwrap();
        assert_eq!(s.defaults.quality, Some(QualityTier::Silver));
    }
}
