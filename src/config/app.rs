//! Application configuration.
//!
//! Configuration comes from a TOML file holding the identity roster and the
//! catalog. The file path is read from `UNICARD_CONFIG` (after loading `.env` if one
//! exists) and defaults to `unicard.toml`. A missing file is not an error: the
//! built-in demo roster and catalog are used instead. A file that exists but does
//! not parse is an error.

use crate::{
    core::{
        catalog::CatalogData,
        identity::{IdentityProfile, demo_roster},
    },
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "UNICARD_CONFIG";

/// Configuration file used when `UNICARD_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "unicard.toml";

/// Configuration structure representing the entire config file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Identities created at session start
    #[serde(default = "demo_roster")]
    pub roster: Vec<IdentityProfile>,
    /// Menu, fines, events and print pricing
    #[serde(default)]
    pub catalog: CatalogData,
    /// Import the demo activity for every student when the ledger opens
    #[serde(default)]
    pub seed_demo_history: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster: demo_roster(),
            catalog: CatalogData::default(),
            seed_demo_history: false,
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - The roster repeats an identity id
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Loading configuration from {:?}", path_ref);

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config: {e}"),
    })?;

    validate_roster(&config.roster)?;
    Ok(config)
}

/// Loads `.env`, then the file named by `UNICARD_CONFIG` (or `unicard.toml`),
/// falling back to the demo configuration when that file does not exist.
pub fn load_app_configuration() -> Result<AppConfig> {
    // Non-fatal: variables can be set externally
    dotenvy::dotenv().ok();
    load_configuration_from_env(|key| std::env::var(key).ok())
}

fn load_configuration_from_env(var: impl Fn(&str) -> Option<String>) -> Result<AppConfig> {
    let path = var(CONFIG_PATH_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {} ({} identities)", path, config.roster.len());
        Ok(config)
    } else {
        info!("No configuration at {}, using the demo roster and catalog", path);
        Ok(AppConfig::default())
    }
}

fn validate_roster(roster: &[IdentityProfile]) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for profile in roster {
        if !seen.insert(profile.id.as_str()) {
            return Err(Error::Config {
                message: format!("Duplicate identity id in roster: {}", profile.id),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::identity::Role;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            seed_demo_history = true

            [[roster]]
            id = "s1"
            name = "Asha Rao"
            role = "student"
            balance = "640.50"
            student_id = "EE2024017"
            department = "Electrical"

            [[roster]]
            id = "k1"
            name = "Library Kiosk"
            role = "vendor"

            [catalog]
            print_cost_per_page = 3
        "#;

        let config = parse_config(toml_str).unwrap();
        assert!(config.seed_demo_history);
        assert_eq!(config.roster.len(), 2);
        assert_eq!(config.roster[0].role, Role::Student);
        assert_eq!(config.roster[0].balance, dec!(640.50));
        assert_eq!(config.roster[1].balance, dec!(0));
        assert!(config.roster[1].department.is_none());
        assert_eq!(config.catalog.print_cost_per_page, dec!(3));
        assert_eq!(config.catalog.menu.len(), 6);
    }

    #[test]
    fn test_empty_config_uses_demo_data() {
        let config = parse_config("").unwrap();
        assert_eq!(config.roster, demo_roster());
        assert!(!config.seed_demo_history);
    }

    #[test]
    fn test_unknown_role_is_a_config_error() {
        let toml_str = r#"
            [[roster]]
            id = "x1"
            name = "Intruder"
            role = "superuser"
        "#;
        assert!(matches!(parse_config(toml_str), Err(Error::Config { .. })));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let toml_str = r#"
            [[roster]]
            id = "u1"
            name = "One"
            role = "student"

            [[roster]]
            id = "u1"
            name = "Two"
            role = "admin"
        "#;
        let err = parse_config(toml_str).unwrap_err();
        assert!(err.to_string().contains("Duplicate identity id"));
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    fn env_with_config_path(path: &Path) -> impl Fn(&str) -> Option<String> + '_ {
        move |key: &str| (key == CONFIG_PATH_ENV).then(|| path.display().to_string())
    }

    #[test]
    fn test_env_config_path_is_loaded() {
        let path = std::env::temp_dir().join(format!("unicard-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"
                [[roster]]
                id = "s7"
                name = "Meera Iyer"
                role = "student"
                balance = 75
            "#,
        )
        .unwrap();

        let config = load_configuration_from_env(env_with_config_path(&path));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.roster.len(), 1);
        assert_eq!(config.roster[0].id, "s7");
        assert_eq!(config.roster[0].balance, dec!(75));
    }

    #[test]
    fn test_missing_env_config_falls_back_to_demo() {
        let path = std::env::temp_dir().join(format!("unicard-missing-{}.toml", uuid::Uuid::new_v4()));

        let config = load_configuration_from_env(env_with_config_path(&path)).unwrap();
        assert_eq!(config.roster, demo_roster());
        assert_eq!(config.catalog, CatalogData::default());
    }

    #[test]
    fn test_broken_env_config_is_an_error() {
        let path = std::env::temp_dir().join(format!("unicard-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "roster = 12").unwrap();

        let result = load_configuration_from_env(env_with_config_path(&path));
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_app_configuration_without_config_file() {
        // No `.env` and no `unicard.toml` ship with the crate
        let config = load_app_configuration().unwrap();
        assert!(!config.roster.is_empty());
    }
}
