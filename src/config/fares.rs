//! Fare type seed loading from fares.toml
//!
//! An empty database is seeded with the fare types listed in the optional
//! seed file. A missing file is not an error; a malformed one is.

use crate::core::fare_type::{self, FareTypeInput};
use crate::entities::FareType;
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// Configuration structure representing the entire fares.toml file
#[derive(Debug, Deserialize)]
pub struct FaresConfig {
    /// Fare types to seed
    #[serde(default)]
    pub fare_types: Vec<FareTypeSeed>,
}

/// One seeded fare type together with its tariff
#[derive(Debug, Deserialize, Clone)]
pub struct FareTypeSeed {
    /// Unique fare type name
    pub name: String,
    /// Description shown to staff
    pub description: String,
    /// Validity text
    pub validity: String,
    /// Undiscounted price
    pub base_price: f64,
    /// Discount in percent granted to exemption holders
    #[serde(default)]
    pub discount_rate: f64,
}

impl From<FareTypeSeed> for FareTypeInput {
    fn from(seed: FareTypeSeed) -> Self {
        Self {
            name: seed.name,
            description: seed.description,
            validity: seed.validity,
            base_price: seed.base_price,
            discount_rate: seed.discount_rate,
        }
    }
}

/// Loads the seed file at `path`.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FaresConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read fares config {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse fares config: {e}"),
    })
}

/// Seeds fare types from `path` when the `fare_type` table is empty.
///
/// Returns the number of fare types created.
pub async fn seed_fare_types<P: AsRef<Path>>(db: &DatabaseConnection, path: P) -> Result<usize> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No fares config at {}, skipping seeding", path.display());
        return Ok(0);
    }

    if FareType::find().count(db).await? > 0 {
        info!("Fare types already present, skipping seeding");
        return Ok(0);
    }

    let config = load_config(path)?;
    let mut created = 0;
    for seed in config.fare_types {
        let name = seed.name.clone();
        match fare_type::create_fare_type(db, seed.into()).await {
            Ok(_) => created += 1,
            Err(e @ (Error::Validation { .. } | Error::Conflict { .. })) => {
                warn!("Skipping seeded fare type '{}': {}", name, e);
            }
            Err(e) => return Err(e),
        }
    }

    info!("Seeded {} fare types from {}", created, path.display());
    Ok(created)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::setup_test_db;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [[fare_types]]
        name = "Adult"
        description = "Standard adult single fare"
        validity = "Single journey"
        base_price = 2.0
        discount_rate = 0.0

        [[fare_types]]
        name = "Student"
        description = "Reduced fare for students"
        validity = "Single journey"
        base_price = 2.0
        discount_rate = 33.3
    "#;

    #[test]
    fn test_parse_fares_config() {
        let config: FaresConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.fare_types.len(), 2);
        assert_eq!(config.fare_types[0].name, "Adult");
        assert_eq!(config.fare_types[1].discount_rate, 33.3);
    }

    #[test]
    fn test_load_config_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[[fare_types]]\nname = ").unwrap();
        let result = load_config(file.path());
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[tokio::test]
    async fn test_seed_only_into_empty_table() -> Result<()> {
        let db = setup_test_db().await?;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();

        assert_eq!(seed_fare_types(&db, file.path()).await?, 2);
        assert_eq!(seed_fare_types(&db, file.path()).await?, 0);
        assert_eq!(FareType::find().count(&db).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_seed_file_is_skipped() -> Result<()> {
        let db = setup_test_db().await?;
        assert_eq!(seed_fare_types(&db, "does/not/exist.toml").await?, 0);
        Ok(())
    }
}
