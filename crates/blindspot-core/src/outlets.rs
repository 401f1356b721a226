use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bias::BiasLabel;
use crate::ConfigError;

/// One media outlet from `outlets.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutletConfig {
    pub name: String,
    pub bias: BiasLabel,
}

#[derive(Debug, Deserialize)]
pub struct OutletsFile {
    pub outlets: Vec<OutletConfig>,
}

impl OutletsFile {
    /// Build the name → bias lookup used during analysis.
    #[must_use]
    pub fn registry(&self) -> OutletRegistry {
        OutletRegistry::from_outlets(&self.outlets)
    }
}

/// Lookup table from outlet name to its configured lean.
///
/// Names match exactly as written in the registry file; unknown outlets
/// resolve to `None` and aggregate as center downstream.
#[derive(Debug, Clone, Default)]
pub struct OutletRegistry {
    by_name: HashMap<String, BiasLabel>,
}

impl OutletRegistry {
    #[must_use]
    pub fn from_outlets(outlets: &[OutletConfig]) -> Self {
        let by_name = outlets
            .iter()
            .map(|o| (o.name.clone(), o.bias))
            .collect();
        Self { by_name }
    }

    #[must_use]
    pub fn bias_of(&self, name: &str) -> Option<BiasLabel> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Load and validate the outlet registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_outlets(path: &Path) -> Result<OutletsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::OutletsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let outlets_file: OutletsFile =
        serde_yaml::from_str(&content).map_err(ConfigError::OutletsFileParse)?;

    validate_outlets(&outlets_file)?;

    Ok(outlets_file)
}

fn validate_outlets(outlets_file: &OutletsFile) -> Result<(), ConfigError> {
    if outlets_file.outlets.is_empty() {
        return Err(ConfigError::Validation(
            "outlets file must list at least one outlet".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for outlet in &outlets_file.outlets {
        if outlet.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "outlet name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(outlet.name.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate outlet name: '{}'",
                outlet.name
            )));
        }
    }

    Ok(())
}
