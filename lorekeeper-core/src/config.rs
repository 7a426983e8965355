use std::collections::HashMap;
use std::path::PathBuf;

use crate::services::StorageLayout;
use crate::transfer::{ExportOptions, ImportOptions, TransferSettings};

/// Runtime configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct LorekeeperConfig {
    pub database: String,
    pub static_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// Used when an export/import command does not name a directory
    pub transfer_dir: PathBuf,
    pub export_assets: bool,
    pub import_assets: bool,
    pub strict_remap: bool,
}

impl Default for LorekeeperConfig {
    fn default() -> Self {
        Self::from_map(&HashMap::new())
    }
}

impl LorekeeperConfig {
    pub fn from_env() -> Self {
        let mut values = HashMap::new();
        for key in Self::tracked_keys() {
            if let Ok(value) = std::env::var(key) {
                values.insert(key.to_string(), value);
            }
        }
        Self::from_map(&values)
    }

    /// Build from `values`, falling back to the process environment and then
    /// to defaults. Empty values count as unset.
    pub fn from_map(values: &HashMap<String, String>) -> Self {
        fn prioritized_value(values: &HashMap<String, String>, key: &str) -> Option<String> {
            values
                .get(key)
                .cloned()
                .filter(|value| !value.is_empty())
                .or_else(|| std::env::var(key).ok().filter(|value| !value.is_empty()))
        }

        fn read_flag(values: &HashMap<String, String>, key: &str, default: bool) -> bool {
            prioritized_value(values, key)
                .and_then(|value| match value.trim().to_ascii_lowercase().as_str() {
                    "1" | "true" | "yes" | "on" => Some(true),
                    "0" | "false" | "no" | "off" => Some(false),
                    _ => None,
                })
                .unwrap_or(default)
        }

        let staging_dir = prioritized_value(values, "LOREKEEPER_STAGING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("lorekeeper-staging"));

        Self {
            database: prioritized_value(values, "LOREKEEPER_DATABASE")
                .unwrap_or_else(|| "lorekeeper.db".to_string()),
            static_dir: prioritized_value(values, "LOREKEEPER_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            staging_dir,
            transfer_dir: prioritized_value(values, "LOREKEEPER_TRANSFER_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("backup")),
            export_assets: read_flag(values, "LOREKEEPER_EXPORT_ASSETS", true),
            import_assets: read_flag(values, "LOREKEEPER_IMPORT_ASSETS", true),
            strict_remap: read_flag(values, "LOREKEEPER_STRICT_REMAP", false),
        }
    }

    fn tracked_keys() -> [&'static str; 7] {
        [
            "LOREKEEPER_DATABASE",
            "LOREKEEPER_STATIC_DIR",
            "LOREKEEPER_STAGING_DIR",
            "LOREKEEPER_TRANSFER_DIR",
            "LOREKEEPER_EXPORT_ASSETS",
            "LOREKEEPER_IMPORT_ASSETS",
            "LOREKEEPER_STRICT_REMAP",
        ]
    }

    pub fn storage_layout(&self) -> StorageLayout {
        StorageLayout::new(&self.static_dir, &self.staging_dir)
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            storage: self.storage_layout(),
            export: ExportOptions {
                export_assets: self.export_assets,
            },
            import: ImportOptions {
                import_assets: self.import_assets,
                strict_remap: self.strict_remap,
            },
        }
    }
}
