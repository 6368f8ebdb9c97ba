//! Configuration file loading for buildergen.
//!
//! Discovers and loads `buildergen.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use buildergen_core::settings::Settings;
use buildergen_types::plan::FieldScope;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "buildergen.toml";

/// Top-level configuration from buildergen.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildergenConfig {
    pub eligibility: EligibilityConfig,
    pub apply: ApplyConfig,
    pub backups: BackupsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    /// `inherited` (default) or `declared_only`.
    pub field_scope: FieldScope,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Record and verify the target fingerprint.
    pub require_clean_hashes: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            require_clean_hashes: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackupsConfig {
    /// Copy the unit file aside before each commit overwrites it.
    pub enabled: bool,

    /// Suffix appended to the unit path for the backup copy.
    pub suffix: String,
}

impl Default for BackupsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            suffix: ".buildergen.bak".to_string(),
        }
    }
}

pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<BuildergenConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<BuildergenConfig> {
    let config: BuildergenConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return the default if there is none.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<BuildergenConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(BuildergenConfig::default()),
    }
}

/// Config file values with CLI overrides applied.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub field_scope: FieldScope,
    pub require_clean_hashes: bool,
    pub backups: BackupsConfig,
}

impl MergedConfig {
    pub fn settings(&self, dry_run: bool) -> Settings {
        Settings {
            field_scope: self.field_scope,
            dry_run,
            require_clean_hashes: self.require_clean_hashes,
        }
    }

    /// Backup suffix to use, if backups are on.
    pub fn backup_suffix(&self) -> Option<&str> {
        self.backups
            .enabled
            .then_some(self.backups.suffix.as_str())
    }
}

pub struct ConfigMerger {
    config: BuildergenConfig,
}

impl ConfigMerger {
    pub fn new(config: BuildergenConfig) -> Self {
        Self { config }
    }

    /// An explicit `--field-scope` replaces the file value; `--no-clean-hashes` and
    /// `--no-backup` can only switch their setting off.
    pub fn merge_args(
        self,
        cli_field_scope: Option<FieldScope>,
        no_clean_hashes: bool,
        no_backup: bool,
    ) -> MergedConfig {
        let mut backups = self.config.backups;
        if no_backup {
            backups.enabled = false;
        }

        MergedConfig {
            field_scope: cli_field_scope.unwrap_or(self.config.eligibility.field_scope),
            require_clean_hashes: self.config.apply.require_clean_hashes && !no_clean_hashes,
            backups,
        }
    }
}
