use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::Serialize;
use std::path::Path;

use super::SweepConfig;
use super::overrides::filter_unset;
use super::smart_load;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const CONFIG_EXTENSIONS: &[&str] = &["toml", "json", "yaml", "yml"];

impl SweepConfig {
    /// Build the layered configuration.
    ///
    /// Lowest to highest: embedded defaults, user config, repository config,
    /// `custom_config`, `SYMSWEEP_*` environment, `cli_overrides`.
    pub fn load<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Self> {
        let figment = Self::figment(custom_config, cli_overrides)?;
        let config: SweepConfig = figment
            .extract()
            .context("Invalid configuration")?;

        tracing::trace!("CONFIG LOAD: {:?}", config);
        Ok(config)
    }

    fn figment<T: Serialize>(custom_config: Option<&str>, cli_overrides: Option<T>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        if let Some(base) = Self::user_config_base_path() {
            for ext in CONFIG_EXTENSIONS {
                figment = figment.merge(smart_load::auto(format!("{base}.{ext}")));
            }
        }

        for ext in CONFIG_EXTENSIONS {
            figment = figment.merge(smart_load::auto(format!("symsweep.{ext}")));
        }

        if let Some(path) = custom_config {
            if !Path::new(path).is_file() {
                anyhow::bail!("Configuration file not found: {}", path);
            }
            tracing::debug!("CONFIG LOAD: custom config {}", path);
            figment = figment.merge(smart_load::auto(path));
        }

        figment = figment.merge(Env::prefixed("SYMSWEEP_"));

        if let Some(cli) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(filter_unset(cli)));
        }

        Ok(figment)
    }

    fn user_config_base_path() -> Option<String> {
        std::env::var("HOME")
            .ok()
            .map(|home| format!("{home}/.config/symsweep/config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_config_loads_defaults() {
        let config = SweepConfig::load(None, None::<&()>).expect("Should load default config");

        assert_eq!(config.database_name, "compile_commands.json");
        assert_eq!(config.saving_path, PathBuf::from("./find_all_symbols_db.yaml"));
        assert!(config.exclude.is_empty());
        assert!(config.binary().is_none());
        assert!(config.only_under().is_none());
    }

    #[test]
    fn test_cli_overrides_win() -> Result<()> {
        let overrides = json!({
            "jobs": 3,
            "binary": "/opt/llvm/bin/find-all-symbols",
            "exclude": ["*/gen/*"],
            "only_under": null,
            "extra_arg": []
        });
        let config = SweepConfig::load(None, Some(overrides))?;

        assert_eq!(config.jobs, 3);
        assert_eq!(config.binary(), Some("/opt/llvm/bin/find-all-symbols"));
        assert_eq!(config.exclude, vec!["*/gen/*".to_string()]);
        assert!(config.only_under().is_none());
        assert!(config.extra_arg.is_empty());
        Ok(())
    }

    #[test]
    fn test_custom_config_file_is_merged() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("sweep.yaml");
        fs::write(
            &path,
            "jobs: 5\nextra_arg_before:\n  - -xc++\nsaving_path: out/db.yaml\n",
        )?;

        let config = SweepConfig::load(path.to_str(), None::<&()>)?;
        assert_eq!(config.jobs, 5);
        assert_eq!(config.extra_arg_before, vec!["-xc++".to_string()]);
        assert_eq!(config.saving_path, PathBuf::from("out/db.yaml"));
        Ok(())
    }

    #[test]
    fn test_cli_beats_custom_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("sweep.toml");
        fs::write(&path, "jobs = 5\n")?;

        let config = SweepConfig::load(path.to_str(), Some(json!({ "jobs": 2 })))?;
        assert_eq!(config.jobs, 2);
        Ok(())
    }

    #[test]
    fn test_missing_custom_config_is_an_error() {
        let result = SweepConfig::load(Some("/no/such/symsweep.toml"), None::<&()>);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_jobs_rejected() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("sweep.toml");
        fs::write(&path, "jobs = -2\n")?;

        assert!(SweepConfig::load(path.to_str(), None::<&()>).is_err());
        Ok(())
    }
}
