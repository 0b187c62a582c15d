// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;
use std::path::PathBuf;

use libmediawiki_updater::{Endpoints, Error, Result, UpdateOptions, Verbosity};
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "mediawiki-updater.toml";

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    ignore_paths: Option<Vec<String>>,
    verbosity: Option<String>,
    default_branch: Option<String>,
    release_index_url: Option<String>,
    extensions_url: Option<String>,
    skins_url: Option<String>,
    staging_dir: Option<PathBuf>,
}

impl TomlConfig {
    fn into_options(self) -> Result<UpdateOptions> {
        let defaults = Endpoints::default();
        let endpoints = Endpoints {
            release_index: self.release_index_url.unwrap_or(defaults.release_index),
            extensions: self.extensions_url.unwrap_or(defaults.extensions),
            skins: self.skins_url.unwrap_or(defaults.skins),
        };

        let verbosity = match self.verbosity.as_deref() {
            Some(v) => v.parse()?,
            None => Verbosity::Normal,
        };

        let mut options = UpdateOptions::new()
            .with_endpoints(endpoints)
            .with_verbosity(verbosity);

        if let Some(paths) = self.ignore_paths {
            options = options.with_ignore_paths(paths);
        }
        if let Some(branch) = self.default_branch {
            options = options.with_default_branch(branch);
        }
        if let Some(dir) = self.staging_dir {
            options = options.with_staging_dir(dir);
        }

        Ok(options)
    }
}

/// tool settings read from the user's config directory.
///
/// the wiki manifest itself is passed on the command line; this file only
/// tunes how updates run.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub inner: UpdateOptions,
}

impl std::ops::Deref for CliConfig {
    type Target = UpdateOptions;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl CliConfig {
    pub fn load() -> Result<Self> {
        let inner = Self::load_toml_config()?.into_options()?;
        Ok(Self { inner })
    }

    fn load_toml_config() -> Result<TomlConfig> {
        let Some(path) = config_path() else {
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            return Ok(TomlConfig::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            Error::other(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        parse_toml(&content).map_err(|e| {
            Error::other(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    pub fn edit_config() -> Result<()> {
        let Some(path) = config_path() else {
            return Err(Error::other("could not determine config directory"));
        };

        if !path.exists() {
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|e| {
                    Error::other(format!(
                        "failed to create config directory {}: {e}",
                        dir.display()
                    ))
                })?;
            }

            let default_content = r#"# mediawiki-updater configuration
# paths in the wiki directory that updates never overwrite
# ignore_paths = ["LocalSettings.php", ".htaccess", "images"]
# verbosity = "normal"  # quiet, normal, verbose
# branch cloned for git components without an explicit one
# default_branch = "master"
# release_index_url = "https://releases.wikimedia.org/mediawiki/"
# extensions_url = "https://extdist.wmflabs.org/dist/extensions/"
# skins_url = "https://extdist.wmflabs.org/dist/skins/"
# where per-run staging directories are created (system temp dir by default)
# staging_dir = "/var/tmp/mediawiki-updater"
"#;
            fs::write(&path, default_content).map_err(|e| {
                Error::other(format!(
                    "failed to create config file {}: {e}",
                    path.display()
                ))
            })?;
        }

        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "nano".to_string());
        std::process::Command::new(&editor)
            .arg(&path)
            .status()
            .map_err(|e| Error::other(format!("failed to open editor {editor}: {e}")))?;

        Ok(())
    }
}

fn parse_toml(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}
