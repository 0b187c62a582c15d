// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

use crate::{ComponentKind, merge::IgnoreSet};

pub const DEFAULT_RELEASE_INDEX_URL: &str = "https://releases.wikimedia.org/mediawiki/";
pub const DEFAULT_EXTENSIONS_URL: &str = "https://extdist.wmflabs.org/dist/extensions/";
pub const DEFAULT_SKINS_URL: &str = "https://extdist.wmflabs.org/dist/skins/";
pub const DEFAULT_BRANCH: &str = "master";

/// verbosity level for operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub const fn log_level(self) -> log::LevelFilter {
        match self {
            Self::Quiet => log::LevelFilter::Warn,
            Self::Normal => log::LevelFilter::Info,
            Self::Verbose => log::LevelFilter::Debug,
        }
    }
}

impl std::fmt::Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quiet => write!(f, "quiet"),
            Self::Normal => write!(f, "normal"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

impl std::str::FromStr for Verbosity {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            other => Err(crate::Error::other(format!("unknown verbosity: {other}"))),
        }
    }
}

/// listing pages the pipeline scrapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// index of `MAJOR.MINOR/` release directories.
    pub release_index: String,
    pub extensions: String,
    pub skins: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            release_index: DEFAULT_RELEASE_INDEX_URL.to_string(),
            extensions: DEFAULT_EXTENSIONS_URL.to_string(),
            skins: DEFAULT_SKINS_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn catalog_url(&self, kind: ComponentKind) -> &str {
        match kind {
            ComponentKind::Extension => &self.extensions,
            ComponentKind::Skin => &self.skins,
        }
    }
}

/// options for a single update run.
///
/// consumers can construct this directly; the cli fills it from its toml
/// settings file.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    /// target paths that survive the merge untouched.
    pub ignore: IgnoreSet,

    pub endpoints: Endpoints,

    /// branch cloned for git components that do not pin one.
    pub default_branch: String,

    /// verbosity level for output.
    pub verbosity: Verbosity,

    /// parent of the per-run staging directory; the system temp dir when unset.
    pub staging_dir: Option<PathBuf>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            ignore: IgnoreSet::default(),
            endpoints: Endpoints::default(),
            default_branch: DEFAULT_BRANCH.to_string(),
            verbosity: Verbosity::default(),
            staging_dir: None,
        }
    }
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignore = IgnoreSet::new(paths);
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }
}
