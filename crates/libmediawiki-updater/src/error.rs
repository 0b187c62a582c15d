// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{url} returned http status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error at line {line}: {message}")]
    ConfigParse { line: usize, message: String },

    #[error("unknown distributor '{distributor}' at line {line}")]
    UnknownDistributor { distributor: String, line: usize },

    #[error("mediawiki version not specified in config")]
    MissingCoreVersion,

    #[error("invalid version format: {0}")]
    InvalidVersion(String),

    #[error("failed to parse listing {url}: {message}")]
    ListingParse { url: String, message: String },

    #[error("component not found: {0}")]
    ComponentNotFound(String),

    #[error("no download url found for mediawiki version {0}")]
    ReleaseNotFound(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("archive entry '{0}' escapes the destination directory")]
    UnsafeArchivePath(String),

    #[error("checkout failed: {0}")]
    CheckoutFailed(String),

    #[error("merge failed at {}: {source}", path.display())]
    Merge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {step}: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Other(String),
}

macro_rules! error_ctor {
    ($($name:ident => $variant:ident),* $(,)?) => {
        $(
            pub(crate) fn $name(msg: impl Into<String>) -> Self {
                Self::$variant(msg.into())
            }
        )*
    };
}

impl Error {
    error_ctor!(
        download => DownloadFailed,
        extraction => ExtractionFailed,
        checkout => CheckoutFailed,
        not_found => ComponentNotFound,
    );

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn listing(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ListingParse {
            url: url.into(),
            message: message.into(),
        }
    }

    pub(crate) fn merge(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Merge {
            path: path.into(),
            source,
        }
    }

    /// wraps an error with the pipeline step that produced it.
    pub(crate) fn step(step: &'static str, source: Error) -> Self {
        Self::Step {
            step,
            source: Box::new(source),
        }
    }
}
