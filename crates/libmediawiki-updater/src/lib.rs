// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Release and catalog locations follow the public Wikimedia distribution
// layout: core tarballs on releases.wikimedia.org and per-branch extension
// and skin snapshots on the ExtensionDistributor site (extdist.wmflabs.org).

pub mod archive;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod ini;
pub mod installer;
pub mod listing;
pub mod merge;
pub mod options;
pub mod types;
pub mod updater;
pub mod version;

#[cfg(test)]
mod test_support;

pub use catalog::{CatalogResolver, ComponentVersions};
pub use config::{ComponentSpec, Configuration, CoreSpec};
pub use error::{Error, Result};
pub use http::{HttpClient, Transport};
pub use installer::Installer;
pub use merge::{DEFAULT_IGNORE_PATHS, IgnoreSet, merge_tree};
pub use options::{Endpoints, UpdateOptions, Verbosity};
pub use types::{ComponentKind, JsonOutput, MergeStats, UpdateSummary};
pub use updater::{update, update_with_transport};
pub use version::{ReleaseLine, version_tag};

/// lists the core release series published on the release index.
pub fn list_core_versions(options: &UpdateOptions) -> Result<Vec<String>> {
    let client = HttpClient::new()?;
    CatalogResolver::new(&client).list_core_versions(&options.endpoints.release_index)
}

/// lists every extension or skin on the catalog with its published versions.
pub fn list_components(kind: ComponentKind, options: &UpdateOptions) -> Result<ComponentVersions> {
    let client = HttpClient::new()?;
    CatalogResolver::new(&client).list_components(options.endpoints.catalog_url(kind))
}
