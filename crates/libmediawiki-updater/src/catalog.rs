// SPDX-License-Identifier: MIT OR Apache-2.0

//! scraping of the directory listings that publish core releases and add-on
//! snapshots.
//!
//! every operation issues exactly one GET for the listing page and works on
//! the hyperlink targets found there.

use std::collections::{BTreeMap, BTreeSet};

use url::Url;

use crate::{Error, Result, http::Transport, listing, version, version::ReleaseLine};

pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// component name mapped to every version published for it.
pub type ComponentVersions = BTreeMap<String, BTreeSet<String>>;

pub struct CatalogResolver<'a> {
    transport: &'a dyn Transport,
}

impl<'a> CatalogResolver<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }

    fn links(&self, listing_url: &str) -> Result<Vec<String>> {
        let html = self.transport.get_text(listing_url)?;
        listing::extract_links(&html).map_err(|message| Error::listing(listing_url, message))
    }

    /// absolute url of the `<name>-<version>` archive on the listing, or
    /// `None` when the catalog does not carry it.
    pub fn find_download_url(
        &self,
        listing_url: &str,
        name: &str,
        version: &str,
    ) -> Result<Option<String>> {
        let links = self.links(listing_url)?;
        let Some(href) = match_archive(&links, name, version) else {
            log::debug!("**catalog:** no archive for {name}-{version} on {listing_url}");
            return Ok(None);
        };

        let url = absolute(listing_url, href)?;
        log::debug!("**catalog:** {name}-{version} resolved to {url}");
        Ok(Some(url))
    }

    pub fn list_components(&self, listing_url: &str) -> Result<ComponentVersions> {
        Ok(component_versions(&self.links(listing_url)?))
    }

    /// release series published on the index, oldest first.
    pub fn list_core_versions(&self, index_url: &str) -> Result<Vec<String>> {
        Ok(release_series(&self.links(index_url)?))
    }

    /// url of the `mediawiki-<version>.tar.gz` archive in the series
    /// directory below `index_url`.
    pub fn find_core_download_url(
        &self,
        index_url: &str,
        line: &ReleaseLine,
        version: &str,
    ) -> Result<String> {
        let listing_url = join_directory(index_url, &line.series());
        let links = self.links(&listing_url)?;
        let archive = format!("mediawiki-{version}{ARCHIVE_SUFFIX}");

        let href = links
            .iter()
            .rev()
            .find(|href| href.ends_with(&archive))
            .ok_or_else(|| Error::ReleaseNotFound(version.to_string()))?;

        absolute(&listing_url, href)
    }
}

/// last link in document order naming `<name>-<version>` and pointing at an
/// archive.
pub fn match_archive<'l>(links: &'l [String], name: &str, version: &str) -> Option<&'l str> {
    let needle = format!("{name}-{version}");

    links
        .iter()
        .rev()
        .find(|href| href.contains(&needle) && href.ends_with(ARCHIVE_SUFFIX))
        .map(String::as_str)
}

/// groups archive links by the name before their first `-`.
///
/// hyphenated component names cannot be told apart from their version and
/// are split at the first hyphen like any other entry.
pub fn component_versions(links: &[String]) -> ComponentVersions {
    let mut components = ComponentVersions::new();

    for href in links {
        let file = href.rsplit('/').next().unwrap_or(href);
        let Some(stem) = file.strip_suffix(ARCHIVE_SUFFIX) else {
            continue;
        };
        let Some((name, version)) = stem.split_once('-') else {
            continue;
        };

        if name.is_empty() || version.is_empty() {
            continue;
        }

        components
            .entry(name.to_string())
            .or_default()
            .insert(version.to_string());
    }

    components
}

/// `MAJOR.MINOR/` directory links, deduplicated and sorted numerically.
pub fn release_series(links: &[String]) -> Vec<String> {
    let mut series: Vec<String> = links
        .iter()
        .filter_map(|href| href.strip_suffix('/'))
        .map(|dir| dir.rsplit('/').next().unwrap_or(dir))
        .filter(|dir| match dir.split_once('.') {
            Some((major, minor)) => !major.is_empty() && !minor.is_empty() && !minor.contains('.'),
            None => false,
        })
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    series.sort_by(|a, b| version::compare(a, b));
    series
}

fn absolute(base: &str, href: &str) -> Result<String> {
    Ok(Url::parse(base)?.join(href)?.to_string())
}

fn join_directory(base: &str, dir: &str) -> String {
    format!("{}/{dir}/", base.trim_end_matches('/'))
}
