// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{path::Path, str::FromStr};

use crate::{ComponentKind, Error, Result, ini::IniDocument};

pub const CORE_SECTION: &str = "mediawiki";
pub const CORE_VERSION_KEY: &str = "version";

/// distributor key for components published on the extension catalog.
pub const CATALOG_DISTRIBUTOR: &str = "extdist";
/// distributor key for components cloned from a git repository.
pub const REPOSITORY_DISTRIBUTOR: &str = "git";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreSpec {
    pub version: String,
}

/// a single extension or skin declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentSpec {
    /// resolved against the catalog listing by name.
    Catalog {
        name: String,
        version: Option<String>,
    },
    /// shallow clone of `url`; `branch` may also be a tag.
    Repository { url: String, branch: Option<String> },
}

impl ComponentSpec {
    /// builds a spec from a `name` or `name|version` value.
    pub fn from_declaration(distributor: &str, value: &str, line: usize) -> Result<Self> {
        let (name, version) = match value.split_once('|') {
            Some((name, version)) => (name.trim(), Some(version.trim())),
            None => (value.trim(), None),
        };
        let version = version.filter(|v| !v.is_empty()).map(str::to_string);

        if name.is_empty() {
            return Err(Error::parse(line, "component name is empty"));
        }

        match distributor {
            CATALOG_DISTRIBUTOR => Ok(Self::Catalog {
                name: name.to_string(),
                version,
            }),
            REPOSITORY_DISTRIBUTOR => Ok(Self::Repository {
                url: name.to_string(),
                branch: version,
            }),
            other => Err(Error::UnknownDistributor {
                distributor: other.to_string(),
                line,
            }),
        }
    }

    /// catalog name or clone url.
    pub fn name(&self) -> &str {
        match self {
            Self::Catalog { name, .. } => name,
            Self::Repository { url, .. } => url,
        }
    }

    pub fn pinned_version(&self) -> Option<&str> {
        match self {
            Self::Catalog { version, .. } => version.as_deref(),
            Self::Repository { branch, .. } => branch.as_deref(),
        }
    }
}

impl std::fmt::Display for ComponentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pinned_version() {
            Some(version) => write!(f, "{}|{version}", self.name()),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// the wiki manifest: which core release to install and which add-ons go
/// with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub core: CoreSpec,
    pub extensions: Vec<ComponentSpec>,
    pub skins: Vec<ComponentSpec>,
}

impl Configuration {
    pub fn load(path: &Path) -> Result<Self> {
        let document = IniDocument::load(path)?;
        Self::from_document(&document)
    }

    pub fn from_document(document: &IniDocument) -> Result<Self> {
        let version = document
            .first_value(CORE_SECTION, CORE_VERSION_KEY)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            core: CoreSpec { version },
            extensions: components_from_section(document, ComponentKind::Extension.section())?,
            skins: components_from_section(document, ComponentKind::Skin.section())?,
        })
    }

    pub fn components(&self, kind: ComponentKind) -> &[ComponentSpec] {
        match kind {
            ComponentKind::Extension => &self.extensions,
            ComponentKind::Skin => &self.skins,
        }
    }
}

impl FromStr for Configuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_document(&IniDocument::parse(s)?)
    }
}

/// every value of every distributor key, grouped by distributor in the order
/// the distributors first appear.
fn components_from_section(document: &IniDocument, section: &str) -> Result<Vec<ComponentSpec>> {
    let mut components = Vec::with_capacity(document.section(section).len());

    for distributor in document.keys(section) {
        for entry in document.values(section, distributor) {
            components.push(ComponentSpec::from_declaration(
                distributor,
                &entry.value,
                entry.line,
            )?);
        }
    }

    Ok(components)
}
