// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{fs, path::Path};

use crate::{Error, Result};

/// a single `key=value` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub key: String,
    pub value: String,
    /// 1-based line number the entry was read from.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Section {
    name: String,
    entries: Vec<IniEntry>,
}

/// ini document that keeps every occurrence of a key.
///
/// the `[extensions]` and `[skins]` sections repeat the distributor key once
/// per component, so a plain map would silently drop all but one of them.
/// sections and entries are kept in the order they were read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl IniDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut document = Self::default();
        let mut current: Option<usize> = None;

        for (index, raw) in content.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                let name = line[1..line.len() - 1].trim();
                if name.is_empty() {
                    return Err(Error::parse(line_number, "empty section name"));
                }
                current = Some(document.section_index_or_insert(name));
                continue;
            }

            let Some(section) = current else {
                return Err(Error::parse(
                    line_number,
                    "key-value pair found outside of section",
                ));
            };

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::parse(
                    line_number,
                    format!("invalid line format: {line}"),
                ));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(Error::parse(line_number, format!("missing key: {line}")));
            }

            document.sections[section].entries.push(IniEntry {
                key: key.to_string(),
                value: value.trim().to_string(),
                line: line_number,
            });
        }

        Ok(document)
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self.sections.iter().position(|s| s.name == name) {
            return index;
        }
        self.sections.push(Section {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.sections.len() - 1
    }

    /// returns every entry of a section in file order, or nothing when the
    /// section is absent.
    pub fn section(&self, name: &str) -> &[IniEntry] {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.entries.as_slice())
            .unwrap_or(&[])
    }

    /// distinct keys of a section, in the order they first appeared.
    pub fn keys(&self, section: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for entry in self.section(section) {
            if !keys.contains(&entry.key.as_str()) {
                keys.push(&entry.key);
            }
        }
        keys
    }

    pub fn values<'a>(&'a self, section: &str, key: &'a str) -> impl Iterator<Item = &'a IniEntry> {
        self.section(section).iter().filter(move |e| e.key == key)
    }

    pub fn first_value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }
}
