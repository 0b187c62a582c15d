// SPDX-License-Identifier: MIT OR Apache-2.0

use std::cmp::Ordering;

use crate::{Error, Result};

/// the `MAJOR.MINOR` release line a core version belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseLine {
    major: String,
    minor: String,
}

impl ReleaseLine {
    /// parses `MAJOR.MINOR[.PATCH...]`; anything after the minor number must
    /// start with `.` followed by a digit.
    pub fn parse(version: &str) -> Result<Self> {
        let invalid = || Error::InvalidVersion(version.to_string());

        let (major, rest) = version.split_once('.').ok_or_else(invalid)?;
        let (minor, patch) = match rest.split_once('.') {
            Some((minor, patch)) => (minor, Some(patch)),
            None => (rest, None),
        };

        if !is_number(major) || !is_number(minor) {
            return Err(invalid());
        }

        if let Some(patch) = patch
            && !patch.starts_with(|c: char| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        Ok(Self {
            major: major.to_string(),
            minor: minor.to_string(),
        })
    }

    /// `1.43`, the directory name used on the release index.
    pub fn series(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    /// `REL1_43`, the branch name extensions and skins are published under.
    pub fn tag(&self) -> String {
        format!("REL{}_{}", self.major, self.minor)
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// derives the default add-on version tag for a core version.
pub fn version_tag(core_version: &str) -> Result<String> {
    ReleaseLine::parse(core_version).map(|line| line.tag())
}

/// normalizes a version string for comparison.
/// replaces non-digit/non-dot chars with dots, collapses consecutive dots, trims.
pub fn normalize(version: &str) -> String {
    let mut collapsed = String::with_capacity(version.len());
    let mut prev_dot = true;

    for c in version.chars() {
        if c.is_ascii_digit() {
            collapsed.push(c);
            prev_dot = false;
        } else {
            if !prev_dot {
                collapsed.push('.');
            }
            prev_dot = true;
        }
    }

    collapsed.trim_end_matches('.').to_string()
}

/// compares two version strings numerically, segment by segment.
pub fn compare(v1: &str, v2: &str) -> Ordering {
    let n1 = normalize(v1);
    let n2 = normalize(v2);

    let parts1: Vec<u64> = n1.split('.').filter_map(|s| s.parse().ok()).collect();
    let parts2: Vec<u64> = n2.split('.').filter_map(|s| s.parse().ok()).collect();

    let max_len = parts1.len().max(parts2.len());

    for i in 0..max_len {
        let p1 = parts1.get(i).copied().unwrap_or(0);
        let p2 = parts2.get(i).copied().unwrap_or(0);

        match p1.cmp(&p2) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}
