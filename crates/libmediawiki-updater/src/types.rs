// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};

/// the two kinds of add-on a wiki can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Extension,
    Skin,
}

impl ComponentKind {
    /// manifest section and staging/target subdirectory name.
    pub const fn section(self) -> &'static str {
        match self {
            Self::Extension => "extensions",
            Self::Skin => "skins",
        }
    }

    pub const fn all() -> &'static [ComponentKind] {
        &[Self::Extension, Self::Skin]
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Extension => write!(f, "extension"),
            Self::Skin => write!(f, "skin"),
        }
    }
}

/// counters reported by the merge step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub files: usize,
    pub directories: usize,
    pub ignored: usize,
}

/// outcome of a completed update run.
///
/// a run that returns a summary always installed the core and merged the
/// staging tree; `failed` lists add-ons that were skipped along the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSummary {
    pub core_version: String,
    pub succeeded: Vec<(ComponentKind, String)>,
    pub failed: Vec<(ComponentKind, String, String)>,
    pub merged: MergeStats,
}

impl UpdateSummary {
    pub fn new(core_version: impl Into<String>) -> Self {
        Self {
            core_version: core_version.into(),
            ..Self::default()
        }
    }

    pub fn add_success(&mut self, kind: ComponentKind, name: String) {
        self.succeeded.push((kind, name));
    }

    pub fn add_failure(&mut self, kind: ComponentKind, name: String, reason: String) {
        self.failed.push((kind, name, reason));
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// JSON output structures for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}
