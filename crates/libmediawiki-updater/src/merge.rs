// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use crate::{Error, MergeStats, Result, archive::link_stays_inside};

/// paths a fresh install must never overwrite.
pub const DEFAULT_IGNORE_PATHS: &[&str] = &["LocalSettings.php", ".htaccess", "images"];

/// target-relative paths that survive a merge untouched.
///
/// matching is by whole path segments: `images` covers `images/a.png` but not
/// `images2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSet {
    entries: Vec<PathBuf>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_PATHS)
    }
}

impl IgnoreSet {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = paths
            .into_iter()
            .map(|p| normalize(Path::new(p.as_ref())))
            .filter(|p| !p.as_os_str().is_empty())
            .collect();

        Self { entries }
    }

    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in IgnoreSet::new(paths).entries {
            if !self.entries.contains(&path) {
                self.entries.push(path);
            }
        }
    }

    pub fn is_ignored(&self, relative: &Path) -> bool {
        let relative = normalize(relative);
        self.entries.iter().any(|entry| relative.starts_with(entry))
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// copies the staging tree onto `dst`, skipping ignored paths.
///
/// existing files are overwritten, everything else in `dst` is left alone.
/// mode bits follow the staged copy.
pub fn merge_tree(src: &Path, dst: &Path, ignore: &IgnoreSet) -> Result<MergeStats> {
    let mut stats = MergeStats::default();
    merge_dir(src, dst, Path::new(""), ignore, &mut stats)?;

    log::info!(
        "**merge:** {} files, {} directories, {} ignored",
        stats.files,
        stats.directories,
        stats.ignored
    );
    Ok(stats)
}

fn merge_dir(
    src: &Path,
    dst: &Path,
    relative: &Path,
    ignore: &IgnoreSet,
    stats: &mut MergeStats,
) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| Error::merge(dst, e))?;

    let mut entries = fs::read_dir(src)
        .map_err(|e| Error::merge(src, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::merge(src, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name();
        let rel = relative.join(&name);
        let dst_path = dst.join(&name);

        if ignore.is_ignored(&rel) {
            log::debug!("**merge:** keeping {}", rel.display());
            stats.ignored += 1;
            continue;
        }

        let file_type = entry.file_type().map_err(|e| Error::merge(&path, e))?;

        if file_type.is_dir() {
            merge_dir(&path, &dst_path, &rel, ignore, stats)?;
            let permissions = fs::metadata(&path)
                .map_err(|e| Error::merge(&path, e))?
                .permissions();
            fs::set_permissions(&dst_path, permissions).map_err(|e| Error::merge(&dst_path, e))?;
            stats.directories += 1;
        } else if file_type.is_symlink() {
            let link = fs::read_link(&path).map_err(|e| Error::merge(&path, e))?;
            if !link_stays_inside(&rel, &link) {
                log::warn!(
                    "**merge:** skipping {} -> {}, target is outside the tree",
                    rel.display(),
                    link.display()
                );
                stats.ignored += 1;
                continue;
            }
            copy_symlink(&path, &link, &dst_path)?;
            stats.files += 1;
        } else {
            fs::copy(&path, &dst_path).map_err(|e| Error::merge(&dst_path, e))?;
            stats.files += 1;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(_src: &Path, link: &Path, dst: &Path) -> Result<()> {
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst).map_err(|e| Error::merge(dst, e))?;
    }

    std::os::unix::fs::symlink(link, dst).map_err(|e| Error::merge(dst, e))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, _link: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(|e| Error::merge(dst, e))
}
