// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    fs,
    io::{Read, Seek, SeekFrom},
    path::{Component, Path, PathBuf},
};

use flate2::read::GzDecoder;

use crate::{Error, Result, http::Transport};

/// maps an archive entry's relative path to where it lands below the
/// destination. `None` skips the entry.
pub type PathRewrite<'a> = &'a dyn Fn(&Path) -> Option<PathBuf>;

/// drops the first path segment; release tarballs nest everything under
/// `mediawiki-<version>/`.
pub fn strip_leading_component(path: &Path) -> Option<PathBuf> {
    let rest: PathBuf = path.components().skip(1).collect();
    (!rest.as_os_str().is_empty()).then_some(rest)
}

/// downloads `url` to a private temporary file and unpacks it into `dest`.
/// the temporary file is removed on every exit path.
pub fn fetch_and_stage(
    transport: &dyn Transport,
    url: &str,
    dest: &Path,
    rewrite: Option<PathRewrite<'_>>,
) -> Result<()> {
    let mut file = tempfile::Builder::new()
        .prefix("mediawiki-updater-")
        .suffix(".tar.gz")
        .tempfile()?;

    log::debug!("**fetch:** {url} -> {}", file.path().display());
    let bytes = transport.download(url, file.as_file_mut())?;
    log::debug!("**fetch:** received {bytes} bytes");

    let archive = file.as_file_mut();
    archive.seek(SeekFrom::Start(0))?;

    unpack_archive(archive, dest, rewrite)
        .map_err(|e| match e {
            Error::ExtractionFailed(msg) => Error::extraction(format!("{url}: {msg}")),
            other => other,
        })
}

/// gunzips and untars `reader` into `dest`, creating it if needed.
pub fn unpack_archive<R: Read>(
    reader: R,
    dest: &Path,
    rewrite: Option<PathRewrite<'_>>,
) -> Result<()> {
    fs::create_dir_all(dest)?;
    let root = dest.canonicalize()?;

    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.set_preserve_permissions(true);

    let entries = archive
        .entries()
        .map_err(|e| Error::extraction(format!("read archive: {e}")))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| Error::extraction(format!("read entry: {e}")))?;

        let entry_type = entry.header().entry_type();
        if entry_type.is_pax_global_extensions() || entry_type.is_pax_local_extensions() {
            continue;
        }

        let raw = entry
            .path()
            .map_err(|e| Error::extraction(format!("entry path: {e}")))?
            .into_owned();

        let mut relative = sanitize(&raw)?;
        if let Some(rewrite) = rewrite {
            let Some(rewritten) = rewrite(&relative) else {
                continue;
            };
            relative = sanitize(&rewritten)?;
        }

        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = root.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
            // a symlink unpacked earlier must not redirect later entries
            if !parent.canonicalize()?.starts_with(&root) {
                return Err(Error::UnsafeArchivePath(raw.display().to_string()));
            }
        }

        if entry_type.is_hard_link() {
            let source = hard_link_source(&link_name(&entry, &raw)?, &root, rewrite)?;
            if fs::symlink_metadata(&target).is_ok() {
                fs::remove_file(&target)?;
            }
            fs::hard_link(&source, &target)
                .map_err(|e| Error::extraction(format!("link {}: {e}", relative.display())))?;
            continue;
        }

        if entry_type.is_symlink() && !link_stays_inside(&relative, &link_name(&entry, &raw)?) {
            return Err(Error::UnsafeArchivePath(raw.display().to_string()));
        }

        entry
            .unpack(&target)
            .map_err(|e| Error::extraction(format!("unpack {}: {e}", relative.display())))?;
    }

    Ok(())
}

fn link_name<R: Read>(entry: &tar::Entry<'_, R>, raw: &Path) -> Result<PathBuf> {
    entry
        .link_name()
        .map_err(|e| Error::extraction(format!("link name of {}: {e}", raw.display())))?
        .map(|name| name.into_owned())
        .ok_or_else(|| Error::UnsafeArchivePath(raw.display().to_string()))
}

/// hard link names are archive paths, so they go through the same rewrite as
/// entry paths and must name a file already unpacked below `root`.
fn hard_link_source(
    link: &Path,
    root: &Path,
    rewrite: Option<PathRewrite<'_>>,
) -> Result<PathBuf> {
    let refused = || Error::UnsafeArchivePath(link.display().to_string());

    let mut relative = sanitize(link)?;
    if let Some(rewrite) = rewrite {
        relative = sanitize(&rewrite(&relative).ok_or_else(refused)?)?;
    }
    if relative.as_os_str().is_empty() {
        return Err(refused());
    }

    let source = root
        .join(&relative)
        .canonicalize()
        .map_err(|e| Error::extraction(format!("link target {}: {e}", relative.display())))?;
    if !source.starts_with(root) || !source.is_file() {
        return Err(refused());
    }

    Ok(source)
}

/// whether a symlink stored at `relative` and pointing at `link` resolves to
/// somewhere inside the tree `relative` is rooted in. absolute targets never do.
pub(crate) fn link_stays_inside(relative: &Path, link: &Path) -> bool {
    let mut depth = relative
        .parent()
        .map_or(0, |parent| parent.components().count());

    for component in link.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(up) => depth = up,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }

    true
}

/// keeps only normal segments; `..`, a root or a prefix is refused.
fn sanitize(path: &Path) -> Result<PathBuf> {
    let mut clean = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::UnsafeArchivePath(path.display().to_string()));
            }
        }
    }

    Ok(clean)
}
