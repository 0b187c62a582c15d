// SPDX-License-Identifier: MIT OR Apache-2.0

use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{
    ComponentKind, ComponentSpec, Error, Result, UpdateOptions, archive, catalog::CatalogResolver,
    http::Transport, options::Endpoints,
};

/// installs single extensions and skins into a staging directory.
pub struct Installer<'a> {
    transport: &'a dyn Transport,
    endpoints: &'a Endpoints,
    default_branch: &'a str,
}

impl<'a> Installer<'a> {
    pub fn new(transport: &'a dyn Transport, options: &'a UpdateOptions) -> Self {
        Self {
            transport,
            endpoints: &options.endpoints,
            default_branch: &options.default_branch,
        }
    }

    /// places `spec` below `dest`. catalog components fall back to
    /// `fallback_version` when they do not pin one.
    pub fn install(
        &self,
        spec: &ComponentSpec,
        kind: ComponentKind,
        dest: &Path,
        fallback_version: &str,
    ) -> Result<()> {
        match spec {
            ComponentSpec::Catalog { name, version } => {
                let version = version.as_deref().unwrap_or(fallback_version);
                self.install_from_catalog(name, version, kind, dest)
            }
            ComponentSpec::Repository { url, branch } => {
                let branch = branch.as_deref().unwrap_or(self.default_branch);
                install_from_repository(url, branch, dest).map(|_| ())
            }
        }
    }

    fn install_from_catalog(
        &self,
        name: &str,
        version: &str,
        kind: ComponentKind,
        dest: &Path,
    ) -> Result<()> {
        let listing_url = self.endpoints.catalog_url(kind);
        let resolver = CatalogResolver::new(self.transport);

        let url = resolver
            .find_download_url(listing_url, name, version)?
            .ok_or_else(|| Error::not_found(format!("{kind} {name} ({version})")))?;

        log::info!("**{kind}:** downloading {name} {version}");
        archive::fetch_and_stage(self.transport, &url, dest, None)
    }
}

/// shallow-clones `url` at `branch` into `dest/<basename>` and strips the
/// repository metadata, leaving a plain source tree.
pub fn install_from_repository(url: &str, branch: &str, dest: &Path) -> Result<PathBuf> {
    let basename =
        repo_basename(url).ok_or_else(|| Error::checkout(format!("no repository name in {url}")))?;
    let checkout = dest.join(basename);

    fs::create_dir_all(dest)?;
    log::info!("**git:** cloning {url} ({branch})");

    let output = Command::new("git")
        .args(clone_args(url, branch, &checkout))
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::checkout(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::checkout(format!(
            "git clone {url} failed: {}",
            stderr.trim()
        )));
    }

    remove_vcs_metadata(&checkout)?;
    Ok(checkout)
}

fn clone_args(url: &str, branch: &str, checkout: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["clone", "--branch", branch, "--depth", "1", "--single-branch", url]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(checkout.as_os_str().to_owned());
    args
}

/// last path segment of a clone url without a trailing `.git`.
pub fn repo_basename(url: &str) -> Option<&str> {
    let segment = url
        .trim_end_matches('/')
        .rsplit(['/', ':'])
        .next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    (!name.is_empty()).then_some(name)
}

pub fn remove_vcs_metadata(checkout: &Path) -> Result<()> {
    let git_dir = checkout.join(".git");

    if git_dir.is_dir() {
        fs::remove_dir_all(&git_dir)?;
    } else if git_dir.exists() {
        fs::remove_file(&git_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockTransport, listing_page, tarball};

    fn options() -> UpdateOptions {
        UpdateOptions::new().with_endpoints(Endpoints {
            release_index: "https://releases.example.org/mediawiki/".to_string(),
            extensions: "https://extdist.example.org/dist/extensions/".to_string(),
            skins: "https://extdist.example.org/dist/skins/".to_string(),
        })
    }

    #[test]
    fn basename_strips_git_suffix() {
        let cases = [
            ("https://github.com/wikimedia/mediawiki-skins-Citizen.git", Some("mediawiki-skins-Citizen")),
            ("https://gitlab.example.org/group/Foo/", Some("Foo")),
            ("git@github.com:owner/Bar.git", Some("Bar")),
            ("https://example.org/", Some("example.org")),
            (".git", None),
        ];

        for (url, expected) in cases {
            assert_eq!(repo_basename(url), expected, "{url}");
        }
    }

    #[test]
    fn clone_is_shallow_and_single_branch() {
        let args = clone_args("https://example.org/Foo.git", "REL1_43", Path::new("/stage/skins/Foo"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            vec![
                "clone",
                "--branch",
                "REL1_43",
                "--depth",
                "1",
                "--single-branch",
                "https://example.org/Foo.git",
                "/stage/skins/Foo",
            ]
        );
    }

    #[test]
    fn removes_git_metadata_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/master").unwrap();
        fs::write(dir.path().join("skin.json"), "{}").unwrap();

        remove_vcs_metadata(dir.path()).unwrap();

        assert!(!dir.path().join(".git").exists());
        assert!(dir.path().join("skin.json").is_file());
    }

    #[test]
    fn catalog_component_uses_fallback_version() {
        let listing = "https://extdist.example.org/dist/skins/";
        let archive_url = "https://extdist.example.org/dist/skins/Vector-REL1_43-abc.tar.gz";
        let transport = MockTransport::new()
            .with_page(listing, listing_page(&["Vector-REL1_42-old.tar.gz", "Vector-REL1_43-abc.tar.gz"]))
            .with_file(archive_url, tarball(&[("Vector/skin.json", "{}", 0o644)]));
        let options = options();
        let installer = Installer::new(&transport, &options);
        let dir = tempfile::tempdir().unwrap();

        let spec = ComponentSpec::Catalog {
            name: "Vector".to_string(),
            version: None,
        };
        installer
            .install(&spec, ComponentKind::Skin, dir.path(), "REL1_43")
            .unwrap();

        assert!(dir.path().join("Vector/skin.json").is_file());
        assert_eq!(transport.requests(), vec![listing.to_string(), archive_url.to_string()]);
    }

    #[test]
    fn pinned_catalog_version_wins() {
        let listing = "https://extdist.example.org/dist/extensions/";
        let archive_url = "https://extdist.example.org/dist/extensions/Cite-master-123.tar.gz";
        let transport = MockTransport::new()
            .with_page(listing, listing_page(&["Cite-REL1_43-abc.tar.gz", "Cite-master-123.tar.gz"]))
            .with_file(archive_url, tarball(&[("Cite/extension.json", "{}", 0o644)]));
        let options = options();
        let installer = Installer::new(&transport, &options);
        let dir = tempfile::tempdir().unwrap();

        let spec = ComponentSpec::Catalog {
            name: "Cite".to_string(),
            version: Some("master".to_string()),
        };
        installer
            .install(&spec, ComponentKind::Extension, dir.path(), "REL1_43")
            .unwrap();

        assert!(transport.requests().contains(&archive_url.to_string()));
    }

    #[test]
    fn unknown_catalog_component_is_not_found() {
        let listing = "https://extdist.example.org/dist/extensions/";
        let transport = MockTransport::new().with_page(listing, listing_page(&["Cite-REL1_43-abc.tar.gz"]));
        let options = options();
        let installer = Installer::new(&transport, &options);
        let dir = tempfile::tempdir().unwrap();

        let spec = ComponentSpec::Catalog {
            name: "Missing".to_string(),
            version: None,
        };
        let err = installer
            .install(&spec, ComponentKind::Extension, dir.path(), "REL1_43")
            .unwrap_err();

        assert!(matches!(err, Error::ComponentNotFound(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["-c", "user.name=updater", "-c", "user.email=updater@example.org"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }

    /// a one-commit repository on `REL1_43`, or `None` when git is missing.
    fn local_skin_repository(root: &Path) -> Option<PathBuf> {
        if Command::new("git").arg("--version").output().is_err() {
            eprintln!("git not available, skipping");
            return None;
        }

        let repo = root.join("Citizen");
        fs::create_dir_all(&repo).unwrap();
        git(&repo, &["init", "-q"]);
        git(&repo, &["checkout", "-q", "-b", "REL1_43"]);
        fs::write(repo.join("skin.json"), "{\"name\": \"Citizen\"}").unwrap();
        git(&repo, &["add", "skin.json"]);
        git(&repo, &["commit", "-q", "-m", "initial"]);

        Some(repo)
    }

    #[test]
    fn repository_component_is_cloned_without_metadata() {
        let scratch = tempfile::tempdir().unwrap();
        let Some(repo) = local_skin_repository(scratch.path()) else {
            return;
        };
        let dest = scratch.path().join("staging/skins");

        let transport = MockTransport::new();
        let options = options();
        let installer = Installer::new(&transport, &options);
        let spec = ComponentSpec::Repository {
            url: format!("file://{}", repo.display()),
            branch: Some("REL1_43".to_string()),
        };
        installer
            .install(&spec, ComponentKind::Skin, &dest, "REL1_43")
            .unwrap();

        let checkout = dest.join("Citizen");
        assert_eq!(
            fs::read_to_string(checkout.join("skin.json")).unwrap(),
            "{\"name\": \"Citizen\"}"
        );
        assert!(!checkout.join(".git").exists());
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn missing_branch_is_a_checkout_error() {
        let scratch = tempfile::tempdir().unwrap();
        let Some(repo) = local_skin_repository(scratch.path()) else {
            return;
        };
        let dest = scratch.path().join("staging/skins");

        let err = install_from_repository(&format!("file://{}", repo.display()), "REL1_99", &dest)
            .unwrap_err();

        assert!(matches!(err, Error::CheckoutFailed(_)));
        assert!(!dest.join("Citizen").exists());
    }
}
