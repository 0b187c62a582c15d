// SPDX-License-Identifier: MIT OR Apache-2.0

//! the update pipeline: stage core, stage extensions, stage skins, then
//! merge the staging tree into the target.

use std::{fs, path::Path};

use tempfile::TempDir;

use crate::{
    ComponentKind, Configuration, Error, Result, UpdateOptions, UpdateSummary, archive,
    catalog::CatalogResolver,
    http::{HttpClient, Transport},
    installer::Installer,
    merge,
    version::ReleaseLine,
};

const STAGING_PREFIX: &str = "mediawiki-temp-";

/// runs a full update of `target` over https.
pub fn update(config: &Configuration, target: &Path, options: &UpdateOptions) -> Result<UpdateSummary> {
    let client = HttpClient::new()?;
    update_with_transport(config, target, options, &client)
}

/// runs a full update of `target` through `transport`.
///
/// the core is required: any failure staging it aborts the run. extensions
/// and skins are best effort and their failures end up in the summary. the
/// staging directory is removed however the run ends.
pub fn update_with_transport(
    config: &Configuration,
    target: &Path,
    options: &UpdateOptions,
    transport: &dyn Transport,
) -> Result<UpdateSummary> {
    let core_version = config.core.version.trim();
    if core_version.is_empty() {
        return Err(Error::MissingCoreVersion);
    }
    let line = ReleaseLine::parse(core_version)?;

    let staging = create_staging(options)?;
    log::debug!("**stage:** using {}", staging.path().display());

    let mut run = UpdateRun {
        config,
        options,
        transport,
        staging: &staging,
        line,
        summary: UpdateSummary::new(core_version),
    };

    run.stage_core()?;
    for kind in ComponentKind::all() {
        run.stage_components(*kind)?;
    }
    run.merge_into(target)?;

    let summary = run.summary;
    finish(staging);
    Ok(summary)
}

/// everything one run needs, in place of process-wide state.
struct UpdateRun<'a> {
    config: &'a Configuration,
    options: &'a UpdateOptions,
    transport: &'a dyn Transport,
    staging: &'a TempDir,
    line: ReleaseLine,
    summary: UpdateSummary,
}

impl UpdateRun<'_> {
    fn stage_core(&self) -> Result<()> {
        let version = &self.summary.core_version;
        log::info!("**core:** staging mediawiki {version}");

        let resolver = CatalogResolver::new(self.transport);
        let staged = resolver
            .find_core_download_url(&self.options.endpoints.release_index, &self.line, version)
            .and_then(|url| {
                archive::fetch_and_stage(
                    self.transport,
                    &url,
                    self.staging.path(),
                    Some(&archive::strip_leading_component),
                )
            });

        staged.map_err(|e| Error::step("stage mediawiki core", e))
    }

    fn stage_components(&mut self, kind: ComponentKind) -> Result<()> {
        let components = self.config.components(kind);
        if components.is_empty() {
            log::info!("**{kind}:** none configured, skipping");
            return Ok(());
        }

        let dest = self.staging.path().join(kind.section());
        fs::create_dir_all(&dest)?;

        let fallback = self.line.tag();
        let installer = Installer::new(self.transport, self.options);

        for spec in components {
            log::info!("**{kind}:** installing {spec}");

            match installer.install(spec, kind, &dest, &fallback) {
                Ok(()) => self.summary.add_success(kind, spec.to_string()),
                Err(e) => {
                    log::warn!("**{kind}:** {spec} skipped: {e}");
                    self.summary.add_failure(kind, spec.to_string(), e.to_string());
                }
            }
        }

        Ok(())
    }

    fn merge_into(&mut self, target: &Path) -> Result<()> {
        log::info!("**merge:** copying into {}", target.display());
        self.summary.merged = merge::merge_tree(self.staging.path(), target, &self.options.ignore)?;
        Ok(())
    }
}

fn create_staging(options: &UpdateOptions) -> Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);

    match &options.staging_dir {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            Ok(builder.tempdir_in(parent)?)
        }
        None => Ok(builder.tempdir()?),
    }
}

fn finish(staging: TempDir) {
    let path = staging.path().to_path_buf();
    if let Err(e) = staging.close() {
        log::warn!("**stage:** failed to remove {}: {e}", path.display());
    }
}
