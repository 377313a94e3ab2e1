//! `run` (spec §4.4 "Run mode", §4.9): never mutates `current` (spec §9
//! open question 2 — only `switch` does that).

use crate::context::OpsCtx;
use spm_errors::Error;
use spm_types::{PackageSpec, MANIFEST_RELATIVE_PATH};
use std::process::ExitStatus;

/// Run `binary` from `spec`'s resolved version (the explicit version if
/// given, else `current`) inside the sandbox, forwarding `args`.
///
/// # Errors
///
/// [`Error::PackageNotInstalled`] if no version can be resolved;
/// propagates manifest load and sandbox errors otherwise.
pub async fn run(
    ctx: &OpsCtx,
    spec: &PackageSpec,
    binary: &str,
    args: &[String],
) -> Result<ExitStatus, Error> {
    let version = match &spec.version {
        Some(v) => v.to_string(),
        None => ctx
            .store
            .current_version(&spec.name)
            .await
            .ok_or_else(|| Error::PackageNotInstalled(spec.name.clone()))?,
    };

    let artifact_root = ctx.store.version_dir(&spec.name, &version);
    let manifest_path = artifact_root.join(MANIFEST_RELATIVE_PATH);
    let manifest = spm_manifest::load_file(&manifest_path).await?;

    spm_sandbox::run_binary(
        &ctx.config.sandbox_helper(),
        &artifact_root,
        &manifest.sandbox,
        binary,
        args,
        ctx.events.as_ref(),
    )
    .await
}
