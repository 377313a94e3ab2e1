//! Self-upgrade (spec §4.9 "upgrade"): independent of the package lock
//! entirely — it replaces the engine and sandbox helper binaries, not
//! anything under the store or journal.

use crate::context::OpsCtx;
use spm_errors::Error;
use spm_types::Version;

/// Report of whether an upgrade actually happened.
#[derive(Debug, Clone, serde::Serialize)]
pub struct UpgradeReport {
    pub from: String,
    pub to: String,
    pub upgraded: bool,
}

/// Compare the remote engine version against the local record; if
/// strictly newer, download the engine and sandbox helper binaries
/// into their canonical paths, mark them executable, and record the new
/// version locally.
///
/// # Errors
///
/// Propagates network and I/O errors.
pub async fn upgrade(ctx: &OpsCtx) -> Result<UpgradeReport, Error> {
    let local = read_local_version(ctx).await?;
    let remote_text = spm_net::fetch_index_text(&ctx.net, spm_config::constants::ENGINE_VERSION_URL).await?;
    let remote = remote_text.trim().to_string();

    if Version::new(remote.clone()) <= Version::new(local.clone()) {
        return Ok(UpgradeReport {
            from: local.clone(),
            to: local,
            upgraded: false,
        });
    }

    let engine_path = ctx.config.engine_install_path();
    let helper_path = ctx.config.sandbox_helper_install_path();

    spm_net::download_to_file(
        &ctx.net,
        spm_config::constants::ENGINE_ARTIFACT_URL,
        &engine_path,
        ctx.events.as_ref(),
    )
    .await?;
    make_executable(&engine_path).await?;

    spm_net::download_to_file(
        &ctx.net,
        spm_config::constants::SANDBOX_HELPER_ARTIFACT_URL,
        &helper_path,
        ctx.events.as_ref(),
    )
    .await?;
    make_executable(&helper_path).await?;

    write_local_version(ctx, &remote).await?;

    Ok(UpgradeReport {
        from: local,
        to: remote,
        upgraded: true,
    })
}

async fn read_local_version(ctx: &OpsCtx) -> Result<String, Error> {
    match tokio::fs::read_to_string(ctx.config.local_version_path()).await {
        Ok(text) => Ok(text.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok("0".to_string()),
        Err(e) => Err(e.into()),
    }
}

async fn write_local_version(ctx: &OpsCtx, version: &str) -> Result<(), Error> {
    let path = ctx.config.local_version_path();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, version).await.map_err(Into::into)
}

#[cfg(unix)]
async fn make_executable(path: &std::path::Path) -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = tokio::fs::metadata(path).await?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    tokio::fs::set_permissions(path, perms).await.map_err(Into::into)
}

#[cfg(not(unix))]
async fn make_executable(_path: &std::path::Path) -> Result<(), Error> {
    Ok(())
}
