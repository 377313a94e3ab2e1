//! `clean` (spec §3: "Cache root... may be pruned at any time without
//! correctness impact"). Does not touch the store or journal, so it
//! does not take the lock.

use crate::context::OpsCtx;
use spm_errors::Error;

/// Remove every cached archive.
///
/// # Errors
///
/// Propagates I/O errors other than "cache directory absent".
pub async fn clean(ctx: &OpsCtx) -> Result<(), Error> {
    let cache_dir = ctx.config.cache_path();
    match tokio::fs::remove_dir_all(&cache_dir).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
