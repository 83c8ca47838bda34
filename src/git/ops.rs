use std::num::NonZeroU32;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use gix::progress::Discard;
use tracing::info;

use crate::error::{ApkgraphError, Result};

/// Clones `url` into `dest`, optionally limited to the last `depth` commits.
///
/// `dest` must not exist yet or be empty.
pub fn clone_repo(url: &str, dest: &Path, depth: Option<u32>) -> Result<()> {
    info!(url, dest = %dest.display(), ?depth, "cloning repository");
    let mut prepare =
        gix::prepare_clone(url, dest).map_err(|err| ApkgraphError::Git(anyhow::Error::new(err)))?;

    if let Some(depth) = depth.and_then(NonZeroU32::new) {
        prepare = prepare.with_shallow(gix::remote::fetch::Shallow::DepthAtRemote(depth));
    }

    let cancel = AtomicBool::new(false);
    let (mut checkout, _outcome) = prepare
        .fetch_then_checkout(Discard, &cancel)
        .map_err(|err| ApkgraphError::Git(anyhow::Error::new(err)))?;

    checkout
        .main_worktree(Discard, &cancel)
        .map_err(|err| ApkgraphError::Git(anyhow::Error::new(err)))?;

    Ok(())
}
