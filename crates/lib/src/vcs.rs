//! Version-control checkout.
//!
//! Projects download their sources through the [`Checkout`] trait. The
//! production implementation, [`GitCheckout`], clones with `gix` and treats an
//! existing checkout as done when its `HEAD` already sits on the requested
//! tag.

use std::fs;
use std::path::{Path, PathBuf};

use gix::remote::Direction;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while materializing a source tree.
#[derive(Debug, Error)]
pub enum DownloadError {
  /// Failed to create the destination's parent directory.
  #[error("failed to create directory '{0}': {1}")]
  CreateDir(PathBuf, #[source] std::io::Error),

  /// Failed to clone a git repository.
  #[error("failed to clone repository '{url}': {source}")]
  Clone {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// Failed to open an existing git repository.
  #[error("failed to open repository at '{path}': {source}")]
  Open {
    path: PathBuf,
    #[source]
    source: Box<gix::open::Error>,
  },

  /// Failed to fetch from remote.
  #[error("failed to fetch from '{url}': {source}")]
  Fetch {
    url: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  /// The requested tag does not exist.
  #[error("revision '{rev}' not found in repository")]
  RevisionNotFound { rev: String },

  /// The destination holds a checkout of a different revision.
  #[error("'{}' is checked out at {actual}, not '{expected}' (use --force to re-fetch)", path.display())]
  RevisionMismatch {
    path: PathBuf,
    expected: String,
    actual: String,
  },

  /// The destination exists but is not a git checkout.
  #[error("'{0}' exists and is not a git checkout (use --force to replace it)")]
  NotACheckout(PathBuf),

  /// Failed to remove a stale checkout.
  #[error("failed to remove '{path}': {source}")]
  Remove {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Materializes a repository at a destination path.
pub trait Checkout {
  /// Check out `url` into `dest`, at `tag` when given.
  ///
  /// Succeeds without network access when `dest` already holds the requested
  /// revision. With `force`, a mismatched or foreign directory is replaced.
  fn checkout(&self, url: &str, dest: &Path, tag: Option<&str>, force: bool) -> Result<(), DownloadError>;

  /// Check that an installed `dest` still holds the requested revision.
  ///
  /// Directories the implementation does not manage are accepted as-is.
  fn verify(&self, _url: &str, _dest: &Path, _tag: Option<&str>) -> Result<(), DownloadError> {
    Ok(())
  }
}

/// Git checkout backed by `gix`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCheckout;

impl Checkout for GitCheckout {
  fn checkout(&self, url: &str, dest: &Path, tag: Option<&str>, force: bool) -> Result<(), DownloadError> {
    if dest.join(".git").exists() {
      match verify_existing(url, dest, tag) {
        Ok(()) => return Ok(()),
        Err(err @ DownloadError::RevisionMismatch { .. }) if force => {
          warn!(path = %dest.display(), "{}; replacing", err);
          remove_dir(dest)?;
        }
        Err(err) => return Err(err),
      }
    } else if is_non_empty_dir(dest) {
      if !force {
        return Err(DownloadError::NotACheckout(dest.to_path_buf()));
      }
      warn!(path = %dest.display(), "replacing non-git directory");
      remove_dir(dest)?;
    }

    if let Some(parent) = dest.parent() {
      fs::create_dir_all(parent).map_err(|e| DownloadError::CreateDir(parent.to_path_buf(), e))?;
    }

    info!(url, tag = tag.unwrap_or("HEAD"), path = %dest.display(), "cloning repository");
    clone_repo(url, dest, tag)
  }

  fn verify(&self, url: &str, dest: &Path, tag: Option<&str>) -> Result<(), DownloadError> {
    if !dest.join(".git").exists() {
      debug!(path = %dest.display(), "installed directory is not a git checkout; accepting it");
      return Ok(());
    }
    verify_existing(url, dest, tag)
  }
}

/// Accept an existing checkout if it matches the requested revision.
fn verify_existing(url: &str, dest: &Path, tag: Option<&str>) -> Result<(), DownloadError> {
  let repo = gix::open(dest).map_err(|e| DownloadError::Open {
    path: dest.to_path_buf(),
    source: Box::new(e),
  })?;

  let Some(tag) = tag else {
    debug!(path = %dest.display(), "existing checkout tracks trunk");
    return Ok(());
  };

  let wanted = match resolve_commit(&repo, tag) {
    Some(id) => id,
    None => {
      fetch_updates(&repo, url)?;
      resolve_commit(&repo, tag).ok_or_else(|| DownloadError::RevisionNotFound { rev: tag.to_string() })?
    }
  };

  let head = repo
    .head_id()
    .map(|id| id.detach())
    .map_err(|_| DownloadError::RevisionNotFound {
      rev: "HEAD".to_string(),
    })?;

  if head == wanted {
    debug!(path = %dest.display(), tag, "checkout already at requested revision");
    Ok(())
  } else {
    Err(DownloadError::RevisionMismatch {
      path: dest.to_path_buf(),
      expected: tag.to_string(),
      actual: head.to_hex().to_string(),
    })
  }
}

/// Resolve a tag or branch to the commit it points at.
fn resolve_commit(repo: &gix::Repository, rev: &str) -> Option<gix::ObjectId> {
  let spec = format!("{}^{{commit}}", rev);
  repo.rev_parse_single(spec.as_str()).ok().map(|id| id.detach())
}

/// Clone a git repository to the specified path.
fn clone_repo(url: &str, dest: &Path, tag: Option<&str>) -> Result<(), DownloadError> {
  let clone_err = |e: Box<dyn std::error::Error + Send + Sync>| DownloadError::Clone {
    url: url.to_string(),
    source: e,
  };

  let mut prepared = gix::prepare_clone(url, dest).map_err(|e| clone_err(Box::new(e)))?;
  if let Some(tag) = tag {
    prepared = prepared
      .with_ref_name(Some(tag))
      .map_err(|_| DownloadError::RevisionNotFound { rev: tag.to_string() })?;
  }

  let (mut checkout, _outcome) = prepared
    .fetch_then_checkout(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  checkout
    .main_worktree(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| clone_err(Box::new(e)))?;

  Ok(())
}

/// Fetch updates from the remote.
fn fetch_updates(repo: &gix::Repository, url: &str) -> Result<(), DownloadError> {
  debug!(url, "fetching updates");
  let fetch_err = |e: Box<dyn std::error::Error + Send + Sync>| DownloadError::Fetch {
    url: url.to_string(),
    source: e,
  };

  let remote = repo
    .find_default_remote(Direction::Fetch)
    .ok_or_else(|| fetch_err("no remote configured for repository".into()))?
    .map_err(|e| fetch_err(Box::new(e)))?;

  remote
    .connect(Direction::Fetch)
    .map_err(|e| fetch_err(Box::new(e)))?
    .prepare_fetch(gix::progress::Discard, Default::default())
    .map_err(|e| fetch_err(Box::new(e)))?
    .receive(gix::progress::Discard, &gix::interrupt::IS_INTERRUPTED)
    .map_err(|e| fetch_err(Box::new(e)))?;

  Ok(())
}

/// Abbreviated commit id `HEAD` points at, if `path` is a git checkout.
pub fn head_revision(path: &Path) -> Option<String> {
  let repo = gix::open(path).ok()?;
  let head = repo.head_id().ok()?;
  head.shorten().ok().map(|prefix| prefix.to_string())
}

fn is_non_empty_dir(path: &Path) -> bool {
  fs::read_dir(path).map(|mut entries| entries.next().is_some()).unwrap_or(false)
}

fn remove_dir(path: &Path) -> Result<(), DownloadError> {
  fs::remove_dir_all(path).map_err(|source| DownloadError::Remove {
    path: path.to_path_buf(),
    source,
  })
}
