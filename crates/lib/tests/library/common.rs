//! Test doubles shared by library integration tests.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use prereq_lib::vcs::{Checkout, DownloadError};

/// Checkout that creates the destination instead of cloning.
#[derive(Default)]
pub struct LocalCheckout {
  pub cloned: RefCell<Vec<String>>,
}

impl Checkout for LocalCheckout {
  fn checkout(&self, url: &str, dest: &Path, _tag: Option<&str>, _force: bool) -> Result<(), DownloadError> {
    fs::create_dir_all(dest).map_err(|e| DownloadError::CreateDir(dest.to_path_buf(), e))?;
    self.cloned.borrow_mut().push(url.to_string());
    Ok(())
  }
}
