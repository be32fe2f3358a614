//! Feature toggles handed to the workspace generator.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Ordered set of `name -> enabled` build toggles.
///
/// Setting a name twice replaces the earlier value in place, so the
/// serialized order is the order names were first introduced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet(Vec<(String, bool)>);

impl FeatureSet {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse a `name=0|1` comma-separated list. Any non-zero value enables.
  pub fn parse(spec: &str) -> Self {
    let mut set = Self::new();
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
      let (name, value) = item.split_once('=').unwrap_or((item, "1"));
      set.set(name.trim(), value.trim() != "0");
    }
    set
  }

  pub fn set(&mut self, name: &str, enabled: bool) -> &mut Self {
    match self.0.iter_mut().find(|(n, _)| n == name) {
      Some(entry) => entry.1 = enabled,
      None => self.0.push((name.to_string(), enabled)),
    }
    self
  }

  pub fn get(&self, name: &str) -> Option<bool> {
    self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
    self.0.iter().map(|(n, v)| (n.as_str(), *v))
  }

  /// Contents of an MPC `default.features` file.
  pub fn to_feature_file(&self) -> String {
    let mut out = String::new();
    for (name, enabled) in self.iter() {
      out.push_str(&format!("{} = {}\n", name, u8::from(enabled)));
    }
    out
  }

  pub fn write_feature_file(&self, path: &Path) -> io::Result<()> {
    fs::write(path, self.to_feature_file())
  }
}

impl fmt::Display for FeatureSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let items: Vec<String> = self.iter().map(|(n, v)| format!("{}={}", n, u8::from(v))).collect();
    f.write_str(&items.join(","))
  }
}
