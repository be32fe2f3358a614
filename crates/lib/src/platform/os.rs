/// Operating system variants supported by prereq
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Name of the search-path variable the dynamic loader consults.
  ///
  /// Windows has no separate library path; DLLs are found through `PATH`.
  pub fn library_path_var(&self) -> &'static str {
    match self {
      Self::Linux => "LD_LIBRARY_PATH",
      Self::MacOs => "DYLD_LIBRARY_PATH",
      Self::Windows => "PATH",
    }
  }
}

/// Library search-path variable for the running OS.
///
/// Unknown Unix-likes fall back to `LD_LIBRARY_PATH`.
pub fn library_path_var() -> &'static str {
  Os::current().map(|os| os.library_path_var()).unwrap_or("LD_LIBRARY_PATH")
}
