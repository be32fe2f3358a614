/// Application name, used for config/data directory names.
pub const APP_NAME: &str = "prereq";

/// File stem of the generated environment script written under the prefix.
pub const SCRIPT_STEM: &str = "prereq-env";

/// Directory under the prefix that holds tool logs and other bookkeeping.
pub const STATE_DIR: &str = ".prereq";

/// Name of the variable the generated script binds to its own directory.
pub const THIS_DIR_VAR: &str = "PREREQ_THIS_DIR";

/// Environment variable that overrides the default install prefix.
pub const PREFIX_ENV: &str = "PREREQ_PREFIX";
