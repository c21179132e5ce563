//! Version information for sshconfig
//!
//! Build metadata comes from `SSHCONFIG_GIT_HASH` and `SSHCONFIG_BUILD_DATE`
//! at compile time and reads `unknown` when they are not set.

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binary was built from
pub const GIT_HASH: &str = match option_env!("SSHCONFIG_GIT_HASH") {
    Some(hash) => hash,
    None => "unknown",
};

/// Date the binary was built
pub const BUILD_DATE: &str = match option_env!("SSHCONFIG_BUILD_DATE") {
    Some(date) => date,
    None => "unknown",
};

/// Get the current version string
pub fn get_version() -> String {
    VERSION.to_string()
}

/// Get the version string with build metadata
pub fn get_version_long() -> String {
    format!("{VERSION} (git: {GIT_HASH}, built: {BUILD_DATE})")
}
