//! Locating and loading `ruledoc.toml`.

use anyhow::{Context, Result};
use ruledoc_core::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// File names looked up in the working directory.
const LOCAL_NAMES: [&str; 2] = ["ruledoc.toml", ".ruledoc.toml"];

/// Where a loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// `--config` on the command line.
    Flag(PathBuf),
    /// Working directory.
    Local(PathBuf),
    /// Per-user settings directory.
    User(PathBuf),
    /// Nothing found; built-in defaults.
    Builtin,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(p) => write!(f, "{} (--config)", p.display()),
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::User(p) => write!(f, "{} (user settings)", p.display()),
            Self::Builtin => f.write_str("built-in defaults"),
        }
    }
}

/// Configuration for a run plus where it was read from.
#[derive(Debug)]
pub struct LoadedConfig {
    /// Parsed settings.
    pub config: Config,
    /// Source file, if any.
    pub origin: ConfigOrigin,
}

/// Loads the configuration for a command run in the current directory.
///
/// `--config` wins; otherwise `ruledoc.toml` or `.ruledoc.toml` in the
/// working directory, then `config.toml` in the user settings directory.
pub fn load(flag: Option<&Path>) -> Result<LoadedConfig> {
    load_from(Path::new("."), flag, user_dir().as_deref())
}

fn load_from(cwd: &Path, flag: Option<&Path>, user: Option<&Path>) -> Result<LoadedConfig> {
    let origin = locate(cwd, flag, user);
    let config = match &origin {
        ConfigOrigin::Builtin => Config::default(),
        ConfigOrigin::Flag(path) | ConfigOrigin::Local(path) | ConfigOrigin::User(path) => {
            Config::from_file(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?
        }
    };
    Ok(LoadedConfig { config, origin })
}

fn locate(cwd: &Path, flag: Option<&Path>, user: Option<&Path>) -> ConfigOrigin {
    if let Some(path) = flag {
        return ConfigOrigin::Flag(path.to_path_buf());
    }
    if let Some(path) = LOCAL_NAMES.iter().map(|n| cwd.join(n)).find(|p| p.is_file()) {
        return ConfigOrigin::Local(path);
    }
    user.map(|dir| dir.join("config.toml"))
        .filter(|p| p.is_file())
        .map_or(ConfigOrigin::Builtin, ConfigOrigin::User)
}

/// `$RULEDOC_CONFIG_DIR`, else `~/.ruledoc`.
fn user_dir() -> Option<PathBuf> {
    std::env::var_os("RULEDOC_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| home::home_dir().map(|h| h.join(".ruledoc")))
}
