use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use leadkeep_core::domain::UserId;
use leadkeep_core::rules::validate_soon_days;
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "leadkeep";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub due_soon_days: i64,
    pub default_actor: Option<UserId>,
    pub contacts: ContactsConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ContactsConfig {
    /// Refuse to delete the last contact person of a business entity.
    pub keep_last_contact: bool,
}

impl AppConfig {
    fn defaults() -> Self {
        Self {
            due_soon_days: DEFAULT_SOON_DAYS,
            ..Default::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid due_soon_days value: {0}")]
    InvalidSoonDays(i64),
    #[error("invalid default_actor value: {0}")]
    InvalidActor(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    due_soon_days: Option<i64>,
    default_actor: Option<String>,
    contacts: Option<ContactsFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ContactsFile {
    keep_last_contact: Option<bool>,
}

/// Loads the config file. A missing default file yields defaults; a missing
/// explicit `--config` path is an error.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::defaults()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::defaults()),
        Err(err) => return Err(err),
    };
    Ok(load_at_path(&path, required)?.unwrap_or_else(AppConfig::defaults))
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = custom {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfigPath(path));
        }
        return Ok(path);
    }

    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => {
            let path = PathBuf::from(dir);
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            path
        }
        None => dirs::home_dir()
            .ok_or(ConfigError::MissingHomeDir)?
            .join(".config"),
    };
    Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::defaults();

    if let Some(soon_days) = parsed.due_soon_days {
        config.due_soon_days =
            validate_soon_days(soon_days).map_err(|_| ConfigError::InvalidSoonDays(soon_days))?;
    }

    if let Some(raw) = parsed.default_actor {
        let actor =
            UserId::from_str(raw.trim()).map_err(|_| ConfigError::InvalidActor(raw.clone()))?;
        config.default_actor = Some(actor);
    }

    if let Some(contacts) = parsed.contacts {
        if let Some(keep) = contacts.keep_last_contact {
            config.contacts.keep_last_contact = keep;
        }
    }

    Ok(config)
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.permissions().mode() & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
