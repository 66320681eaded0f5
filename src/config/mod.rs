use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

pub const ENV_API_KEY: &str = "SHEETS_API_KEY";
pub const ENV_SPREADSHEET_ID: &str = "SPREADSHEET_ID";
pub const ENV_SHEET_NAME: &str = "SHEET_NAME";

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub api_key: Option<String>,
    #[serde(alias = "sheet_id")]
    pub spreadsheet_id: Option<String>,
    #[serde(alias = "sheet")]
    pub sheet_name: Option<String>,
    pub last_column: Option<String>,
    pub api_base: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub page_size: Option<usize>,
    pub issue_terms: Option<Vec<String>>,
    pub output_dir: Option<String>,
    pub output_format: Option<String>,
    pub no_color: Option<bool>,
}

/// Sheet settings taken from the process environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvSettings {
    pub api_key: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub sheet_name: Option<String>,
}

impl EnvSettings {
    /// Reads `.env` (when present) and then the environment. Blank values
    /// count as unset.
    pub fn load() -> Self {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            api_key: read(ENV_API_KEY),
            spreadsheet_id: read(ENV_SPREADSHEET_ID),
            sheet_name: read(ENV_SHEET_NAME),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".reviewsearch").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).to_string_lossy().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# reviewsearch config
#
# Location (default):
#   ~/.reviewsearch/config.yml
#
# SHEETS_API_KEY, SPREADSHEET_ID and SHEET_NAME (environment or ./.env)
# override the values below.

# Sheet (required: api_key and spreadsheet_id)
# api_key: AIza...
# spreadsheet_id: 1AbC...
sheet_name: "2025"
last_column: R
# api_base: https://sheets.googleapis.com

# HTTP
timeout: 30
# proxy: http://127.0.0.1:8080

# Search
page_size: 25
issue_terms:
  - headset
  - connection

# Export
# output_dir: ./reports
output_format: html

# Output styling
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}
