use crate::types::*;
use std::{
  env,
  fs,
  path::PathBuf,
};

pub fn repo_root() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
  let path = PathBuf::from(raw.trim());
  if path.is_absolute() {
    path
  } else {
    repo_root().join(path)
  }
}

pub fn config_path() -> PathBuf {
  repo_root().join("config.json")
}

pub fn env_default(key: &str) -> Option<String> {
  env::var(key)
    .ok()
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn fill_from_env(field: &mut String, key: &str) {
  if field.trim().is_empty() {
    if let Some(value) = env_default(key) {
      *field = value;
    }
  }
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
  fill_from_env(&mut config.listen_addr, "BRACKET_LISTEN_ADDR");
  fill_from_env(&mut config.state_path, "BRACKET_STATE_PATH");
  fill_from_env(&mut config.roster_path, "BRACKET_ROSTER_PATH");
  fill_from_env(&mut config.static_dir, "BRACKET_STATIC_DIR");
  fill_from_env(&mut config.log_dir, "BRACKET_LOG_DIR");
  config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
  let path = config_path();
  if !path.is_file() {
    return Ok(apply_env_defaults(AppConfig::default()));
  }
  let data = fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.display()))?;
  let config =
    serde_json::from_str::<AppConfig>(&data).map_err(|e| format!("parse config {}: {e}", path.display()))?;
  Ok(apply_env_defaults(config))
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    fallback
  } else {
    trimmed
  }
}

pub fn listen_addr(config: &AppConfig) -> String {
  or_default(&config.listen_addr, DEFAULT_LISTEN_ADDR).to_string()
}

pub fn state_path(config: &AppConfig) -> PathBuf {
  resolve_repo_path(or_default(&config.state_path, DEFAULT_STATE_PATH))
}

pub fn static_dir(config: &AppConfig) -> PathBuf {
  resolve_repo_path(or_default(&config.static_dir, DEFAULT_STATIC_DIR))
}

pub fn log_dir(config: &AppConfig) -> PathBuf {
  resolve_repo_path(or_default(&config.log_dir, DEFAULT_LOG_DIR))
}

/// `None` means the built-in roster.
pub fn roster_path(config: &AppConfig) -> Option<PathBuf> {
  let trimmed = config.roster_path.trim();
  if trimmed.is_empty() {
    return None;
  }
  Some(resolve_repo_path(trimmed))
}

pub fn load_env_file() {
  let path = repo_root().join(".env");
  let contents = match fs::read_to_string(&path) {
    Ok(contents) => contents,
    Err(_) => return,
  };
  for line in contents.lines() {
    if let Some((key, value)) = parse_env_line(line) {
      if env::var_os(&key).is_none() {
        env::set_var(key, value);
      }
    }
  }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
  let trimmed = line.trim();
  if trimmed.is_empty() || trimmed.starts_with('#') {
    return None;
  }
  let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
  let (key, raw_value) = trimmed.split_once('=')?;
  let key = key.trim();
  if key.is_empty() {
    return None;
  }
  let mut value = raw_value.trim();
  if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
    value = &value[1..value.len() - 1];
  } else if let Some(idx) = value.find('#') {
    value = value[..idx].trim_end();
  }
  Some((key.to_string(), value.to_string()))
}

pub fn log_config_warnings(config: &AppConfig) {
  let mut warnings = Vec::new();

  if let Some(path) = roster_path(config) {
    if !path.is_file() {
      warnings.push(format!("Roster file {} does not exist", path.display()));
    }
  }
  let static_dir = static_dir(config);
  if !static_dir.is_dir() {
    warnings.push(format!(
      "Static dir {} does not exist; only the JSON endpoints will be served",
      static_dir.display()
    ));
  }

  for msg in warnings {
    tracing::warn!("{}", msg);
  }
}
