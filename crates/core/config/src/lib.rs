use std::{env, fs, path::Path, time::Duration};

use cached::proc_macro::cached;
use futures_locks::RwLock;
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[cfg(feature = "sentry")]
pub use sentry::{capture_error, capture_message, Level};

pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_MONGODB_URI: &str = "MONGODB_URI";
pub const ENV_MONGODB_DB: &str = "MONGODB_DB";
pub const ENV_CONFIG_PATH: &str = "STASH_CONFIG";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {msg}")]
  Read { path: String, msg: String },
  #[error("failed to parse config file {path}: {msg}")]
  Parse { path: String, msg: String },
  #[error("the bot token is missing, set `BOT_TOKEN` or `bot.token`")]
  MissingBotToken,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Database {
  pub mongodb: String,
  pub db_name: String,
  pub collection: String,
}

impl Default for Database {
  fn default() -> Self {
    Self {
      mongodb: "mongodb://localhost:27017/".to_string(),
      db_name: "telegram_bot".to_string(),
      collection: "user_data".to_string(),
    }
  }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Bot {
  /// No default: the process refuses to start without one
  pub token: String,
  /// Used to accept `/command@username` forms in group chats
  pub username: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Hosts {
  pub upload: String,
  pub metrics: String,
}

impl Default for Hosts {
  fn default() -> Self {
    Self { upload: "0.0.0.0:5000".to_string(), metrics: "0.0.0.0:9100".to_string() }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Upload {
  pub path: String,
  pub title: String,
  pub max_body_bytes: usize,
}

impl Default for Upload {
  fn default() -> Self {
    Self { path: "/upload".to_string(), title: "Stash".to_string(), max_body_bytes: 64 * 1024 }
  }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Progress {
  pub label: String,
  pub frame_delay_ms: u64,
}

impl Default for Progress {
  fn default() -> Self {
    Self { label: "Uploading".to_string(), frame_delay_ms: 400 }
  }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Sentry {
  pub bot: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Settings {
  pub database: Database,
  pub bot: Bot,
  pub hosts: Hosts,
  pub upload: Upload,
  pub progress: Progress,
  pub sentry: Sentry,
  pub production: bool,
}

impl Settings {
  pub fn from_yaml_str(path: &str, raw: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(raw)
      .map_err(|err| ConfigError::Parse { path: path.to_string(), msg: err.to_string() })
  }

  pub fn from_file(path: &str) -> Result<Self, ConfigError> {
    let raw = fs::read_to_string(path)
      .map_err(|err| ConfigError::Read { path: path.to_string(), msg: err.to_string() })?;
    Self::from_yaml_str(path, &raw)
  }

  /// Environment variables win over the config file. Empty values are ignored.
  pub fn apply_env<F>(&mut self, lookup: F)
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = get(ENV_BOT_TOKEN) {
      self.bot.token = token;
    }
    if let Some(uri) = get(ENV_MONGODB_URI) {
      self.database.mongodb = uri;
    }
    if let Some(db_name) = get(ENV_MONGODB_DB) {
      self.database.db_name = db_name;
    }
  }

  pub fn bot_token(&self) -> Result<String, ConfigError> {
    let token = self.bot.token.trim();
    if token.is_empty() {
      return Err(ConfigError::MissingBotToken);
    }
    Ok(token.to_string())
  }

  pub fn preflight_checks(&self) {
    if self.bot.username.is_empty() {
      warn!("No bot username specified! `/command@bot` forms will not be recognized.");
    }

    if self.upload.max_body_bytes == 0 {
      warn!("Upload body limit is 0, every web upload will be rejected.");
    }

    if self.production && self.database.mongodb.contains("localhost") {
      warn!("Running in production against a local MongoDB instance.");
    }
  }
}

/// Configure logging and common Rust variables
#[cfg(feature = "sentry")]
pub async fn setup_logging(release: &'static str, dsn: String) -> Option<sentry::ClientInitGuard> {
  if dsn.is_empty() {
    None
  } else {
    Some(sentry::init((
      dsn,
      sentry::ClientOptions { release: Some(release.into()), ..Default::default() },
    )))
  }
}

#[cfg(feature = "sentry")]
#[macro_export]
macro_rules! configure {
  ($config: expr, $application: ident) => {
    let _sentry = $crate::setup_logging(
      concat!(env!("CARGO_PKG_NAME"), "@", env!("CARGO_PKG_VERSION")),
      $config.sentry.$application.clone(),
    )
    .await;
  };
}

fn config_path() -> String {
  match env::var(ENV_CONFIG_PATH) {
    Ok(path) if !path.is_empty() => path,
    _ => {
      let env_mode = env::var("ENV").unwrap_or("dev".to_string());
      format!("stash.{}.yaml", env_mode)
    }
  }
}

/// Configuration builder
static CONFIG_BUILDER: Lazy<RwLock<Result<Settings, ConfigError>>> = Lazy::new(|| {
  RwLock::new({
    let path = config_path();
    if Path::new(&path).exists() { Settings::from_file(&path) } else { Ok(Settings::default()) }
  })
});

pub async fn read() -> Result<Settings, ConfigError> {
  CONFIG_BUILDER.read().await.clone()
}

#[cached(time = 300, result = true)]
pub async fn config() -> Result<Settings, ConfigError> {
  let mut config = read().await?;
  config.apply_env(|key| env::var(key).ok());

  // auto-detect production nodes
  if config.database.mongodb.starts_with("mongodb+srv://") {
    config.production = true;
  }

  Ok(config)
}
