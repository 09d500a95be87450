//! Runtime configuration, read from an optional TOML file layered with
//! `NEWSROOM_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// HS256 signing secret. Required.
  pub jwt_secret:     String,
  #[serde(default = "default_token_ttl_secs")]
  pub token_ttl_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("newsroom.db") }

fn default_token_ttl_secs() -> u64 { 3600 }

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("NEWSROOM"))
      .build()?
      .try_deserialize()
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()?
      .try_deserialize()
  }

  #[test]
  fn defaults_fill_everything_but_the_secret() {
    let cfg = parse("jwt_secret = \"s3cret\"").unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 3000);
    assert_eq!(cfg.store_path, PathBuf::from("newsroom.db"));
    assert_eq!(cfg.token_ttl_secs, 3600);
  }

  #[test]
  fn secret_is_required() {
    assert!(parse("port = 8080").is_err());
  }

  #[test]
  fn tilde_expands_only_at_the_start() {
    let plain = Path::new("/var/lib/newsroom.db");
    assert_eq!(expand_tilde(plain), plain.to_path_buf());
    let odd = Path::new("data/~/newsroom.db");
    assert_eq!(expand_tilde(odd), odd.to_path_buf());
  }
}
