/*
 * Responsibility
 * - 環境変数の読み込み (PORT, TOKEN_SALT, COOKIE_NAME, ログ出力の body 上限など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - PluginConfig の初期値を作る
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::state::{DEFAULT_MAX_PRINT_BODY_SIZE, PluginConfig, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    /// Log filter used when `RUST_LOG` is not set. Development logs at DEBUG,
    /// which also turns on request/response body capture.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Development => "debug,hyper=info,h2=info",
            Self::Production => "info",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub cookie_name: String,
    pub token_salt: String,
    pub max_print_body_size: usize,

    pub request_body_limit: usize,
    pub request_timeout_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cookie_name", &self.cookie_name)
            .field("max_print_body_size", &self.max_print_body_size)
            .field("request_body_limit", &self.request_body_limit)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let cookie_name = lookup("COOKIE_NAME").unwrap_or_else(|| "token".to_string());

        let token_salt = lookup("TOKEN_SALT")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("TOKEN_SALT"))?;

        let max_print_body_size = parse_or(
            &lookup,
            "MAX_PRINT_BODY_SIZE",
            DEFAULT_MAX_PRINT_BODY_SIZE,
        )?;

        let request_body_limit = parse_or(&lookup, "REQUEST_BODY_LIMIT", 1024 * 1024)?;

        let request_timeout_seconds = parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?;

        Ok(Self {
            addr,
            app_env,
            cookie_name,
            token_salt,
            max_print_body_size,
            request_body_limit,
            request_timeout_seconds,
        })
    }

    pub fn plugin_config(&self) -> PluginConfig {
        PluginConfig::new(Settings {
            cookie_name: self.cookie_name.clone(),
            token_salt: self.token_salt.clone(),
            max_print_body_size: self.max_print_body_size,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("TOKEN_SALT", "s")])).unwrap();

        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.cookie_name, "token");
        assert_eq!(config.max_print_body_size, 4096);
        assert_eq!(config.request_body_limit, 1024 * 1024);
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn salt_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.to_string(), "missing configuration: TOKEN_SALT");
    }

    #[test]
    fn invalid_numbers_are_reported() {
        let err = Config::from_lookup(lookup(&[
            ("TOKEN_SALT", "s"),
            ("MAX_PRINT_BODY_SIZE", "lots"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: MAX_PRINT_BODY_SIZE"
        );
    }

    #[test]
    fn plugin_config_carries_values() {
        let config = Config::from_lookup(lookup(&[
            ("TOKEN_SALT", "salt"),
            ("COOKIE_NAME", "sid"),
            ("MAX_PRINT_BODY_SIZE", "0"),
            ("APP_ENV", "prod"),
        ]))
        .unwrap();
        let plugin = config.plugin_config();

        assert!(config.app_env.is_production());
        assert_eq!(plugin.token_salt(), "salt");
        assert_eq!(plugin.cookie_name(), "sid");
        assert_eq!(plugin.max_print_body_size(), 0);
    }
}
