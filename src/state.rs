/*
 * Responsibility
 * - middleware / adapter が毎リクエスト参照する共有設定 (PluginConfig)
 *   - cookie 名, token 検証用 salt, ログに出す body の上限
 * - 起動時にまれに書き込み、リクエストごとに読む → RwLock
 * - Clone 前提で持つ (内部は Arc)
 */
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub const DEFAULT_MAX_PRINT_BODY_SIZE: usize = 4 * 1024;

#[derive(Clone)]
pub struct Settings {
    pub cookie_name: String,
    pub token_salt: String,
    /// Bodies longer than this are left out of the request log.
    /// `0` disables request-body capture and lifts the response-body cap.
    pub max_print_body_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cookie_name: String::new(),
            token_salt: String::new(),
            max_print_body_size: DEFAULT_MAX_PRINT_BODY_SIZE,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the salt
        f.debug_struct("Settings")
            .field("cookie_name", &self.cookie_name)
            .field("max_print_body_size", &self.max_print_body_size)
            .finish_non_exhaustive()
    }
}

/// Handle to the settings shared by the credential middlewares, the request
/// logger and the handlers.
#[derive(Clone, Debug, Default)]
pub struct PluginConfig {
    inner: Arc<RwLock<Settings>>,
}

impl PluginConfig {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    // poisoning is ignored: every write replaces a whole field
    fn read(&self) -> RwLockReadGuard<'_, Settings> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Settings> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_token_salt(&self, salt: impl Into<String>) {
        self.write().token_salt = salt.into();
    }

    pub fn token_salt(&self) -> String {
        self.read().token_salt.clone()
    }

    pub fn set_cookie_name(&self, name: impl Into<String>) {
        self.write().cookie_name = name.into();
    }

    pub fn cookie_name(&self) -> String {
        self.read().cookie_name.clone()
    }

    pub fn set_max_print_body_size(&self, size: usize) {
        self.write().max_print_body_size = size;
    }

    pub fn max_print_body_size(&self) -> usize {
        self.read().max_print_body_size
    }

    /// Copy of the current settings, e.g. for a startup log line.
    pub fn snapshot(&self) -> Settings {
        self.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_follows_updates_and_hides_salt() {
        let config = PluginConfig::default();
        config.set_cookie_name("sid");
        config.set_token_salt("pepper");

        let settings = config.snapshot();

        assert_eq!(settings.cookie_name, "sid");
        assert_eq!(settings.token_salt, "pepper");
        assert!(!format!("{settings:?}").contains("pepper"));
    }

    #[test]
    fn defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.max_print_body_size(), 4096);
        assert!(config.cookie_name().is_empty());
        assert!(config.token_salt().is_empty());
    }

    #[test]
    fn clones_share_settings() {
        let config = PluginConfig::default();
        let other = config.clone();

        other.set_cookie_name("session");
        other.set_token_salt("pepper");
        other.set_max_print_body_size(16);

        assert_eq!(config.cookie_name(), "session");
        assert_eq!(config.token_salt(), "pepper");
        assert_eq!(config.max_print_body_size(), 16);
    }

    #[test]
    fn debug_hides_salt() {
        let config = PluginConfig::new(Settings {
            token_salt: "top-secret".into(),
            ..Settings::default()
        });
        assert!(!format!("{config:?}").contains("top-secret"));
    }

    #[test]
    fn concurrent_readers_see_a_consistent_value() {
        let config = PluginConfig::default();
        config.set_token_salt("salt");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let config = config.clone();
                std::thread::spawn(move || config.token_salt())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), "salt");
        }
    }
}
