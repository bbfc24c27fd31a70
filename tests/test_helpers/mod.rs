//! Scoped `TRACKBOARD_*` environment for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Variables read by `TrackerConfig::from_env`, without the prefix.
const TRACKED_KEYS: [&str; 5] = [
    "DATABASE_URL",
    "DB_POOL_SIZE",
    "DB_CONNECT_TIMEOUT",
    "LOG",
    "LOG_JSON",
];

/// Holds the environment lock and restores every tracked variable on drop.
///
/// All tracked variables are cleared when the guard is created, so each
/// test starts from the built-in defaults.
pub struct TrackerEnv {
    saved: Vec<(String, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl TrackerEnv {
    /// Locks the environment and clears every tracked variable.
    pub fn clean() -> Self {
        let lock = ENV_MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let saved = TRACKED_KEYS
            .iter()
            .map(|key| {
                let name = format!("{}{key}", trackboard::config::ENV_PREFIX);
                let previous = env::var(&name).ok();
                unsafe {
                    // SAFETY: ENV_MUTEX serializes environment mutations in tests.
                    env::remove_var(&name);
                }
                (name, previous)
            })
            .collect();
        Self {
            saved,
            _lock: lock,
        }
    }

    /// Sets `TRACKBOARD_<key>` for the guard lifetime.
    pub fn set(&self, key: &str, value: &str) -> &Self {
        let name = format!("{}{key}", trackboard::config::ENV_PREFIX);
        unsafe {
            // SAFETY: ENV_MUTEX is held by `self`.
            env::set_var(name, value);
        }
        self
    }
}

impl Drop for TrackerEnv {
    fn drop(&mut self) {
        for (name, previous) in self.saved.drain(..) {
            unsafe {
                // SAFETY: ENV_MUTEX is still held by `self`.
                match previous {
                    Some(value) => env::set_var(&name, value),
                    None => env::remove_var(&name),
                }
            }
        }
    }
}
