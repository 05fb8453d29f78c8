//! Helpers for tests that read `COSTGPT_*` environment variables
//!
//! Integration tests cannot see this module (it is `#[cfg(test)]`); the root
//! crate keeps its own helpers in `tests/common/mod.rs`.

use crate::config::{ENV_API_KEY, ENV_API_URL, ENV_FEATURE, ENV_TIMEOUT_SECS, ENV_USER_ID};
use once_cell::sync::Lazy;
use std::env;

/// Every variable [`TrackerConfig::from_env`](crate::TrackerConfig::from_env) reads
pub const CONFIG_ENV_KEYS: [&str; 5] = [
    ENV_API_KEY,
    ENV_API_URL,
    ENV_USER_ID,
    ENV_FEATURE,
    ENV_TIMEOUT_SECS,
];

static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Exclusive access to the process environment with all config variables unset
///
/// Holds the env lock for its lifetime. Dropping it puts every touched
/// variable back, even if the test panics.
pub struct ConfigEnv {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: tokio::sync::MutexGuard<'static, ()>,
}

impl ConfigEnv {
    /// Lock the environment and unset every config variable
    pub fn cleared() -> Self {
        let mut env = Self {
            saved: Vec::new(),
            _lock: ENV_MUTEX.blocking_lock(),
        };
        for key in CONFIG_ENV_KEYS {
            env.save(key);
            // env mutation is unsafe since edition 2024; ENV_MUTEX serializes it
            unsafe {
                env::remove_var(key);
            }
        }
        env
    }

    /// Set one of the config variables for the rest of the test
    pub fn set(&mut self, key: &'static str, value: &str) {
        debug_assert!(CONFIG_ENV_KEYS.contains(&key), "{key} is not a config variable");
        self.save(key);
        unsafe {
            env::set_var(key, value);
        }
    }

    fn save(&mut self, key: &'static str) {
        self.saved.push((key, env::var(key).ok()));
    }
}

impl Drop for ConfigEnv {
    fn drop(&mut self) {
        // Reverse order so the value seen before the test is restored last
        for (key, value) in self.saved.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
