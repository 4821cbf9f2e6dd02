use std::sync::{Mutex, OnceLock};

/// Every environment variable `Config::load` reads.
pub(crate) const PAGEPILOT_ENV_KEYS: [&str; 5] = [
    "PAGEPILOT_HEADLESS",
    "PAGEPILOT_CHROME",
    "PAGEPILOT_CAPABILITIES",
    "PAGEPILOT_READ_ONLY",
    "PAGEPILOT_DRY_RUN",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Runs `body` with the process environment locked and every `PAGEPILOT_*`
/// override cleared before and after.
pub(crate) fn with_clean_env<R>(body: impl FnOnce() -> R) -> R {
    let _guard = env_lock()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    clear_pagepilot_env();
    let result = body();
    clear_pagepilot_env();
    result
}

fn clear_pagepilot_env() {
    for key in PAGEPILOT_ENV_KEYS {
        // SAFETY: callers hold the env lock, so no other test thread touches
        // the environment concurrently.
        unsafe { std::env::remove_var(key) };
    }
}

/// Sets one override. Only call inside `with_clean_env`.
pub(crate) fn set_env_var(key: &str, value: &str) {
    debug_assert!(PAGEPILOT_ENV_KEYS.contains(&key), "unexpected env key {key}");
    // SAFETY: see `clear_pagepilot_env`.
    unsafe { std::env::set_var(key, value) };
}
