use std::{
    ffi::OsString,
    path::PathBuf,
    sync::{Mutex, OnceLock},
};

use wavecue::app_dirs::CONFIG_HOME_ENV;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Points `WAVECUE_CONFIG_HOME` at a scratch directory until dropped.
pub struct ConfigHomeGuard {
    previous: Option<OsString>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl ConfigHomeGuard {
    pub fn set(path: PathBuf) -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        let previous = std::env::var_os(CONFIG_HOME_ENV);
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            std::env::set_var(CONFIG_HOME_ENV, path);
        }
        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for ConfigHomeGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            Some(value) => unsafe { std::env::set_var(CONFIG_HOME_ENV, value) },
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            None => unsafe { std::env::remove_var(CONFIG_HOME_ENV) },
        }
    }
}
