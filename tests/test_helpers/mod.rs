//! Scoped `SUBSTRATE__*` environment and temporary config files for
//! configuration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

use armature::config::ENV_PREFIX;
use camino::{Utf8Path, Utf8PathBuf};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Holds the process environment with every `SUBSTRATE__*` variable removed
/// except the ones given, restoring the original values on drop.
///
/// Guards serialise on a global lock, so tests using them never observe
/// each other's variables.
pub struct SubstrateEnv {
    saved: Vec<(OsString, OsString)>,
    added: Vec<String>,
    _lock: MutexGuard<'static, ()>,
}

impl SubstrateEnv {
    /// Clears the prefixed variables, then sets `vars`.
    ///
    /// Keys are given without the prefix, for example
    /// `("INVOKER__MAX_RETRIES", "7")`.
    pub fn with(vars: &[(&str, &str)]) -> Self {
        let lock = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let prefix = format!("{ENV_PREFIX}__");
        let saved: Vec<(OsString, OsString)> = env::vars_os()
            .filter(|(key, _)| key.to_string_lossy().starts_with(&prefix))
            .collect();
        let added: Vec<String> = vars.iter().map(|(key, _)| format!("{prefix}{key}")).collect();

        // SAFETY: ENV_LOCK serialises every environment mutation in this
        // test binary.
        unsafe {
            for (key, _) in &saved {
                env::remove_var(key);
            }
            for (key, (_, value)) in added.iter().zip(vars) {
                env::set_var(key, value);
            }
        }

        Self {
            saved,
            added,
            _lock: lock,
        }
    }

    /// Clears the prefixed variables without setting any.
    pub fn cleared() -> Self {
        Self::with(&[])
    }
}

impl Drop for SubstrateEnv {
    fn drop(&mut self) {
        // SAFETY: the guard still holds ENV_LOCK.
        unsafe {
            for key in &self.added {
                env::remove_var(key);
            }
            for (key, value) in &self.saved {
                env::set_var(key, value);
            }
        }
    }
}

/// A config file in the system temp directory, removed on drop.
pub struct TempConfigFile {
    path: Utf8PathBuf,
}

impl TempConfigFile {
    /// Writes `contents` to a fresh `.toml` file.
    pub fn toml(contents: &str) -> eyre::Result<Self> {
        let dir = Utf8PathBuf::from_path_buf(env::temp_dir())
            .map_err(|path| eyre::eyre!("temp dir {} is not UTF-8", path.display()))?;
        let path = dir.join(format!("armature-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents)?;
        Ok(Self { path })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl Drop for TempConfigFile {
    fn drop(&mut self) {
        drop(std::fs::remove_file(&self.path));
    }
}
