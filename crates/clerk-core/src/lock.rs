//! Single-instance locks for lockable commands
//!
//! A lock is taken by command name before the command runs and released when
//! the returned guard is dropped. Acquisition never waits: if someone else
//! holds the lock the provider reports `None` and the caller skips the work.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use fs2::FileExt;
use sha2::{Digest, Sha256};

use crate::errors::{ConsoleError, ConsoleResult};

/// Holds a lock until dropped.
pub trait LockGuard {
    fn name(&self) -> &str;
}

pub trait LockProvider {
    /// Tries to take the lock for `name` without blocking. `Ok(None)` means
    /// the lock is held elsewhere.
    fn try_lock(&mut self, name: &str) -> ConsoleResult<Option<Box<dyn LockGuard>>>;
}

/// Advisory file locks shared between processes.
#[derive(Debug, Clone)]
pub struct FileLockProvider {
    directory: PathBuf,
}

impl FileLockProvider {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Locks live in the system temp directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the lock file used for `name`.
    pub fn lock_path(&self, name: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        let slug: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect();
        self.directory
            .join(format!("clerk.{}.{:x}.lock", slug, hasher.finalize()))
    }
}

struct FileLockGuard {
    name: String,
    file: File,
}

impl LockGuard for FileLockGuard {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for FileLockGuard {
    fn drop(&mut self) {
        if let Err(e) = self.file.unlock() {
            log::warn!("Failed to release lock for '{}': {}", self.name, e);
        }
    }
}

impl LockProvider for FileLockProvider {
    fn try_lock(&mut self, name: &str) -> ConsoleResult<Option<Box<dyn LockGuard>>> {
        let lock_error = |e: std::io::Error| ConsoleError::Lock {
            name: name.to_string(),
            message: e.to_string(),
        };

        fs::create_dir_all(&self.directory).map_err(lock_error)?;
        let path = self.lock_path(name);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(lock_error)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                log::debug!("Acquired lock {}", path.display());
                Ok(Some(Box::new(FileLockGuard {
                    name: name.to_string(),
                    file,
                })))
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => Err(lock_error(e)),
        }
    }
}

/// In-process locks. Clones share the same set of held names.
#[derive(Debug, Clone, Default)]
pub struct MemoryLockProvider {
    held: Rc<RefCell<BTreeSet<String>>>,
}

impl MemoryLockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self, name: &str) -> bool {
        self.held.borrow().contains(name)
    }
}

struct MemoryLockGuard {
    name: String,
    held: Rc<RefCell<BTreeSet<String>>>,
}

impl LockGuard for MemoryLockGuard {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for MemoryLockGuard {
    fn drop(&mut self) {
        self.held.borrow_mut().remove(&self.name);
    }
}

impl LockProvider for MemoryLockProvider {
    fn try_lock(&mut self, name: &str) -> ConsoleResult<Option<Box<dyn LockGuard>>> {
        if !self.held.borrow_mut().insert(name.to_string()) {
            return Ok(None);
        }
        Ok(Some(Box::new(MemoryLockGuard {
            name: name.to_string(),
            held: self.held.clone(),
        })))
    }
}
