//! Store process configuration.

use std::path::{Path, PathBuf};

/// Environment variable naming the git executable.
pub const GIT_ENV: &str = "SIZER_GIT";

/// Where the store lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Executable that serves the batch protocol.
    pub git: PathBuf,
    /// Repository the store process is started in.
    pub repo: PathBuf,
}

impl StoreConfig {
    /// Configuration for `repo`, using `git` from `PATH`.
    pub fn new<P: AsRef<Path>>(repo: P) -> Self {
        Self {
            git: PathBuf::from("git"),
            repo: repo.as_ref().to_path_buf(),
        }
    }

    /// Like [`StoreConfig::new`], but honours `SIZER_GIT`.
    pub fn from_env<P: AsRef<Path>>(repo: P) -> Self {
        let config = Self::new(repo);
        match std::env::var_os(GIT_ENV) {
            Some(git) if !git.is_empty() => config.with_git(git),
            _ => config,
        }
    }

    /// Use a specific git executable.
    pub fn with_git<P: Into<PathBuf>>(mut self, git: P) -> Self {
        self.git = git.into();
        self
    }
}
