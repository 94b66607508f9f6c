use serde::Deserialize;

use std::ffi;

use crate::{indexer, util::files, Result};

/// Default number of cache pages, 256 MiB worth.
pub const CACHE_PAGES: usize = 256 * 1024;

/// Configuration for building and serving a catalog.
///
/// Configuration is code-first: start from [Config::new] and refine
/// with the `set_*` methods, or load the whole thing from a toml file
/// with [Config::from_toml].
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the catalog artefacts are persisted under.
    pub dir: ffi::OsString,
    /// Location of the accounts CSV.
    pub users_csv: ffi::OsString,
    /// Location of the commits CSV.
    pub commits_csv: ffi::OsString,
    /// Location of the repositories CSV.
    pub repos_csv: ffi::OsString,
    /// Number of pages in the shared cache.
    ///
    /// Default: [CACHE_PAGES]
    pub cache_pages: usize,
    /// In-memory run size for index sorting, in entries.
    ///
    /// Default: [indexer::RUN_ENTRIES]
    pub run_entries: usize,
    /// Worker threads for query execution.
    ///
    /// Default: 1
    pub workers: usize,
    /// Validate CSV rows while ingesting. Turning this off treats the
    /// inputs as trusted and skips per-token checks.
    ///
    /// Default: true
    pub validate: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            dir: "saida".into(),
            users_csv: "entrada/users-g3.csv".into(),
            commits_csv: "entrada/commits-g3.csv".into(),
            repos_csv: "entrada/repos-g3.csv".into(),
            cache_pages: CACHE_PAGES,
            run_entries: indexer::RUN_ENTRIES,
            workers: 1,
            validate: true,
        }
    }
}

impl Config {
    /// Create a configuration persisting under `dir`, defaults for the
    /// rest.
    pub fn new(dir: &ffi::OsStr) -> Config {
        Config {
            dir: dir.to_os_string(),
            ..Config::default()
        }
    }

    /// Load configuration from a toml file.
    pub fn from_toml(loc: &ffi::OsStr) -> Result<Config> {
        files::load_toml(loc)
    }

    /// Point at the three CSV inputs.
    pub fn set_inputs(
        &mut self,
        users: &ffi::OsStr,
        commits: &ffi::OsStr,
        repos: &ffi::OsStr,
    ) -> &mut Self {
        self.users_csv = users.to_os_string();
        self.commits_csv = commits.to_os_string();
        self.repos_csv = repos.to_os_string();
        self
    }

    pub fn set_cache_pages(&mut self, cache_pages: usize) -> &mut Self {
        self.cache_pages = cache_pages;
        self
    }

    pub fn set_run_entries(&mut self, run_entries: usize) -> &mut Self {
        self.run_entries = run_entries;
        self
    }

    pub fn set_workers(&mut self, workers: usize) -> &mut Self {
        self.workers = workers;
        self
    }

    pub fn set_validate(&mut self, validate: bool) -> &mut Self {
        self.validate = validate;
        self
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
