//! Locations of the persisted catalog artefacts.
//!
//! A complete catalog is 14 files under its directory: the three
//! compressed record files, seven index files, the three block files
//! of the grouped indexes, and the static-queries record.

use std::{ffi, path};

fn in_dir(dir: &ffi::OsStr, name: &str) -> ffi::OsString {
    let loc: path::PathBuf = [dir.to_os_string(), name.into()].iter().collect();
    loc.into_os_string()
}

pub fn users_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "users.dat")
}

pub fn commits_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "commits.dat")
}

pub fn repos_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "repos.dat")
}

pub fn users_by_id_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "usersById.indx")
}

pub fn repos_by_id_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "reposById.indx")
}

pub fn commits_by_repo_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "commitsByRepo.indx")
}

pub fn commits_by_repo_blocks_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "commitsByRepo.dat")
}

pub fn repos_by_last_commit_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "reposByLastCommit.indx")
}

pub fn repos_by_language_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "reposByLanguage.indx")
}

pub fn repos_by_language_blocks_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "reposByLanguage.dat")
}

pub fn commits_by_date_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "commitsByDate.indx")
}

pub fn collaborators_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "collaborators.indx")
}

pub fn collaborators_blocks_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "collaborators.dat")
}

pub fn static_queries_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "staticQueries.dat")
}

// advisory lock file, not part of the artefact set.
pub fn lock_loc(dir: &ffi::OsStr) -> ffi::OsString {
    in_dir(dir, "gitcat.lock")
}

/// Output file for the query on (1-based) input line `n`.
pub fn query_output_loc(dir: &ffi::OsStr, n: usize) -> ffi::OsString {
    in_dir(dir, &format!("command{}_output.txt", n))
}

/// Every artefact a loadable catalog must have.
pub fn artefacts(dir: &ffi::OsStr) -> Vec<ffi::OsString> {
    vec![
        users_loc(dir),
        commits_loc(dir),
        repos_loc(dir),
        users_by_id_loc(dir),
        repos_by_id_loc(dir),
        commits_by_repo_loc(dir),
        commits_by_repo_blocks_loc(dir),
        repos_by_last_commit_loc(dir),
        repos_by_language_loc(dir),
        repos_by_language_blocks_loc(dir),
        commits_by_date_loc(dir),
        collaborators_loc(dir),
        collaborators_blocks_loc(dir),
        static_queries_loc(dir),
    ]
}

#[cfg(test)]
#[path = "files_test.rs"]
mod files_test;
