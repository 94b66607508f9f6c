//! Module `catalog` compose cache, formats, lazies and indexers into
//! the persistent, queryable aggregate of the three datasets.
//!
//! A fresh catalog is built from the CSV inputs in one pass per
//! dataset: rows are validated and compressed through their record
//! [format][crate::format::Format], appended to the record files, and
//! indexed seven ways. Once the indexes are sorted and grouped, a
//! static pass resolves the scalar statistics and annotates every
//! commit with author/committer friendship bits, in place, through a
//! [Lazy]. The artefacts then serve any number of query runs; loading
//! an existing catalog only probes that all of them are present.

use fs2::FileExt;
use lazy_static::lazy_static;
use log::{debug, warn};

use std::{
    collections::{HashMap, HashSet},
    ffi, fs,
    io::{self, Write},
    path,
    sync::Arc,
};

use crate::{
    cache::Cache,
    date::Date,
    err_at,
    format::{FieldType, Format, Value},
    indexer::{Indexer, KeyCmp, Probe},
    lazy::Lazy,
    task::Runner,
    util::{self, files as osfiles, Kind, LineReader},
    write_file, Error, Result,
};

pub mod commit;
mod config;
pub mod files;
pub mod repo;
pub mod user;

pub use config::Config;

lazy_static! {
    // user-count, organization-count, bot-count, q2, q3, q4.
    static ref STATICS_FORMAT: Format = Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::BinDouble,
            FieldType::BinDouble,
            FieldType::BinDouble,
        ],
        vec![],
        None,
    )
    .expect("statics schema");
}

/// The built, queryable aggregate of the three datasets: three
/// compressed record files, seven indexes, four precomputed
/// statistics, all behind one shared [Cache].
pub struct Catalog {
    config: Config,
    cache: Arc<Cache>,
    lockf: fs::File,

    users: Arc<fs::File>,
    commits: Arc<fs::File>,
    repos: Arc<fs::File>,
    user_format: Format,
    commit_format: Format,
    repo_format: Format,

    users_by_id: Indexer,
    repos_by_id: Indexer,
    commits_by_repo: Indexer,
    repos_by_last_commit: Indexer,
    repos_by_language: Indexer,
    commits_by_date: Indexer,
    collaborators: Indexer,

    user_count: i32,
    organization_count: i32,
    bot_count: i32,
    q2: f64,
    q3: f64,
    q4: f64,
}

impl Catalog {
    /// Load the persisted catalog if every artefact is present, else
    /// build a fresh one from the CSV inputs.
    pub fn load_or_create(config: Config) -> Result<Catalog> {
        match Catalog::load(config.clone())? {
            Some(catalog) => Ok(catalog),
            None => Catalog::create(config),
        }
    }

    /// Build a fresh catalog under `config.dir` from the CSV inputs.
    pub fn create(config: Config) -> Result<Catalog> {
        let dir = config.dir.clone();
        err_at!(IOError, fs::create_dir_all(path::Path::new(&dir)))?;
        let lockf = open_lock(&dir)?;
        err_at!(IOError, lockf.lock_exclusive())?;

        let cache = Arc::new(Cache::new(config.cache_pages)?);
        let users = Arc::new(osfiles::create_file_rw(&files::users_loc(&dir))?);
        let commits = Arc::new(osfiles::create_file_rw(&files::commits_loc(&dir))?);
        let repos = Arc::new(osfiles::create_file_rw(&files::repos_loc(&dir))?);

        let new_index = |loc: ffi::OsString, values: &Arc<fs::File>, cmp| -> Result<Indexer> {
            let mut ix = Indexer::create(Some(&loc), Arc::clone(values), cmp)?;
            ix.set_run_entries(config.run_entries);
            Ok(ix)
        };
        let users_by_id = new_index(files::users_by_id_loc(&dir), &users, KeyCmp::Direct)?;
        let mut repos_by_id = new_index(files::repos_by_id_loc(&dir), &repos, KeyCmp::Direct)?;
        let mut commits_by_repo =
            new_index(files::commits_by_repo_loc(&dir), &commits, KeyCmp::Direct)?;
        let mut repos_by_last_commit =
            new_index(files::repos_by_last_commit_loc(&dir), &repos, KeyCmp::Direct)?;
        let mut repos_by_language = new_index(
            files::repos_by_language_loc(&dir),
            &repos,
            KeyCmp::InFile(Arc::clone(&repos)),
        )?;
        let mut commits_by_date =
            new_index(files::commits_by_date_loc(&dir), &commits, KeyCmp::Direct)?;
        let mut collaborators =
            new_index(files::collaborators_loc(&dir), &users, KeyCmp::Direct)?;

        // accounts parse on a worker while the main thread collects
        // the set of valid repository ids.
        let user_worker = {
            let loc = config.users_csv.clone();
            let users = Arc::clone(&users);
            let cache = Arc::clone(&cache);
            let validate = config.validate;
            Runner::spawn("parse-users", move || {
                parse_users(&loc, &users, users_by_id, validate, &cache)
            })
        };
        let repo_ids = scan_repo_ids(&config.repos_csv, config.validate)?;
        let (users_by_id, counts) = user_worker.join()??;

        let repo_last_commit = filter_commits(
            &config.commits_csv,
            &commits,
            &users_by_id,
            &repo_ids,
            config.validate,
            &cache,
        )?;

        parse_repos(
            &config.repos_csv,
            &repos,
            &users_by_id,
            &repo_last_commit,
            &mut repos_by_id,
            &mut repos_by_last_commit,
            &mut repos_by_language,
            config.validate,
            &cache,
        )?;

        parse_commits(
            &commits,
            &users_by_id,
            &mut commits_by_date,
            &mut commits_by_repo,
            &mut collaborators,
            &cache,
        )?;

        // sort and group: the two commit pipelines on a worker, the
        // repo pipeline and the plain sorts here.
        let worker = {
            let cache = Arc::clone(&cache);
            let cbr_blocks = files::commits_by_repo_blocks_loc(&dir);
            let col_blocks = files::collaborators_blocks_loc(&dir);
            let mut commits_by_repo = commits_by_repo;
            let mut collaborators = collaborators;
            Runner::spawn("sort-group", move || -> Result<(Indexer, Indexer)> {
                commits_by_repo.sort(&cache)?;
                commits_by_repo.group(Some(&cbr_blocks), false, &cache)?;
                collaborators.sort(&cache)?;
                collaborators.group(Some(&col_blocks), true, &cache)?;
                Ok((commits_by_repo, collaborators))
            })
        };
        repos_by_language.sort(&cache)?;
        repos_by_language.group(Some(&files::repos_by_language_blocks_loc(&dir)), false, &cache)?;
        repos_by_id.sort(&cache)?;
        repos_by_last_commit.sort(&cache)?;
        commits_by_date.sort(&cache)?;
        let (commits_by_repo, collaborators) = worker.join()??;

        let mut catalog = Catalog {
            config,
            cache,
            lockf,
            users,
            commits,
            repos,
            user_format: user::compressed_format(),
            commit_format: commit::compressed_format(),
            repo_format: repo::compressed_format(),
            users_by_id,
            repos_by_id,
            commits_by_repo,
            repos_by_last_commit,
            repos_by_language,
            commits_by_date,
            collaborators,
            user_count: counts.0,
            organization_count: counts.1,
            bot_count: counts.2,
            q2: 0.0,
            q3: 0.0,
            q4: 0.0,
        };

        catalog.solve_static_queries()?;
        catalog.write_static_queries()?;
        catalog.cache.flush_all()?;

        // build finished; fall back to a shared lock for serving.
        err_at!(IOError, catalog.lockf.unlock())?;
        err_at!(IOError, catalog.lockf.lock_shared())?;
        debug!(target: "catalog", "catalog built under {:?}", catalog.config.dir);
        Ok(catalog)
    }

    /// Load the catalog persisted under `config.dir`. Returns None,
    /// and the caller rebuilds, when any of the 14 artefacts is
    /// missing or the statics record is short.
    pub fn load(config: Config) -> Result<Option<Catalog>> {
        let dir = config.dir.clone();
        for loc in files::artefacts(&dir) {
            if fs::metadata(path::Path::new(&loc)).is_err() {
                return Ok(None);
            }
        }

        let lockf = open_lock(&dir)?;
        err_at!(IOError, lockf.lock_shared())?;

        let cache = Arc::new(Cache::new(config.cache_pages)?);
        let users = Arc::new(osfiles::open_file_r(&files::users_loc(&dir))?);
        let commits = Arc::new(osfiles::open_file_r(&files::commits_loc(&dir))?);
        let repos = Arc::new(osfiles::open_file_r(&files::repos_loc(&dir))?);

        let users_by_id = Indexer::open(
            &files::users_by_id_loc(&dir),
            Arc::clone(&users),
            KeyCmp::Direct,
        )?;
        let repos_by_id = Indexer::open(
            &files::repos_by_id_loc(&dir),
            Arc::clone(&repos),
            KeyCmp::Direct,
        )?;
        let commits_by_repo = Indexer::open_grouped(
            &files::commits_by_repo_loc(&dir),
            &files::commits_by_repo_blocks_loc(&dir),
            Arc::clone(&commits),
            KeyCmp::Direct,
        )?;
        let repos_by_last_commit = Indexer::open(
            &files::repos_by_last_commit_loc(&dir),
            Arc::clone(&repos),
            KeyCmp::Direct,
        )?;
        let repos_by_language = Indexer::open_grouped(
            &files::repos_by_language_loc(&dir),
            &files::repos_by_language_blocks_loc(&dir),
            Arc::clone(&repos),
            KeyCmp::InFile(Arc::clone(&repos)),
        )?;
        let commits_by_date = Indexer::open(
            &files::commits_by_date_loc(&dir),
            Arc::clone(&commits),
            KeyCmp::Direct,
        )?;
        let collaborators = Indexer::open_grouped(
            &files::collaborators_loc(&dir),
            &files::collaborators_blocks_loc(&dir),
            Arc::clone(&users),
            KeyCmp::Direct,
        )?;

        let statics = err_at!(IOError, fs::read(path::Path::new(&files::static_queries_loc(&dir))))?;
        if statics.len() < 36 {
            warn!(target: "catalog", "statics record short {}/36, rebuilding", statics.len());
            return Ok(None);
        }
        let rec = STATICS_FORMAT.unsafe_read(&statics)?;

        Ok(Some(Catalog {
            config,
            cache,
            lockf,
            users,
            commits,
            repos,
            user_format: user::compressed_format(),
            commit_format: commit::compressed_format(),
            repo_format: repo::compressed_format(),
            users_by_id,
            repos_by_id,
            commits_by_repo,
            repos_by_last_commit,
            repos_by_language,
            commits_by_date,
            collaborators,
            user_count: rec[0].as_int()?,
            organization_count: rec[1].as_int()?,
            bot_count: rec[2].as_int()?,
            q2: rec[3].as_double()?,
            q3: rec[4].as_double()?,
            q4: rec[5].as_double()?,
        }))
    }

    pub fn as_config(&self) -> &Config {
        &self.config
    }

    pub fn as_cache(&self) -> &Cache {
        &self.cache
    }

    /// (user, organization, bot) counts of the accounts dataset.
    pub fn to_kind_counts(&self) -> (i32, i32, i32) {
        (self.user_count, self.organization_count, self.bot_count)
    }

    /// Mean number of collaborators per repository.
    pub fn to_q2(&self) -> f64 {
        self.q2
    }

    /// Number of repositories with at least one bot contributor.
    pub fn to_q3(&self) -> i64 {
        self.q3 as i64
    }

    /// Mean number of commits per account.
    pub fn to_q4(&self) -> f64 {
        self.q4
    }

    /// Accounts surviving ingest.
    pub fn users_count(&self) -> usize {
        self.users_by_id.len()
    }

    /// Commits surviving ingest.
    pub fn commits_count(&self) -> usize {
        self.commits_by_date.len()
    }

    /// Repositories with at least one commit, including phantom repos
    /// that commits point to but the repos dataset dropped.
    pub fn repos_count(&self) -> usize {
        self.commits_by_repo.len()
    }

    pub fn new_user_lazy(&self) -> Result<Lazy> {
        Lazy::new(Arc::clone(&self.users), 0, &self.user_format)
    }

    pub fn new_commit_lazy(&self) -> Result<Lazy> {
        Lazy::new(Arc::clone(&self.commits), 0, &self.commit_format)
    }

    pub fn new_repo_lazy(&self) -> Result<Lazy> {
        Lazy::new(Arc::clone(&self.repos), 0, &self.repo_format)
    }

    /// Rewire `lazy` onto the account with the given id.
    pub fn user_by_id(&self, id: i32, lazy: &mut Lazy) -> Result<bool> {
        self.users_by_id.find_as_lazy(&Probe::Pos(id as u64), &self.cache, lazy)
    }

    /// Rewire `lazy` onto the repository with the given id.
    pub fn repo_by_id(&self, id: i32, lazy: &mut Lazy) -> Result<bool> {
        self.repos_by_id.find_as_lazy(&Probe::Pos(id as u64), &self.cache, lazy)
    }

    /// Login of the account with the given id.
    pub fn login_of(&self, id: i32, lazy: &mut Lazy) -> Result<String> {
        if self.user_by_id(id, lazy)? {
            Ok(lazy.get_str(user::CU_LOGIN, &self.cache)?.to_string())
        } else {
            err_at!(KeyNotFound, msg: "user {}", id)
        }
    }

    /// Per-account commit count over the closed date interval.
    pub fn commit_counts_between(&self, start: Date, end: Date) -> Result<HashMap<i32, i64>> {
        let cache = &self.cache;
        let (d1, d2) = (start.pack() as u64, end.pack() as u64);
        let mut counts = HashMap::new();
        let mut commit = self.new_commit_lazy()?;

        let n = self.commits_by_date.len();
        for i in self.commits_by_date.lower_bound(&Probe::Pos(d1), cache)?..n {
            if self.commits_by_date.key_at(i, cache)? > d2 {
                break;
            }
            self.commits_by_date.value_as_lazy(i, cache, &mut commit)?;
            let author = commit.get_int(commit::CC_AUTHOR_ID, cache)?;
            let committer = commit.get_int(commit::CC_COMMITTER_ID, cache)?;
            *counts.entry(author).or_insert(0) += 1;
            if committer != author {
                *counts.entry(committer).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Per-account commit count over the repositories of the given
    /// language, case insensitive.
    pub fn commit_counts_for_language(&self, lang: &str) -> Result<HashMap<i32, i64>> {
        let cache = &self.cache;
        let lang = lang.to_ascii_lowercase();
        let mut counts = HashMap::new();

        let block = match self.repos_by_language.find(&Probe::Bytes(lang.as_bytes()), cache)? {
            Some(block) => block,
            None => return Ok(counts),
        };
        let mut repo = self.new_repo_lazy()?;
        let mut commit = self.new_commit_lazy()?;

        for i in 0..self.repos_by_language.group_size(block, cache)? {
            self.repos_by_language.group_elem_as_lazy(block, i, cache, &mut repo)?;
            let repo_id = repo.get_int(repo::CR_ID, cache)?;

            let commits = match self.commits_by_repo.find(&Probe::Pos(repo_id as u64), cache)? {
                Some(commits) => commits,
                None => continue,
            };
            for j in 0..self.commits_by_repo.group_size(commits, cache)? {
                self.commits_by_repo.group_elem_as_lazy(commits, j, cache, &mut commit)?;
                let committer = commit.get_int(commit::CC_COMMITTER_ID, cache)?;
                let author = commit.get_int(commit::CC_AUTHOR_ID, cache)?;
                *counts.entry(committer).or_insert(0) += 1;
                if committer != author {
                    *counts.entry(author).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }

    /// `(id, description)` of every repository whose last commit
    /// predates the cutoff, in last-commit order.
    pub fn inactive_repos_before(&self, cutoff: Date) -> Result<Vec<(i32, String)>> {
        let cache = &self.cache;
        let mut repo = self.new_repo_lazy()?;
        let mut out = vec![];

        let last = {
            let probe = Probe::Pos(cutoff.pack() as u64);
            self.repos_by_last_commit.lower_bound(&probe, cache)?
        };
        for i in 0..last {
            self.repos_by_last_commit.value_as_lazy(i, cache, &mut repo)?;
            let id = repo.get_int(repo::CR_ID, cache)?;
            let description = repo
                .get_opt_str(repo::CR_DESCRIPTION, cache)?
                .unwrap_or("")
                .to_string();
            out.push((id, description));
        }
        Ok(out)
    }

    /// Per-language count of commits made on or after the start date.
    pub fn language_counts_since(&self, start: Date) -> Result<HashMap<String, i64>> {
        let cache = &self.cache;
        let mut counts = HashMap::new();
        let mut commit = self.new_commit_lazy()?;
        let mut repo = self.new_repo_lazy()?;

        let n = self.commits_by_date.len();
        let from = {
            let probe = Probe::Pos(start.pack() as u64);
            self.commits_by_date.lower_bound(&probe, cache)?
        };
        for i in from..n {
            self.commits_by_date.value_as_lazy(i, cache, &mut commit)?;
            let repo_id = commit.get_int(commit::CC_REPO_ID, cache)?;
            if self.repo_by_id(repo_id, &mut repo)? {
                let language = repo.get_str(repo::CR_LANGUAGE, cache)?;
                match counts.get_mut(language) {
                    Some(count) => *count += 1,
                    None => {
                        counts.insert(language.to_string(), 1);
                    }
                }
            }
        }
        Ok(counts)
    }

    /// Per-account count of commits to repositories owned by a
    /// friend, resolved from the precomputed friendship bits.
    pub fn friend_commit_counts(&self) -> Result<HashMap<i32, i64>> {
        let cache = &self.cache;
        let mut counts = HashMap::new();
        let mut commit = self.new_commit_lazy()?;

        for i in 0..self.commits_by_date.len() {
            self.commits_by_date.value_as_lazy(i, cache, &mut commit)?;
            let author = commit.get_int(commit::CC_AUTHOR_ID, cache)?;
            let committer = commit.get_int(commit::CC_COMMITTER_ID, cache)?;
            if commit.get_bool(commit::CC_AUTHOR_FRIEND, cache)? {
                *counts.entry(author).or_insert(0) += 1;
            }
            if committer != author && commit.get_bool(commit::CC_COMMITTER_FRIEND, cache)? {
                *counts.entry(committer).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// For the repository group at `slot`: the repository id and, per
    /// contributor, the longest commit message they wrote to it.
    pub fn longest_messages_in_repo(&self, slot: usize) -> Result<(i32, HashMap<i32, i64>)> {
        let cache = &self.cache;
        let mut longest: HashMap<i32, i64> = HashMap::new();
        let mut commit = self.new_commit_lazy()?;

        let repo_id = self.commits_by_repo.key_at(slot, cache)? as i32;
        let block = self.commits_by_repo.value_at(slot, cache)?;
        for j in 0..self.commits_by_repo.group_size(block, cache)? {
            self.commits_by_repo.group_elem_as_lazy(block, j, cache, &mut commit)?;
            let length = commit.get_int(commit::CC_MESSAGE_LEN, cache)? as i64;
            let author = commit.get_int(commit::CC_AUTHOR_ID, cache)?;
            let committer = commit.get_int(commit::CC_COMMITTER_ID, cache)?;

            let best = longest.entry(author).or_insert(length);
            *best = (*best).max(length);
            if committer != author {
                let best = longest.entry(committer).or_insert(length);
                *best = (*best).max(length);
            }
        }
        Ok((repo_id, longest))
    }

    // Resolve q2/q3/q4 and set the per-commit friendship bits in
    // place. Group slot i of `collaborators` and `commits_by_repo`
    // refer to the same repository: both are grouped over the same
    // key set.
    fn solve_static_queries(&mut self) -> Result<()> {
        let cache = &self.cache;
        let mut owner = self.new_user_lazy()?;
        let mut contributor = self.new_user_lazy()?;
        let mut commit = self.new_commit_lazy()?;
        let mut repo = self.new_repo_lazy()?;

        let n_repos = self.commits_by_repo.len();
        let mut collab_sum: i64 = 0;
        let mut repos_with_bots: i64 = 0;

        for i in 0..n_repos {
            let collabs = self.collaborators.value_at(i, cache)?;
            collab_sum += self.collaborators.group_size(collabs, cache)? as i64;

            // phantom repos still count collaborators, nothing else.
            let repo_key = self.commits_by_repo.key_at(i, cache)?;
            if !self.repos_by_id.find_as_lazy(&Probe::Pos(repo_key), cache, &mut repo)? {
                continue;
            }
            let owner_id = repo.get_int(repo::CR_OWNER_ID, cache)?;
            if !self.user_by_id(owner_id, &mut owner)? {
                continue;
            }

            let block = self.commits_by_repo.value_at(i, cache)?;
            let mut found_bot = false;
            for j in 0..self.commits_by_repo.group_size(block, cache)? {
                self.commits_by_repo.group_elem_as_lazy(block, j, cache, &mut commit)?;
                let author = commit.get_int(commit::CC_AUTHOR_ID, cache)?;
                let committer = commit.get_int(commit::CC_COMMITTER_ID, cache)?;

                if self.user_by_id(author, &mut contributor)? {
                    if !found_bot && contributor.get_kind(user::CU_KIND, cache)? == Kind::Bot {
                        repos_with_bots += 1;
                        found_bot = true;
                    }
                    if are_friends(&mut contributor, &mut owner, author, owner_id, cache)? {
                        commit.set(commit::CC_AUTHOR_FRIEND, Value::Bool(true));
                    }
                }

                if committer != author && self.user_by_id(committer, &mut contributor)? {
                    if !found_bot && contributor.get_kind(user::CU_KIND, cache)? == Kind::Bot {
                        repos_with_bots += 1;
                        found_bot = true;
                    }
                    if are_friends(&mut contributor, &mut owner, committer, owner_id, cache)? {
                        commit.set(commit::CC_COMMITTER_FRIEND, Value::Bool(true));
                    }
                }

                commit.flush(cache)?;
            }
        }

        self.q2 = match n_repos {
            0 => 0.0,
            n => (collab_sum as f64) / (n as f64),
        };
        self.q3 = repos_with_bots as f64;
        self.q4 = match self.users_by_id.len() {
            0 => 0.0,
            n => (self.commits_by_date.len() as f64) / (n as f64),
        };
        debug!(target: "catalog", "static queries done over {} repos", n_repos);
        Ok(())
    }

    fn write_static_queries(&self) -> Result<()> {
        let rec = vec![
            Value::Int(self.user_count),
            Value::Int(self.organization_count),
            Value::Int(self.bot_count),
            Value::Double(self.q2),
            Value::Double(self.q3),
            Value::Double(self.q4),
        ];
        let mut buf = vec![];
        STATICS_FORMAT.write(&rec, &mut buf)?;

        let loc = files::static_queries_loc(&self.config.dir);
        let fd = osfiles::create_file_rw(&loc)?;
        write_file!(fd, 0, &buf, "static queries")?;
        Ok(())
    }
}

// a and b are friends when each appears in the other's friends list.
fn are_friends(
    a: &mut Lazy,
    b: &mut Lazy,
    a_id: i32,
    b_id: i32,
    cache: &Cache,
) -> Result<bool> {
    let in_b = util::contained_in_sorted(b.get_ids(user::CU_FRIENDS, cache)?, a_id);
    let in_a = util::contained_in_sorted(a.get_ids(user::CU_FRIENDS, cache)?, b_id);
    Ok(in_b && in_a)
}

fn open_lock(dir: &ffi::OsStr) -> Result<fs::File> {
    let loc = files::lock_loc(dir);
    let mut opts = fs::OpenOptions::new();
    err_at!(
        IOError,
        opts.read(true).write(true).create(true).open(path::Path::new(&loc))
    )
}

// Parse the accounts CSV: write the compressed records, index them by
// id, sort the index, and count accounts per kind.
fn parse_users(
    loc: &ffi::OsStr,
    users: &Arc<fs::File>,
    mut users_by_id: Indexer,
    validate: bool,
    cache: &Cache,
) -> Result<(Indexer, (i32, i32, i32))> {
    let csv_format = user::csv_format();
    let compressed = user::compressed_format();

    let mut rd = LineReader::new(osfiles::open_file_r(loc)?);
    rd.next_line()?; // header

    let mut w = io::BufWriter::new(&**users);
    let mut fpos = 0_u64;
    let (mut n_users, mut n_organizations, mut n_bots) = (0, 0, 0);

    while let Some(line) = rd.next_line()? {
        let rec = if validate {
            match csv_format.read(line.as_bytes()) {
                Ok(rec) => rec,
                Err(_) => continue, // bad row, dropped
            }
        } else {
            csv_format.unsafe_read(line.as_bytes())?
        };

        match rec[user::U_KIND].as_kind()? {
            Kind::User => n_users += 1,
            Kind::Organization => n_organizations += 1,
            Kind::Bot => n_bots += 1,
        }

        let friends = user::friends_of(
            rec[user::U_FOLLOWER_LIST].as_ids()?,
            rec[user::U_FOLLOWING_LIST].as_ids()?,
        );
        let comp = user::compress(&rec, friends)?;

        let mut buf = vec![];
        compressed.write(&comp, &mut buf)?;
        err_at!(IOError, w.write_all(&buf))?;

        users_by_id.insert(rec[user::U_ID].as_int()? as u64, fpos)?;
        fpos += buf.len() as u64;
    }
    err_at!(IOError, w.flush())?;

    users_by_id.sort(cache)?;
    debug!(target: "catalog", "parsed {} accounts", users_by_id.len());
    Ok((users_by_id, (n_users, n_organizations, n_bots)))
}

// First pass over the repositories CSV: just the set of valid ids,
// needed to filter commits before the repos are parsed for real.
fn scan_repo_ids(loc: &ffi::OsStr, validate: bool) -> Result<HashSet<i32>> {
    let csv_format = repo::csv_format();

    let mut rd = LineReader::new(osfiles::open_file_r(loc)?);
    rd.next_line()?; // header

    let mut ids = HashSet::new();
    while let Some(line) = rd.next_line()? {
        let rec = if validate {
            match csv_format.read(line.as_bytes()) {
                Ok(rec) => rec,
                Err(_) => continue,
            }
        } else {
            csv_format.unsafe_read(line.as_bytes())?
        };
        ids.insert(rec[repo::R_ID].as_int()?);
    }
    Ok(ids)
}

// Parse the commits CSV: drop rows whose author, committer or repo
// fails lookup, write the survivors compressed, and track the last
// commit date per repository.
fn filter_commits(
    loc: &ffi::OsStr,
    commits: &Arc<fs::File>,
    users_by_id: &Indexer,
    repo_ids: &HashSet<i32>,
    validate: bool,
    cache: &Cache,
) -> Result<HashMap<i32, u32>> {
    let csv_format = commit::csv_format();
    let compressed = commit::compressed_format();

    let mut rd = LineReader::new(osfiles::open_file_r(loc)?);
    rd.next_line()?; // header

    let mut w = io::BufWriter::new(&**commits);
    let mut last_commit: HashMap<i32, u32> = HashMap::new();

    while let Some(line) = rd.next_line()? {
        let rec = if validate {
            match csv_format.read(line.as_bytes()) {
                Ok(rec) => rec,
                Err(_) => continue,
            }
        } else {
            csv_format.unsafe_read(line.as_bytes())?
        };

        let repo_id = rec[commit::C_REPO_ID].as_int()?;
        let author = rec[commit::C_AUTHOR_ID].as_int()?;
        let committer = rec[commit::C_COMMITTER_ID].as_int()?;

        if validate {
            let known = |id: i32| -> Result<bool> {
                Ok(users_by_id.exact(&Probe::Pos(id as u64), cache)?.is_some())
            };
            if !known(author)?
                || !(author == committer || known(committer)?)
                || !repo_ids.contains(&repo_id)
            {
                continue;
            }
        }

        let comp = commit::compress(&rec)?;
        let mut buf = vec![];
        compressed.write(&comp, &mut buf)?;
        err_at!(IOError, w.write_all(&buf))?;

        let date = rec[commit::C_COMMIT_AT].as_date()?.pack();
        let stored = last_commit.entry(repo_id).or_insert(date);
        *stored = (*stored).max(date);
    }
    err_at!(IOError, w.flush())?;

    Ok(last_commit)
}

// Parse the repositories CSV: keep rows whose owner exists and which
// have at least one commit, substitute the last commit date, lowercase
// the language, and feed the three repo indexes.
#[allow(clippy::too_many_arguments)]
fn parse_repos(
    loc: &ffi::OsStr,
    repos: &Arc<fs::File>,
    users_by_id: &Indexer,
    last_commit: &HashMap<i32, u32>,
    repos_by_id: &mut Indexer,
    repos_by_last_commit: &mut Indexer,
    repos_by_language: &mut Indexer,
    validate: bool,
    cache: &Cache,
) -> Result<()> {
    let csv_format = repo::csv_format();
    let compressed = repo::compressed_format();

    let mut rd = LineReader::new(osfiles::open_file_r(loc)?);
    rd.next_line()?; // header

    let mut w = io::BufWriter::new(&**repos);
    let mut fpos = 0_u64;
    let mut lazy = Lazy::new(Arc::clone(repos), 0, &compressed)?;

    while let Some(line) = rd.next_line()? {
        let rec = if validate {
            match csv_format.read(line.as_bytes()) {
                Ok(rec) => rec,
                Err(_) => continue,
            }
        } else {
            csv_format.unsafe_read(line.as_bytes())?
        };

        let repo_id = rec[repo::R_ID].as_int()?;
        let owner_id = rec[repo::R_OWNER_ID].as_int()?;
        let last = match last_commit.get(&repo_id) {
            Some(packed) => *packed,
            None => continue, // no observed commit
        };
        if validate && users_by_id.exact(&Probe::Pos(owner_id as u64), cache)?.is_none() {
            continue;
        }

        let comp = repo::compress(&rec, Date::unpack(last))?;
        let mut buf = vec![];
        compressed.write(&comp, &mut buf)?;
        err_at!(IOError, w.write_all(&buf))?;

        repos_by_id.insert(repo_id as u64, fpos)?;
        repos_by_last_commit.insert(last as u64, fpos)?;

        // key the language index by the position of the language
        // length member, so comparisons read `(len, bytes)` straight
        // from the record file.
        lazy.retarget(Arc::clone(repos), fpos);
        let lang_pos = lazy.offset_of(repo::CR_LANGUAGE_LEN, cache)?;
        repos_by_language.insert(lang_pos, fpos)?;

        fpos += buf.len() as u64;
    }
    err_at!(IOError, w.flush())?;

    debug!(target: "catalog", "parsed {} repositories", repos_by_id.len());
    Ok(())
}

// Scan the compressed commits sequentially and feed the three commit
// indexes. Collaborator entries are account record offsets, so that
// grouping with dedup leaves one entry per distinct contributor.
fn parse_commits(
    commits: &Arc<fs::File>,
    users_by_id: &Indexer,
    commits_by_date: &mut Indexer,
    commits_by_repo: &mut Indexer,
    collaborators: &mut Indexer,
    cache: &Cache,
) -> Result<()> {
    let compressed = commit::compressed_format();
    let mut lazy = Lazy::new(Arc::clone(commits), 0, &compressed)?;

    let size = err_at!(IOError, commits.metadata())?.len();
    let mut fpos = 0;

    while fpos < size {
        lazy.retarget(Arc::clone(commits), fpos);
        let date = lazy.get_date(commit::CC_COMMIT_AT, cache)?;
        let repo_id = lazy.get_int(commit::CC_REPO_ID, cache)?;
        let author = lazy.get_int(commit::CC_AUTHOR_ID, cache)?;
        let committer = lazy.get_int(commit::CC_COMMITTER_ID, cache)?;

        commits_by_date.insert(date.pack() as u64, fpos)?;
        commits_by_repo.insert(repo_id as u64, fpos)?;
        if let Some(at) = users_by_id.find(&Probe::Pos(author as u64), cache)? {
            collaborators.insert(repo_id as u64, at)?;
        }
        if author != committer {
            if let Some(at) = users_by_id.find(&Probe::Pos(committer as u64), cache)? {
                collaborators.insert(repo_id as u64, at)?;
            }
        }

        fpos = lazy.offset_after(cache)?;
    }

    debug!(target: "catalog", "indexed {} commits", commits_by_date.len());
    Ok(())
}
