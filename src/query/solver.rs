//! The per-query solvers, one function per catalogued query.

use std::{collections::HashMap, io};

use crate::{catalog::Catalog, err_at, Date, Error, Result};

// counting map to ranked rows: count descending, key ascending on
// ties, so repeated runs emit identical output.
fn sorted_desc<K>(counts: HashMap<K, i64>) -> Vec<(K, i64)>
where
    K: Ord,
{
    let mut pairs: Vec<(K, i64)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    pairs
}

fn take_n(n: i32) -> usize {
    if n < 0 {
        0
    } else {
        n as usize
    }
}

/// Query 1: account counts per kind.
pub fn query_one<W>(catalog: &Catalog, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    let (users, organizations, bots) = catalog.to_kind_counts();
    err_at!(
        IOError,
        write!(out, "Bot: {}\nOrganization: {}\nUser: {}\n", bots, organizations, users)
    )
}

/// Query 5: top-N most active accounts inside the closed date range.
pub fn query_five<W>(catalog: &Catalog, n: i32, start: Date, mut end: Date, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    end.set_time(23, 59, 59); // the whole of the end day counts

    let rows = sorted_desc(catalog.commit_counts_between(start, end)?);
    let mut lazy = catalog.new_user_lazy()?;
    for (id, count) in rows.into_iter().take(take_n(n)) {
        let login = catalog.login_of(id, &mut lazy)?;
        err_at!(IOError, write!(out, "{};{};{}\n", id, login, count))?;
    }
    Ok(())
}

/// Query 6: top-N accounts by commits in repositories of a language.
pub fn query_six<W>(catalog: &Catalog, n: i32, lang: &str, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    let rows = sorted_desc(catalog.commit_counts_for_language(lang)?);
    let mut lazy = catalog.new_user_lazy()?;
    for (id, count) in rows.into_iter().take(take_n(n)) {
        let login = catalog.login_of(id, &mut lazy)?;
        err_at!(IOError, write!(out, "{};{};{}\n", id, login, count))?;
    }
    Ok(())
}

/// Query 7: repositories with no commit since the cutoff.
pub fn query_seven<W>(catalog: &Catalog, cutoff: Date, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    for (id, description) in catalog.inactive_repos_before(cutoff)? {
        err_at!(IOError, write!(out, "{};{}\n", id, description))?;
    }
    Ok(())
}

/// Query 8: top-N languages with a commit on or after the start date.
/// The placeholder language `none` never makes the list and never
/// consumes a slot of the requested top-N.
pub fn query_eight<W>(catalog: &Catalog, n: i32, start: Date, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    let rows = sorted_desc(catalog.language_counts_since(start)?);
    let mut remaining = take_n(n);
    for (lang, _) in rows {
        if remaining == 0 {
            break;
        }
        if lang == "none" {
            continue;
        }
        err_at!(IOError, write!(out, "{}\n", lang))?;
        remaining -= 1;
    }
    Ok(())
}

/// Query 9: top-N accounts by commits to repositories their friends
/// own.
pub fn query_nine<W>(catalog: &Catalog, n: i32, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    let rows = sorted_desc(catalog.friend_commit_counts()?);
    let mut lazy = catalog.new_user_lazy()?;
    for (id, _) in rows.into_iter().take(take_n(n)) {
        let login = catalog.login_of(id, &mut lazy)?;
        err_at!(IOError, write!(out, "{};{}\n", id, login))?;
    }
    Ok(())
}

/// Query 10: per repository, the top-N contributors by longest commit
/// message.
pub fn query_ten<W>(catalog: &Catalog, n: i32, out: &mut W) -> Result<()>
where
    W: io::Write,
{
    let mut lazy = catalog.new_user_lazy()?;
    for slot in 0..catalog.repos_count() {
        let (repo_id, longest) = catalog.longest_messages_in_repo(slot)?;
        for (id, length) in sorted_desc(longest).into_iter().take(take_n(n)) {
            let login = catalog.login_of(id, &mut lazy)?;
            err_at!(IOError, write!(out, "{};{};{};{}\n", id, login, length, repo_id))?;
        }
    }
    Ok(())
}
