//! Account records: the CSV row shape and the compressed on-disk
//! shape.
//!
//! The compressed record keeps only what the queries need: id, login,
//! kind and the friends list. The friends list is the sorted
//! intersection of the followers and following lists, computed once
//! at ingest.

use lazy_static::lazy_static;

use crate::{
    format::{FieldType, Format, LenPair, Record, Value},
    util, Result,
};

// CSV columns.
pub const U_ID: usize = 0;
pub const U_LOGIN: usize = 1;
pub const U_KIND: usize = 2;
pub const U_CREATED_AT: usize = 3;
pub const U_FOLLOWERS: usize = 4;
pub const U_FOLLOWER_LIST: usize = 5;
pub const U_FOLLOWING: usize = 6;
pub const U_FOLLOWING_LIST: usize = 7;
pub const U_PUBLIC_GISTS: usize = 8;
pub const U_PUBLIC_REPOS: usize = 9;

// Compressed record members.
pub const CU_ID: usize = 0;
pub const CU_LOGIN_LEN: usize = 1;
pub const CU_KIND: usize = 2;
pub const CU_FRIENDS_LEN: usize = 3;
pub const CU_FRIENDS: usize = 4;
pub const CU_LOGIN: usize = 5;

lazy_static! {
    static ref CSV_FORMAT: Format = Format::new(
        vec![
            FieldType::Int,
            FieldType::Str,
            FieldType::Kind,
            FieldType::DateTime,
            FieldType::Int,
            FieldType::IntList,
            FieldType::Int,
            FieldType::IntList,
            FieldType::Int,
            FieldType::Int,
        ],
        vec![
            LenPair { list: U_LOGIN, length: None },
            LenPair { list: U_FOLLOWER_LIST, length: Some(U_FOLLOWERS) },
            LenPair { list: U_FOLLOWING_LIST, length: Some(U_FOLLOWING) },
        ],
        Some(b';'),
    )
    .expect("account csv schema");
    static ref COMPRESSED_FORMAT: Format = Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::BinKind,
            FieldType::BinInt,
            FieldType::BinIntList,
            FieldType::Str,
        ],
        vec![
            LenPair { list: CU_FRIENDS, length: Some(CU_FRIENDS_LEN) },
            LenPair { list: CU_LOGIN, length: Some(CU_LOGIN_LEN) },
        ],
        None,
    )
    .expect("account record schema");
}

/// The CSV row descriptor of an account.
pub fn csv_format() -> Format {
    CSV_FORMAT.clone()
}

/// The compressed on-disk descriptor of an account.
pub fn compressed_format() -> Format {
    COMPRESSED_FORMAT.clone()
}

/// Friends are the accounts that appear in both lists. The result is
/// sorted ascending, ready for binary search.
pub fn friends_of(followers: &[i32], following: &[i32]) -> Vec<i32> {
    if followers.is_empty() || following.is_empty() {
        return vec![];
    }

    let (small, big) = if followers.len() < following.len() {
        (followers, following)
    } else {
        (following, followers)
    };
    let mut small = small.to_vec();
    small.sort_unstable();

    let mut friends: Vec<i32> = big
        .iter()
        .filter(|id| util::contained_in_sorted(&small, **id))
        .copied()
        .collect();
    friends.sort_unstable();
    friends.dedup();
    friends
}

/// Build the compressed record out of a parsed CSV row and the
/// precomputed friends list.
pub fn compress(rec: &Record, friends: Vec<i32>) -> Result<Record> {
    let login = rec[U_LOGIN].as_str()?;
    Ok(vec![
        rec[U_ID].clone(),
        Value::Int(login.len() as i32),
        rec[U_KIND].clone(),
        Value::Int(friends.len() as i32),
        Value::IntList(friends),
        Value::Str(login.to_string()),
    ])
}

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;
