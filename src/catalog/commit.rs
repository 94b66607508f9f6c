//! Commit records: the CSV row shape and the compressed on-disk
//! shape.
//!
//! The compressed record carries two friendship bits that are false at
//! ingest and filled in by the static-queries pass, once the owner of
//! every repository is known.

use lazy_static::lazy_static;

use crate::{
    format::{FieldType, Format, LenPair, Record, Value},
    Result,
};

// CSV columns.
pub const C_REPO_ID: usize = 0;
pub const C_AUTHOR_ID: usize = 1;
pub const C_COMMITTER_ID: usize = 2;
pub const C_COMMIT_AT: usize = 3;
pub const C_MESSAGE: usize = 4;

// Compressed record members.
pub const CC_REPO_ID: usize = 0;
pub const CC_AUTHOR_ID: usize = 1;
pub const CC_AUTHOR_FRIEND: usize = 2;
pub const CC_COMMITTER_ID: usize = 3;
pub const CC_COMMITTER_FRIEND: usize = 4;
pub const CC_COMMIT_AT: usize = 5;
pub const CC_MESSAGE_LEN: usize = 6;
pub const CC_MESSAGE: usize = 7;

lazy_static! {
    static ref CSV_FORMAT: Format = Format::new(
        vec![
            FieldType::Int,
            FieldType::Int,
            FieldType::Int,
            FieldType::DateTime,
            FieldType::StrNull,
        ],
        vec![LenPair { list: C_MESSAGE, length: None }],
        Some(b';'),
    )
    .expect("commit csv schema");
    static ref COMPRESSED_FORMAT: Format = Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::BinBool,
            FieldType::BinInt,
            FieldType::BinBool,
            FieldType::BinDateTime,
            FieldType::BinInt,
            FieldType::StrNull,
        ],
        vec![LenPair { list: CC_MESSAGE, length: Some(CC_MESSAGE_LEN) }],
        None,
    )
    .expect("commit record schema");
}

/// The CSV row descriptor of a commit.
pub fn csv_format() -> Format {
    CSV_FORMAT.clone()
}

/// The compressed on-disk descriptor of a commit.
pub fn compressed_format() -> Format {
    COMPRESSED_FORMAT.clone()
}

/// Build the compressed record out of a parsed CSV row. Friendship
/// bits start out false.
pub fn compress(rec: &Record) -> Result<Record> {
    let message = rec[C_MESSAGE].opt_str();
    Ok(vec![
        rec[C_REPO_ID].clone(),
        rec[C_AUTHOR_ID].clone(),
        Value::Bool(false),
        rec[C_COMMITTER_ID].clone(),
        Value::Bool(false),
        rec[C_COMMIT_AT].clone(),
        Value::Int(message.map_or(0, |s| s.len()) as i32),
        match message {
            Some(s) => Value::Str(s.to_string()),
            None => Value::Nil,
        },
    ])
}

#[cfg(test)]
#[path = "commit_test.rs"]
mod commit_test;
