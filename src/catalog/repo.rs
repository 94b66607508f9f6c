//! Repository records: the CSV row shape and the compressed on-disk
//! shape.
//!
//! Compression substitutes the computed last-commit date for the two
//! CSV timestamps and lower-cases the language, which makes the
//! language bytes directly comparable inside the file. The position of
//! the language-length member doubles as the key of the by-language
//! index.

use lazy_static::lazy_static;

use crate::{
    date::Date,
    format::{FieldType, Format, LenPair, Record, Value},
    Result,
};

// CSV columns.
pub const R_ID: usize = 0;
pub const R_OWNER_ID: usize = 1;
pub const R_FULL_NAME: usize = 2;
pub const R_LICENSE: usize = 3;
pub const R_HAS_WIKI: usize = 4;
pub const R_DESCRIPTION: usize = 5;
pub const R_LANGUAGE: usize = 6;
pub const R_DEFAULT_BRANCH: usize = 7;
pub const R_CREATED_AT: usize = 8;
pub const R_UPDATED_AT: usize = 9;
pub const R_FORKS: usize = 10;
pub const R_OPEN_ISSUES: usize = 11;
pub const R_STARGAZERS: usize = 12;
pub const R_SIZE: usize = 13;

// Compressed record members.
pub const CR_ID: usize = 0;
pub const CR_OWNER_ID: usize = 1;
pub const CR_LAST_COMMIT_AT: usize = 2;
pub const CR_LANGUAGE_LEN: usize = 3;
pub const CR_LANGUAGE: usize = 4;
pub const CR_DESCRIPTION_LEN: usize = 5;
pub const CR_DESCRIPTION: usize = 6;

lazy_static! {
    static ref CSV_FORMAT: Format = Format::new(
        vec![
            FieldType::Int,
            FieldType::Int,
            FieldType::Str,
            FieldType::Str,
            FieldType::Bool,
            FieldType::StrNull,
            FieldType::Str,
            FieldType::Str,
            FieldType::DateTime,
            FieldType::DateTime,
            FieldType::Int,
            FieldType::Int,
            FieldType::Int,
            FieldType::Int,
        ],
        vec![
            LenPair { list: R_FULL_NAME, length: None },
            LenPair { list: R_LICENSE, length: None },
            LenPair { list: R_DESCRIPTION, length: None },
            LenPair { list: R_LANGUAGE, length: None },
            LenPair { list: R_DEFAULT_BRANCH, length: None },
        ],
        Some(b';'),
    )
    .expect("repository csv schema");
    static ref COMPRESSED_FORMAT: Format = Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::BinDateTime,
            FieldType::BinInt,
            FieldType::Str,
            FieldType::BinInt,
            FieldType::StrNull,
        ],
        vec![
            LenPair { list: CR_LANGUAGE, length: Some(CR_LANGUAGE_LEN) },
            LenPair { list: CR_DESCRIPTION, length: Some(CR_DESCRIPTION_LEN) },
        ],
        None,
    )
    .expect("repository record schema");
}

/// The CSV row descriptor of a repository.
pub fn csv_format() -> Format {
    CSV_FORMAT.clone()
}

/// The compressed on-disk descriptor of a repository.
pub fn compressed_format() -> Format {
    COMPRESSED_FORMAT.clone()
}

/// Build the compressed record out of a parsed CSV row and the
/// repository's last observed commit date.
pub fn compress(rec: &Record, last_commit: Date) -> Result<Record> {
    let language = rec[R_LANGUAGE].as_str()?.to_ascii_lowercase();
    let description = rec[R_DESCRIPTION].opt_str();

    Ok(vec![
        rec[R_ID].clone(),
        rec[R_OWNER_ID].clone(),
        Value::Date(last_commit),
        Value::Int(language.len() as i32),
        Value::Str(language),
        Value::Int(description.map_or(0, |s| s.len()) as i32),
        match description {
            Some(s) => Value::Str(s.to_string()),
            None => Value::Nil,
        },
    ])
}

#[cfg(test)]
#[path = "repo_test.rs"]
mod repo_test;
