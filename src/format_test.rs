use super::*;

use crate::{date::Date, util::Kind};

fn account_csv_format() -> Format {
    Format::new(
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
            LenPair { list: 5, length: Some(4) },
            LenPair { list: 7, length: Some(6) },
        ],
        Some(b';'),
    )
    .unwrap()
}

#[test]
fn test_textual_read() {
    let format = account_csv_format();
    let line = b"1234;alice;User;2015-06-01 00:00:00;1;[2];1;[2];3;4";

    let rec = format.read(line).unwrap();
    assert_eq!(rec[0].as_int().unwrap(), 1234);
    assert_eq!(rec[1].as_str().unwrap(), "alice");
    assert_eq!(rec[2].as_kind().unwrap(), Kind::User);
    assert_eq!(rec[3].as_date().unwrap(), Date::new(2015, 6, 1, 0, 0, 0));
    assert_eq!(rec[4].as_int().unwrap(), 1);
    assert_eq!(rec[5].as_ids().unwrap(), &[2]);
    assert_eq!(rec[9].as_int().unwrap(), 4);

    assert!(format.check(line));
}

#[test]
fn test_textual_read_failures() {
    let format = account_csv_format();

    // bad integer token.
    assert!(format.read(b"12x4;alice;User;2015-06-01 00:00:00;1;[2];1;[2];3;4").is_err());
    // arity mismatch.
    assert!(format.read(b"1234;alice;User;2015-06-01 00:00:00;1;[2];1;[2];3").is_err());
    // empty non-null string.
    assert!(format.read(b"1234;;User;2015-06-01 00:00:00;1;[2];1;[2];3;4").is_err());
    // bad kind.
    assert!(format.read(b"1234;alice;Robot;2015-06-01 00:00:00;1;[2];1;[2];3;4").is_err());
    // list length disagrees with its paired member.
    assert!(format.read(b"1234;alice;User;2015-06-01 00:00:00;2;[2];1;[2];3;4").is_err());
    // unsafe read skips the pairing check.
    assert!(format
        .unsafe_read(b"1234;alice;User;2015-06-01 00:00:00;2;[2];1;[2];3;4")
        .is_ok());
}

#[test]
fn test_textual_write() {
    let format = account_csv_format();
    let line = b"1234;alice;User;2015-06-01 00:00:00;1;[2];1;[2];3;4";
    let rec = format.read(line).unwrap();

    let mut out = vec![];
    format.write(&rec, &mut out).unwrap();
    assert_eq!(out, line.to_vec());
}

#[test]
fn test_binary_round_trip() {
    let format = Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::Str,
            FieldType::BinKind,
            FieldType::BinBool,
            FieldType::BinDateTime,
            FieldType::BinInt,
            FieldType::BinIntList,
            FieldType::BinDouble,
            FieldType::BinInt,
            FieldType::StrNull,
        ],
        vec![
            LenPair { list: 2, length: Some(1) },
            LenPair { list: 7, length: Some(6) },
            LenPair { list: 10, length: Some(9) },
        ],
        None,
    )
    .unwrap();

    let rec = vec![
        Value::Int(42),
        Value::Int(5),
        Value::Str("alice".to_string()),
        Value::Kind(Kind::Bot),
        Value::Bool(true),
        Value::Date(Date::new(2019, 12, 31, 23, 59, 59)),
        Value::Int(3),
        Value::IntList(vec![7, 8, 9]),
        Value::Double(2.5),
        Value::Int(0),
        Value::Nil,
    ];

    let mut buf = vec![];
    format.write(&rec, &mut buf).unwrap();
    assert_eq!(buf.len(), 4 + 4 + 5 + 1 + 1 + 4 + 4 + 12 + 8 + 4);

    assert_eq!(format.read(&buf).unwrap(), rec);
    assert_eq!(format.unsafe_read(&buf).unwrap(), rec);

    // truncated input fails cleanly.
    assert!(format.read(&buf[..buf.len() - 3]).is_err());
}

#[test]
fn test_binary_specs() {
    // variable field without a length member.
    assert!(Format::new(
        vec![FieldType::BinInt, FieldType::Str],
        vec![LenPair { list: 1, length: None }],
        None,
    )
    .is_err());

    // length member declared after its list.
    assert!(Format::new(
        vec![FieldType::Str, FieldType::BinInt],
        vec![LenPair { list: 0, length: Some(1) }],
        None,
    )
    .is_err());

    // textual kinds have no binary form.
    assert!(Format::new(vec![FieldType::Int], vec![], None).is_err());

    // pairs out of order.
    assert!(Format::new(
        vec![
            FieldType::BinInt,
            FieldType::Str,
            FieldType::BinInt,
            FieldType::Str,
        ],
        vec![
            LenPair { list: 3, length: Some(2) },
            LenPair { list: 1, length: Some(0) },
        ],
        None,
    )
    .is_err());
}

#[test]
fn test_new_record() {
    let format = account_csv_format();
    let rec = format.new_record();
    assert_eq!(rec.len(), 10);
    assert!(rec.iter().all(|value| *value == Value::Nil));
}
