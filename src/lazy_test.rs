use super::*;

use std::{fs, io::Write, sync::Arc};

use crate::{
    cache::Cache,
    date::Date,
    format::{FieldType, Format, LenPair, Record, Value},
};

fn scratch_file(name: &str, data: &[u8]) -> Arc<fs::File> {
    let loc = std::env::temp_dir().join(format!("gitcat-{}-{}", name, std::process::id()));
    let mut fd = fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&loc)
        .unwrap();
    fd.write_all(data).unwrap();
    Arc::new(fd)
}

// id, name-len, name, flag, ids-len, ids, stamp.
fn record_format() -> Format {
    Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::Str,
            FieldType::BinBool,
            FieldType::BinInt,
            FieldType::BinIntList,
            FieldType::BinDateTime,
        ],
        vec![
            LenPair { list: 2, length: Some(1) },
            LenPair { list: 5, length: Some(4) },
        ],
        None,
    )
    .unwrap()
}

fn sample_record() -> Record {
    vec![
        Value::Int(99),
        Value::Int(4),
        Value::Str("rust".to_string()),
        Value::Bool(false),
        Value::Int(2),
        Value::IntList(vec![5, 6]),
        Value::Date(Date::new(2020, 2, 29, 12, 0, 0)),
    ]
}

#[test]
fn test_lazy_needs_binary() {
    let format = Format::new(vec![FieldType::Int], vec![], Some(b';')).unwrap();
    let file = scratch_file("lazy-textual", b"");
    assert!(Lazy::new(file, 0, &format).is_err());
}

#[test]
fn test_get_on_demand() {
    let format = record_format();
    let mut buf = vec![0_u8; 16]; // leading padding
    format.write(&sample_record(), &mut buf).unwrap();
    let file = scratch_file("lazy-get", &buf);
    let cache = Cache::new(8).unwrap();

    let mut lazy = Lazy::new(Arc::clone(&file), 16, &format).unwrap();
    // jumping straight to a late field materialises the length
    // members on the way.
    assert_eq!(lazy.get_ids(5, &cache).unwrap(), &[5, 6]);
    assert_eq!(lazy.get_str(2, &cache).unwrap(), "rust");
    assert_eq!(lazy.get_int(0, &cache).unwrap(), 99);
    assert_eq!(lazy.get_bool(3, &cache).unwrap(), false);
    assert_eq!(
        lazy.get_date(6, &cache).unwrap(),
        Date::new(2020, 2, 29, 12, 0, 0)
    );
    assert_eq!(lazy.get(1, &cache).unwrap(), &Value::Int(4));
}

#[test]
fn test_offsets() {
    let format = record_format();
    let mut buf = vec![];
    format.write(&sample_record(), &mut buf).unwrap();
    let record_len = buf.len() as u64;
    let file = scratch_file("lazy-offsets", &buf);
    let cache = Cache::new(8).unwrap();

    let mut lazy = Lazy::new(Arc::clone(&file), 0, &format).unwrap();
    assert_eq!(lazy.offset_of(0, &cache).unwrap(), 0);
    assert_eq!(lazy.offset_of(2, &cache).unwrap(), 8);
    assert_eq!(lazy.offset_of(3, &cache).unwrap(), 12);
    assert_eq!(lazy.offset_of(5, &cache).unwrap(), 17);
    assert_eq!(lazy.offset_after(&cache).unwrap(), record_len);
    assert_eq!(record_len, 4 + 4 + 4 + 1 + 4 + 8 + 4);
}

#[test]
fn test_set_and_flush() {
    let format = record_format();
    let mut buf = vec![];
    format.write(&sample_record(), &mut buf).unwrap();
    let file = scratch_file("lazy-set", &buf);
    let cache = Cache::new(8).unwrap();

    let mut lazy = Lazy::new(Arc::clone(&file), 0, &format).unwrap();
    lazy.set(3, Value::Bool(true));
    lazy.flush(&cache).unwrap();
    cache.flush_file(&file).unwrap();

    let mut fresh = Lazy::new(Arc::clone(&file), 0, &format).unwrap();
    assert_eq!(fresh.get_bool(3, &cache).unwrap(), true);
    // neighbours are untouched.
    assert_eq!(fresh.get_str(2, &cache).unwrap(), "rust");
    assert_eq!(fresh.get_ids(5, &cache).unwrap(), &[5, 6]);
}

#[test]
fn test_rebind() {
    let format = record_format();
    let mut buf = vec![];
    format.write(&sample_record(), &mut buf).unwrap();
    let file = scratch_file("lazy-rebind", &buf);
    let cache = Cache::new(8).unwrap();

    let mut lazy = Lazy::new(Arc::clone(&file), 0, &format).unwrap();
    assert_eq!(lazy.get_int(0, &cache).unwrap(), 99);

    // drop the materialised values, the target stays.
    lazy.rebind();
    assert_eq!(lazy.to_fpos(), 0);
    assert_eq!(lazy.get_int(0, &cache).unwrap(), 99);
    assert_eq!(lazy.get_str(2, &cache).unwrap(), "rust");
}

#[test]
fn test_retarget() {
    let format = record_format();
    let mut buf = vec![];
    format.write(&sample_record(), &mut buf).unwrap();
    let mut second = sample_record();
    second[0] = Value::Int(100);
    second[3] = Value::Bool(true);
    let base = buf.len() as u64;
    format.write(&second, &mut buf).unwrap();

    let file = scratch_file("lazy-retarget", &buf);
    let cache = Cache::new(8).unwrap();

    let mut lazy = Lazy::new(Arc::clone(&file), 0, &format).unwrap();
    assert_eq!(lazy.get_int(0, &cache).unwrap(), 99);
    assert_eq!(lazy.to_fpos(), 0);

    lazy.retarget(Arc::clone(&file), base);
    assert_eq!(lazy.to_fpos(), base);
    assert_eq!(lazy.get_int(0, &cache).unwrap(), 100);
    assert_eq!(lazy.get_bool(3, &cache).unwrap(), true);
    assert_eq!(lazy.offset_after(&cache).unwrap(), buf.len() as u64);
}

// csv row -> compressed record -> lazy read -> csv row, byte for byte.
#[test]
fn test_csv_round_trip() {
    use crate::util::Kind;

    let csv_format = Format::new(
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
    .unwrap();
    // same row, all fields binary, with an explicit login length.
    let bin_format = Format::new(
        vec![
            FieldType::BinInt,
            FieldType::BinInt,
            FieldType::Str,
            FieldType::BinKind,
            FieldType::BinDateTime,
            FieldType::BinInt,
            FieldType::BinIntList,
            FieldType::BinInt,
            FieldType::BinIntList,
            FieldType::BinInt,
            FieldType::BinInt,
        ],
        vec![
            LenPair { list: 2, length: Some(1) },
            LenPair { list: 6, length: Some(5) },
            LenPair { list: 8, length: Some(7) },
        ],
        None,
    )
    .unwrap();

    let line = b"1234;alice;User;2015-06-01 00:00:00;1;[2];1;[2];3;4";
    let rec = csv_format.read(line).unwrap();

    let bin_rec = vec![
        rec[0].clone(),
        Value::Int(rec[1].as_str().unwrap().len() as i32),
        rec[1].clone(),
        rec[2].clone(),
        rec[3].clone(),
        rec[4].clone(),
        rec[5].clone(),
        rec[6].clone(),
        rec[7].clone(),
        rec[8].clone(),
        rec[9].clone(),
    ];
    let mut buf = vec![];
    bin_format.write(&bin_rec, &mut buf).unwrap();

    let file = scratch_file("lazy-roundtrip", &buf);
    let cache = Cache::new(8).unwrap();
    let mut lazy = Lazy::new(Arc::clone(&file), 0, &bin_format).unwrap();

    let mut back = csv_format.new_record();
    for (csv_member, bin_member) in
        [(0, 0), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7), (7, 8), (8, 9), (9, 10)].iter()
    {
        back[*csv_member] = lazy.get(*bin_member, &cache).unwrap().clone();
    }
    assert_eq!(back[2].as_kind().unwrap(), Kind::User);

    let mut out = vec![];
    csv_format.write(&back, &mut out).unwrap();
    assert_eq!(out, line.to_vec());
}
