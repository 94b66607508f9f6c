use super::*;

#[test]
fn test_compress() {
    let line = b"101;1;alice/one;mit;True;First repo;C;main;2018-01-01 00:00:00;2020-01-01 00:00:00;0;0;0;10";
    let rec = csv_format().read(line).unwrap();

    let last = Date::new(2020, 6, 1, 12, 0, 0);
    let comp = compress(&rec, last).unwrap();
    assert_eq!(comp[CR_ID].as_int().unwrap(), 101);
    assert_eq!(comp[CR_OWNER_ID].as_int().unwrap(), 1);
    assert_eq!(comp[CR_LAST_COMMIT_AT].as_date().unwrap(), last);
    // the language is lower-cased at compression time.
    assert_eq!(comp[CR_LANGUAGE_LEN].as_int().unwrap(), 1);
    assert_eq!(comp[CR_LANGUAGE].as_str().unwrap(), "c");
    assert_eq!(comp[CR_DESCRIPTION_LEN].as_int().unwrap(), 10);
    assert_eq!(comp[CR_DESCRIPTION].as_str().unwrap(), "First repo");

    let mut buf = vec![];
    compressed_format().write(&comp, &mut buf).unwrap();
    assert_eq!(compressed_format().read(&buf).unwrap(), comp);
}

#[test]
fn test_compress_null_description() {
    let line = b"102;2;bob/two;mit;False;;Rust;main;2018-01-01 00:00:00;2022-01-01 00:00:00;1;2;3;20";
    let rec = csv_format().read(line).unwrap();

    let comp = compress(&rec, Date::new(2022, 1, 1, 0, 0, 0)).unwrap();
    assert_eq!(comp[CR_DESCRIPTION_LEN].as_int().unwrap(), 0);
    assert_eq!(comp[CR_DESCRIPTION], Value::Nil);
    assert_eq!(comp[CR_LANGUAGE].as_str().unwrap(), "rust");
}

#[test]
fn test_csv_rejects() {
    // empty language is not a valid row.
    let line = b"101;1;alice/one;mit;True;desc;;main;2018-01-01 00:00:00;2020-01-01 00:00:00;0;0;0;10";
    assert!(csv_format().read(line).is_err());
    // booleans are capitalised.
    let line = b"101;1;alice/one;mit;true;desc;C;main;2018-01-01 00:00:00;2020-01-01 00:00:00;0;0;0;10";
    assert!(csv_format().read(line).is_err());
}
