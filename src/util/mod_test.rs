use super::*;

use std::io::Write;

#[test]
fn test_check_int() {
    assert!(check_int(b"0"));
    assert!(check_int(b"1234"));
    assert!(!check_int(b""));
    assert!(!check_int(b"12a4"));
    assert!(!check_int(b"-1"));
    assert!(!check_int(b" 1"));
}

#[test]
fn test_parse_int() {
    assert_eq!(parse_int(b"0").unwrap(), 0);
    assert_eq!(parse_int(b"2147483647").unwrap(), i32::MAX);
    assert!(parse_int(b"2147483648").is_err());
    assert!(parse_int(b"x").is_err());
    assert!(parse_int(b"").is_err());
}

#[test]
fn test_parse_bool() {
    assert_eq!(parse_bool(b"True"), Some(true));
    assert_eq!(parse_bool(b"False"), Some(false));
    assert_eq!(parse_bool(b"true"), None);
    assert_eq!(parse_bool(b""), None);
}

#[test]
fn test_kind() {
    assert_eq!(Kind::from_text(b"User"), Some(Kind::User));
    assert_eq!(Kind::from_text(b"Organization"), Some(Kind::Organization));
    assert_eq!(Kind::from_text(b"Bot"), Some(Kind::Bot));
    assert_eq!(Kind::from_text(b"user"), None);

    for kind in [Kind::User, Kind::Organization, Kind::Bot].iter() {
        assert_eq!(Kind::from_tag(*kind as u8).unwrap(), *kind);
        assert_eq!(Kind::from_text(kind.to_string().as_bytes()), Some(*kind));
    }
    assert!(Kind::from_tag(3).is_err());
}

#[test]
fn test_check_id_list() {
    assert_eq!(check_id_list(b"[]"), Some(0));
    assert_eq!(check_id_list(b"[7]"), Some(1));
    assert_eq!(check_id_list(b"[1, 2, 3]"), Some(3));
    assert_eq!(check_id_list(b"[1,2]"), None); // missing space
    assert_eq!(check_id_list(b"[1, ]"), None);
    assert_eq!(check_id_list(b"[a]"), None);
    assert_eq!(check_id_list(b"1, 2"), None);
    assert_eq!(check_id_list(b"["), None);
    assert_eq!(check_id_list(b""), None);
}

#[test]
fn test_parse_id_list() {
    assert_eq!(parse_id_list(b"[]").unwrap(), Vec::<i32>::new());
    assert_eq!(parse_id_list(b"[1, 2, 3]").unwrap(), vec![1, 2, 3]);
    assert!(parse_id_list(b"[1,2]").is_err());

    assert_eq!(unsafe_parse_id_list(b"[]"), Vec::<i32>::new());
    assert_eq!(unsafe_parse_id_list(b"[1, 2, 3]"), vec![1, 2, 3]);
}

#[test]
fn test_contained_in_sorted() {
    let ids = vec![1, 3, 5, 7, 11];
    assert!(contained_in_sorted(&ids, 1));
    assert!(contained_in_sorted(&ids, 7));
    assert!(contained_in_sorted(&ids, 11));
    assert!(!contained_in_sorted(&ids, 2));
    assert!(!contained_in_sorted(&ids, 12));
    assert!(!contained_in_sorted(&[], 1));
}

#[test]
fn test_big_endian() {
    assert_eq!(be_i32(&0x01020304_i32.to_be_bytes()).unwrap(), 0x01020304);
    assert_eq!(be_i32(&(-7_i32).to_be_bytes()).unwrap(), -7);
    assert!(be_i32(&[0, 1]).is_err());

    assert_eq!(be_u64(&0xA1B2_u64.to_be_bytes()).unwrap(), 0xA1B2);
    assert!(be_u64(&[0; 7]).is_err());

    let val = 2.25_f64;
    assert_eq!(be_f64(&val.to_bits().to_be_bytes()).unwrap(), val);
}

#[test]
fn test_line_reader() {
    let loc = std::env::temp_dir().join(format!("gitcat-lines-{}", std::process::id()));
    {
        let mut fd = std::fs::File::create(&loc).unwrap();
        let long = "x".repeat(10_000);
        write!(fd, "a\r\nbb\n\n{}\nlast", long).unwrap();
    }

    let mut rd = LineReader::new(std::fs::File::open(&loc).unwrap());
    assert_eq!(rd.next_line().unwrap(), Some("a"));
    assert_eq!(rd.next_line().unwrap(), Some("bb"));
    assert_eq!(rd.next_line().unwrap(), Some(""));
    assert_eq!(rd.next_line().unwrap().map(|s| s.len()), Some(10_000));
    assert_eq!(rd.next_line().unwrap(), Some("last"));
    assert_eq!(rd.next_line().unwrap(), None);

    std::fs::remove_file(&loc).ok();
}
