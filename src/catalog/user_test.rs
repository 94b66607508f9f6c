use super::*;

#[test]
fn test_friends_of() {
    assert_eq!(friends_of(&[], &[1, 2]), Vec::<i32>::new());
    assert_eq!(friends_of(&[1, 2], &[]), Vec::<i32>::new());
    assert_eq!(friends_of(&[2], &[2]), vec![2]);
    assert_eq!(friends_of(&[5, 3, 9], &[9, 1, 5]), vec![5, 9]);
    // output is sorted even when the inputs are not.
    assert_eq!(friends_of(&[9, 5, 3, 1], &[1, 9]), vec![1, 9]);
    assert_eq!(friends_of(&[4], &[7]), Vec::<i32>::new());
}

#[test]
fn test_compress() {
    let line = b"1234;alice;User;2015-06-01 00:00:00;2;[2, 3];1;[2];3;4";
    let rec = csv_format().read(line).unwrap();
    let friends = friends_of(rec[U_FOLLOWER_LIST].as_ids().unwrap(), rec[U_FOLLOWING_LIST].as_ids().unwrap());
    assert_eq!(friends, vec![2]);

    let comp = compress(&rec, friends).unwrap();
    assert_eq!(comp[CU_ID].as_int().unwrap(), 1234);
    assert_eq!(comp[CU_LOGIN_LEN].as_int().unwrap(), 5);
    assert_eq!(comp[CU_KIND].as_kind().unwrap(), util::Kind::User);
    assert_eq!(comp[CU_FRIENDS_LEN].as_int().unwrap(), 1);
    assert_eq!(comp[CU_FRIENDS].as_ids().unwrap(), &[2]);
    assert_eq!(comp[CU_LOGIN].as_str().unwrap(), "alice");

    // the compressed record round-trips through its binary format.
    let mut buf = vec![];
    compressed_format().write(&comp, &mut buf).unwrap();
    assert_eq!(buf.len(), 4 + 4 + 1 + 4 + 4 + 5);
    assert_eq!(compressed_format().read(&buf).unwrap(), comp);
}
