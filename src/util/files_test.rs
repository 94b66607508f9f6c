use super::*;

use std::io::Write;

fn scratch(name: &str) -> ffi::OsString {
    let loc = std::env::temp_dir().join(format!("gitcat-{}-{}", name, std::process::id()));
    loc.into_os_string()
}

#[test]
fn test_create_file_rw() {
    let loc = {
        let mut loc = scratch("files-create");
        loc.push("/deep/nested/file.dat");
        loc
    };

    let mut fd = create_file_rw(&loc).unwrap();
    fd.write_all(b"hello").unwrap();
    assert_eq!(fs::read(path::Path::new(&loc)).unwrap(), b"hello");

    // recreating truncates.
    std::mem::drop(fd);
    let fd = create_file_rw(&loc).unwrap();
    assert_eq!(fd.metadata().unwrap().len(), 0);

    fs::remove_file(path::Path::new(&loc)).ok();
}

#[test]
fn test_open_file_r() {
    let loc = scratch("files-missing");
    assert!(open_file_r(&loc).is_err());

    fs::write(path::Path::new(&loc), b"x").unwrap();
    assert!(open_file_r(&loc).is_ok());
    assert!(open_file_rw(&loc).is_ok());
    fs::remove_file(path::Path::new(&loc)).ok();
}

#[test]
fn test_load_toml() {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Conf {
        name: String,
        count: usize,
    }

    let loc = scratch("files-toml");
    fs::write(path::Path::new(&loc), "name = 'gitcat'\ncount = 42\n").unwrap();

    let conf: Conf = load_toml(&loc).unwrap();
    assert_eq!(conf.name, "gitcat");
    assert_eq!(conf.count, 42);

    fs::remove_file(path::Path::new(&loc)).ok();
}
