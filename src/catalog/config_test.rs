use super::*;

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.dir, ffi::OsString::from("saida"));
    assert_eq!(config.users_csv, ffi::OsString::from("entrada/users-g3.csv"));
    assert_eq!(config.commits_csv, ffi::OsString::from("entrada/commits-g3.csv"));
    assert_eq!(config.repos_csv, ffi::OsString::from("entrada/repos-g3.csv"));
    assert_eq!(config.cache_pages, CACHE_PAGES);
    assert_eq!(config.run_entries, indexer::RUN_ENTRIES);
    assert_eq!(config.workers, 1);
    assert!(config.validate);
}

#[test]
fn test_builders() {
    let mut config = Config::new(ffi::OsStr::new("out"));
    config
        .set_inputs(
            ffi::OsStr::new("u.csv"),
            ffi::OsStr::new("c.csv"),
            ffi::OsStr::new("r.csv"),
        )
        .set_cache_pages(64)
        .set_run_entries(16)
        .set_workers(4)
        .set_validate(false);

    assert_eq!(config.dir, ffi::OsString::from("out"));
    assert_eq!(config.users_csv, ffi::OsString::from("u.csv"));
    assert_eq!(config.cache_pages, 64);
    assert_eq!(config.run_entries, 16);
    assert_eq!(config.workers, 4);
    assert!(!config.validate);
}

#[test]
fn test_from_toml() {
    let loc = std::env::temp_dir().join(format!("gitcat-config-{}.toml", std::process::id()));
    std::fs::write(
        &loc,
        "dir = 'elsewhere'\ncache_pages = 128\nworkers = 2\n",
    )
    .unwrap();

    let config = Config::from_toml(loc.as_os_str()).unwrap();
    assert_eq!(config.dir, ffi::OsString::from("elsewhere"));
    assert_eq!(config.cache_pages, 128);
    assert_eq!(config.workers, 2);
    // unmentioned fields keep their defaults.
    assert!(config.validate);
    assert_eq!(config.run_entries, indexer::RUN_ENTRIES);

    std::fs::remove_file(&loc).ok();
}
