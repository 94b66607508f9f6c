use rand::{prelude::random, rngs::SmallRng, Rng, SeedableRng};

use super::*;

use crate::cache::Cache;

fn scratch_dir(name: &str) -> ffi::OsString {
    let loc = env::temp_dir().join(format!("gitcat-{}-{}", name, std::process::id()));
    fs::remove_dir_all(&loc).ok();
    fs::create_dir_all(&loc).unwrap();
    loc.into_os_string()
}

fn values_file(dir: &ffi::OsStr, data: &[u8]) -> Arc<fs::File> {
    let loc: std::path::PathBuf = [dir.to_os_string(), "values.dat".into()].iter().collect();
    fs::write(&loc, data).unwrap();
    Arc::new(util::files::open_file_r(loc.as_os_str()).unwrap())
}

#[test]
fn test_sort_and_group() {
    let dir = scratch_dir("indexer-sort");
    let values = values_file(&dir, b"");
    let cache = Cache::new(32).unwrap();

    let mut ix = Indexer::create(None, values, KeyCmp::Direct).unwrap();
    for (key, value) in [(3, 30), (1, 10), (4, 40), (1, 11), (2, 20)].iter() {
        ix.insert(*key, *value).unwrap();
    }
    assert_eq!(ix.len(), 5);

    ix.sort(&cache).unwrap();
    let keys: Vec<u64> = (0..5).map(|i| ix.key_at(i, &cache).unwrap()).collect();
    assert_eq!(keys, vec![1, 1, 2, 3, 4]);

    ix.group(None, false, &cache).unwrap();
    assert_eq!(ix.len(), 4);
    let keys: Vec<u64> = (0..4).map(|i| ix.key_at(i, &cache).unwrap()).collect();
    assert_eq!(keys, vec![1, 2, 3, 4]);

    let sizes: Vec<usize> = (0..4)
        .map(|i| {
            let block = ix.value_at(i, &cache).unwrap();
            ix.group_size(block, &cache).unwrap()
        })
        .collect();
    assert_eq!(sizes, vec![2, 1, 1, 1]);

    let block = ix.value_at(0, &cache).unwrap();
    assert_eq!(ix.group_elem(block, 0, &cache).unwrap(), 10);
    assert_eq!(ix.group_elem(block, 1, &cache).unwrap(), 11);
    let block = ix.value_at(1, &cache).unwrap();
    assert_eq!(ix.group_elem(block, 0, &cache).unwrap(), 20);
    let block = ix.value_at(3, &cache).unwrap();
    assert_eq!(ix.group_elem(block, 0, &cache).unwrap(), 40);
}

#[test]
fn test_group_dedup() {
    let dir = scratch_dir("indexer-dedup");
    let values = values_file(&dir, b"");
    let cache = Cache::new(32).unwrap();

    let mut ix = Indexer::create(None, values, KeyCmp::Direct).unwrap();
    for (key, value) in [(7, 3), (7, 3), (7, 5)].iter() {
        ix.insert(*key, *value).unwrap();
    }
    ix.sort(&cache).unwrap();
    ix.group(None, true, &cache).unwrap();

    assert_eq!(ix.len(), 1);
    assert_eq!(ix.key_at(0, &cache).unwrap(), 7);
    let block = ix.value_at(0, &cache).unwrap();
    assert_eq!(ix.group_size(block, &cache).unwrap(), 2);
    assert_eq!(ix.group_elem(block, 0, &cache).unwrap(), 3);
    assert_eq!(ix.group_elem(block, 1, &cache).unwrap(), 5);
}

#[test]
fn test_group_requires_sorted() {
    let dir = scratch_dir("indexer-unsorted");
    let values = values_file(&dir, b"");
    let cache = Cache::new(32).unwrap();

    let mut ix = Indexer::create(None, values, KeyCmp::Direct).unwrap();
    ix.insert(2, 1).unwrap();
    ix.insert(1, 1).unwrap();
    match ix.group(None, false, &cache) {
        Err(Error::UnsortedIndex(_, _)) => (),
        res => panic!("unexpected {:?}", res),
    }
}

#[test]
fn test_exact_and_lower_bound() {
    let dir = scratch_dir("indexer-search");
    let values = values_file(&dir, b"");
    let cache = Cache::new(32).unwrap();

    let mut ix = Indexer::create(None, values, KeyCmp::Direct).unwrap();
    for (key, value) in [(1, 0), (1, 1), (2, 2), (3, 3), (4, 4)].iter() {
        ix.insert(*key, *value).unwrap();
    }
    ix.sort(&cache).unwrap();

    assert_eq!(ix.exact(&Probe::Pos(1), &cache).unwrap(), Some(0));
    assert_eq!(ix.exact(&Probe::Pos(2), &cache).unwrap(), Some(2));
    assert_eq!(ix.exact(&Probe::Pos(4), &cache).unwrap(), Some(4));
    assert_eq!(ix.exact(&Probe::Pos(0), &cache).unwrap(), None);
    assert_eq!(ix.exact(&Probe::Pos(5), &cache).unwrap(), None);

    assert_eq!(ix.lower_bound(&Probe::Pos(0), &cache).unwrap(), 0);
    assert_eq!(ix.lower_bound(&Probe::Pos(1), &cache).unwrap(), 0);
    assert_eq!(ix.lower_bound(&Probe::Pos(2), &cache).unwrap(), 2);
    assert_eq!(ix.lower_bound(&Probe::Pos(4), &cache).unwrap(), 4);
    assert_eq!(ix.lower_bound(&Probe::Pos(5), &cache).unwrap(), 5);

    assert_eq!(ix.find(&Probe::Pos(3), &cache).unwrap(), Some(3));
    assert_eq!(ix.find(&Probe::Pos(9), &cache).unwrap(), None);
}

#[test]
fn test_external_merge_sort() {
    let seed: u64 = random();
    println!("test_external_merge_sort seed:{}", seed);
    let mut rng = SmallRng::seed_from_u64(seed);

    let dir = scratch_dir("indexer-merge");
    let values = values_file(&dir, b"");
    let cache = Cache::new(64).unwrap();

    let loc: std::path::PathBuf = [dir.clone(), "big.indx".into()].iter().collect();
    let mut ix = Indexer::create(Some(loc.as_os_str()), values, KeyCmp::Direct).unwrap();
    ix.set_run_entries(16); // force a real k-way merge

    let mut keys: Vec<u64> = (0..1000).map(|_| rng.gen::<u32>() as u64).collect();
    for (i, key) in keys.iter().enumerate() {
        ix.insert(*key, i as u64).unwrap();
    }
    ix.sort(&cache).unwrap();

    keys.sort_unstable();
    let sorted: Vec<u64> = (0..1000).map(|i| ix.key_at(i, &cache).unwrap()).collect();
    assert_eq!(sorted, keys, "seed {}", seed);
}

#[test]
fn test_persisted_open() {
    let dir = scratch_dir("indexer-open");
    let values = values_file(&dir, b"");
    let cache = Cache::new(32).unwrap();

    let loc: std::path::PathBuf = [dir.clone(), "keep.indx".into()].iter().collect();
    {
        let mut ix =
            Indexer::create(Some(loc.as_os_str()), Arc::clone(&values), KeyCmp::Direct).unwrap();
        for key in [5_u64, 3, 9].iter() {
            ix.insert(*key, *key * 10).unwrap();
        }
        ix.sort(&cache).unwrap();
    }
    cache.refresh_all().unwrap();

    let ix = Indexer::open(loc.as_os_str(), values, KeyCmp::Direct).unwrap();
    assert_eq!(ix.len(), 3);
    assert_eq!(ix.key_at(0, &cache).unwrap(), 3);
    assert_eq!(ix.find(&Probe::Pos(9), &cache).unwrap(), Some(90));
}

#[test]
fn test_string_keys() {
    let dir = scratch_dir("indexer-strings");

    // length prefixed strings, the shape of records' string members.
    let mut data = vec![];
    let mut offsets = vec![];
    for s in ["rust", "c", "java", "rust"].iter() {
        offsets.push(data.len() as u64);
        data.extend_from_slice(&(s.len() as i32).to_be_bytes());
        data.extend_from_slice(s.as_bytes());
    }
    let values = values_file(&dir, &data);
    let cache = Cache::new(32).unwrap();

    let mut ix = Indexer::create(
        None,
        Arc::clone(&values),
        KeyCmp::InFile(Arc::clone(&values)),
    )
    .unwrap();
    for (i, offset) in offsets.iter().enumerate() {
        ix.insert(*offset, i as u64).unwrap();
    }
    ix.sort(&cache).unwrap();
    ix.group(None, false, &cache).unwrap();
    assert_eq!(ix.len(), 3); // rust appears twice

    let block = ix
        .find(&Probe::Bytes(b"rust"), &cache)
        .unwrap()
        .expect("rust is indexed");
    assert_eq!(ix.group_size(block, &cache).unwrap(), 2);
    assert_eq!(ix.group_elem(block, 0, &cache).unwrap(), 0);
    assert_eq!(ix.group_elem(block, 1, &cache).unwrap(), 3);

    assert!(ix.find(&Probe::Bytes(b"go"), &cache).unwrap().is_none());
}
