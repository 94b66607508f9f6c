//! Module `indexer` implement the on-disk ordered map.
//!
//! An index file is a flat array of fixed-size entries, 8 byte key
//! followed by 8 byte value, both big-endian. Keys either embed their
//! value directly (ids, packed dates) or locate a length-prefixed
//! byte string inside a borrowed key file. Construction is
//! append-only; a two-pass external merge [sort][Indexer::sort] orders
//! the entries, and an optional [group][Indexer::group] pass rewrites
//! the index into an inverted map whose values are offsets into a
//! companion blocks file, `[len][value x len]` per distinct key.

use log::debug;

use std::{
    cmp,
    convert::TryFrom,
    env, ffi, fs,
    io::{self, Read, Seek},
    path,
    sync::{
        atomic::{AtomicUsize, Ordering::SeqCst},
        Arc,
    },
};

use crate::{
    cache::Cache, err_at, lazy::Lazy, read_file, util, util::files, write_file, Error,
    Result,
};

/// Width of one index entry: 8 byte key plus 8 byte value.
pub const ENTRY_SIZE: usize = 16;

/// Default number of entries sorted in memory per run, 8 Mi entries
/// or 128 MiB of pair data.
pub const RUN_ENTRIES: usize = 8 * 1024 * 1024;

// pending appends are spilled to the file once the buffer grows this big.
const WBUF_LIMIT: usize = 64 * 1024;

/// How two keys of an index compare.
pub enum KeyCmp {
    /// Keys are plain u64 scalars (ids, packed dates).
    Direct,
    /// Keys are offsets of `(len: i32 BE, bytes)` strings inside the
    /// given file; ordered by length, then bytes.
    InFile(Arc<fs::File>),
}

/// A search key, as handed in by a caller. Scalar probes address
/// [KeyCmp::Direct] indexes, byte probes address [KeyCmp::InFile]
/// indexes.
pub enum Probe<'a> {
    Pos(u64),
    Bytes(&'a [u8]),
}

impl KeyCmp {
    // compare two stored keys.
    fn compare(&self, a: u64, b: u64, cache: &Cache) -> Result<cmp::Ordering> {
        match self {
            KeyCmp::Direct => Ok(a.cmp(&b)),
            KeyCmp::InFile(file) => {
                let l1 = cache.get_int(file, a)?;
                let l2 = cache.get_int(file, b)?;
                if l1 != l2 {
                    return Ok(l1.cmp(&l2));
                }

                // walk both strings in cache-friendly chunks.
                let mut buf1 = [0_u8; 20];
                let mut buf2 = [0_u8; 20];
                let (mut p1, mut p2) = (a + 4, b + 4);
                let mut remaining = usize::try_from(l1).unwrap_or(0);
                while remaining > 0 {
                    let n = cmp::min(buf1.len(), remaining);
                    cache.get_str(file, p1, &mut buf1[..n])?;
                    cache.get_str(file, p2, &mut buf2[..n])?;
                    match buf1[..n].cmp(&buf2[..n]) {
                        cmp::Ordering::Equal => (),
                        ord => return Ok(ord),
                    }
                    p1 += n as u64;
                    p2 += n as u64;
                    remaining -= n;
                }
                Ok(cmp::Ordering::Equal)
            }
        }
    }

    // compare a probe against a stored key.
    fn compare_probe(&self, probe: &Probe, stored: u64, cache: &Cache) -> Result<cmp::Ordering> {
        match (self, probe) {
            (KeyCmp::Direct, Probe::Pos(p)) => Ok(p.cmp(&stored)),
            (KeyCmp::InFile(_), Probe::Pos(p)) => self.compare(*p, stored, cache),
            (KeyCmp::InFile(file), Probe::Bytes(s)) => {
                let l2 = cache.get_int(file, stored)?;
                let l1 = i32::try_from(s.len()).unwrap_or(i32::MAX);
                if l1 != l2 {
                    return Ok(l1.cmp(&l2));
                }

                let mut buf = [0_u8; 20];
                let mut fpos = stored + 4;
                let mut off = 0;
                while off < s.len() {
                    let n = cmp::min(buf.len(), s.len() - off);
                    cache.get_str(file, fpos, &mut buf[..n])?;
                    match s[off..off + n].cmp(&buf[..n]) {
                        cmp::Ordering::Equal => (),
                        ord => return Ok(ord),
                    }
                    fpos += n as u64;
                    off += n;
                }
                Ok(cmp::Ordering::Equal)
            }
            (KeyCmp::Direct, Probe::Bytes(_)) => {
                err_at!(Fatal, msg: "byte probe on a direct index")
            }
        }
    }
}

/// On-disk ordered map from 8-byte keys to 8-byte values, optionally
/// grouped into an inverted index.
///
/// The indexer owns its index file (and blocks file, once grouped)
/// and borrows the key and value files it refers to; those stay open
/// for as long as any indexer or lazy needs them.
pub struct Indexer {
    loc: ffi::OsString,
    index: Arc<fs::File>,
    elem_no: usize,
    cmp: KeyCmp,
    values: Arc<fs::File>,
    blocks: Option<Arc<fs::File>>,

    sorted: bool,
    stale: bool, // index bytes changed behind the cache
    run_entries: usize,
    wbuf: Vec<u8>,
    wpos: u64,
    scratch: Vec<ffi::OsString>,
}

impl Drop for Indexer {
    fn drop(&mut self) {
        self.spill().ok();
        for loc in self.scratch.drain(..) {
            fs::remove_file(&loc).ok();
        }
    }
}

impl Indexer {
    /// Create a new, empty index. With `loc` as None the index lives
    /// in an anonymous scratch file removed on drop.
    pub fn create(
        loc: Option<&ffi::OsStr>,
        values: Arc<fs::File>,
        cmp: KeyCmp,
    ) -> Result<Indexer> {
        let mut scratch = vec![];
        let loc = match loc {
            Some(loc) => loc.to_os_string(),
            None => {
                let loc = scratch_loc("indx");
                scratch.push(loc.clone());
                loc
            }
        };
        let index = Arc::new(files::create_file_rw(&loc)?);

        Ok(Indexer {
            loc,
            index,
            elem_no: 0,
            cmp,
            values,
            blocks: None,

            sorted: false,
            stale: false,
            run_entries: RUN_ENTRIES,
            wbuf: vec![],
            wpos: 0,
            scratch,
        })
    }

    /// Open a persisted index read/write. Never truncates.
    pub fn open(loc: &ffi::OsStr, values: Arc<fs::File>, cmp: KeyCmp) -> Result<Indexer> {
        let index = files::open_file_rw(loc)?;
        let n = err_at!(IOError, index.metadata())?.len();

        Ok(Indexer {
            loc: loc.to_os_string(),
            index: Arc::new(index),
            elem_no: (n as usize) / ENTRY_SIZE,
            cmp,
            values,
            blocks: None,

            sorted: true,
            stale: false,
            run_entries: RUN_ENTRIES,
            wbuf: vec![],
            wpos: n,
            scratch: vec![],
        })
    }

    /// Open a persisted grouped index along with its blocks file.
    pub fn open_grouped(
        loc: &ffi::OsStr,
        blocks_loc: &ffi::OsStr,
        values: Arc<fs::File>,
        cmp: KeyCmp,
    ) -> Result<Indexer> {
        let mut val = Indexer::open(loc, values, cmp)?;
        val.blocks = Some(Arc::new(files::open_file_r(blocks_loc)?));
        Ok(val)
    }

    /// Configure the in-memory run size of [Indexer::sort].
    pub fn set_run_entries(&mut self, run_entries: usize) -> &mut Self {
        self.run_entries = run_entries;
        self
    }

    /// Number of entries, or number of groups once grouped.
    pub fn len(&self) -> usize {
        self.elem_no
    }

    pub fn is_empty(&self) -> bool {
        self.elem_no == 0
    }

    pub fn to_location(&self) -> ffi::OsString {
        self.loc.clone()
    }

    /// The file the index values point into.
    pub fn to_values_file(&self) -> Arc<fs::File> {
        Arc::clone(&self.values)
    }

    /// Append a `(key, value)` entry.
    pub fn insert(&mut self, key: u64, value: u64) -> Result<()> {
        self.wbuf.extend_from_slice(&key.to_be_bytes());
        self.wbuf.extend_from_slice(&value.to_be_bytes());
        self.elem_no += 1;
        self.sorted = false;
        self.stale = true;
        if self.wbuf.len() >= WBUF_LIMIT {
            self.spill()?;
        }
        Ok(())
    }

    fn spill(&mut self) -> Result<()> {
        if !self.wbuf.is_empty() {
            let fd = &*self.index;
            write_file!(fd, self.wpos, &self.wbuf, "indexer append")?;
            self.wpos += self.wbuf.len() as u64;
            self.wbuf.clear();
        }
        Ok(())
    }

    /// Make pending appends visible to readers going through `cache`.
    pub fn flush(&mut self, cache: &Cache) -> Result<()> {
        self.spill()?;
        if self.stale {
            cache.refresh_file(&self.index)?;
            self.stale = false;
        }
        Ok(())
    }

    /// Order the entries by key: partition into runs of at most
    /// `run_entries`, sort each in memory, then k-way merge the runs
    /// back into the index file through a min-heap.
    pub fn sort(&mut self, cache: &Cache) -> Result<()> {
        self.flush(cache)?;
        if self.elem_no <= 1 {
            self.sorted = true;
            return Ok(());
        }

        let k = (self.elem_no + self.run_entries - 1) / self.run_entries;
        debug!(target: "indexer", "sorting {:?}, {} entries in {} runs", self.loc, self.elem_no, k);

        let mut run_locs = vec![];
        let mut start = 0;
        for j in 0..k {
            let size = self.elem_no / k + ((self.elem_no % k > j) as usize);
            let mut entries = {
                let fd = &*self.index;
                let fpos = (start * ENTRY_SIZE) as u64;
                let data = read_file!(fd, fpos, size * ENTRY_SIZE, "read sort run")?;
                to_entries(&data)
            };

            let mut fail: Option<Error> = None;
            entries.sort_by(|a, b| match self.cmp.compare(a.0, b.0, cache) {
                Ok(ord) => ord,
                Err(err) => {
                    fail.get_or_insert(err);
                    cmp::Ordering::Equal
                }
            });
            if let Some(err) = fail {
                return Err(err);
            }

            let data = from_entries(&entries);
            if k == 1 {
                // single run, no merge pass needed.
                let fd = &*self.index;
                write_file!(fd, 0, &data, "write sorted run")?;
            } else {
                let loc = {
                    let mut loc = self.loc.clone();
                    loc.push(format!(".run{}", j));
                    loc
                };
                let fd = files::create_file_rw(&loc)?;
                write_file!(fd, 0, &data, "spill sort run")?;
                run_locs.push(loc);
            }
            start += size;
        }

        if k > 1 {
            let res = self.merge_runs(&run_locs, cache);
            for loc in run_locs.iter() {
                fs::remove_file(loc).ok();
            }
            res?;
        }

        self.sorted = true;
        self.stale = true;
        self.flush(cache)
    }

    fn merge_runs(&mut self, run_locs: &[ffi::OsString], cache: &Cache) -> Result<()> {
        let mut runs = vec![];
        for loc in run_locs.iter() {
            runs.push(io::BufReader::new(files::open_file_r(loc)?));
        }

        let mut heads = vec![(0_u64, 0_u64); runs.len()];
        let mut heap = Vec::with_capacity(runs.len());
        for (j, run) in runs.iter_mut().enumerate() {
            if next_entry(run, &mut heads[j])? {
                heap_push(&mut heap, &heads, &self.cmp, cache, j)?;
            }
        }

        let mut out = Vec::with_capacity(WBUF_LIMIT + ENTRY_SIZE);
        let mut wpos = 0;
        while !heap.is_empty() {
            let j = heap_pop(&mut heap, &heads, &self.cmp, cache)?;
            let (key, value) = heads[j];
            out.extend_from_slice(&key.to_be_bytes());
            out.extend_from_slice(&value.to_be_bytes());
            if out.len() >= WBUF_LIMIT {
                let fd = &*self.index;
                write_file!(fd, wpos, &out, "merge sorted runs")?;
                wpos += out.len() as u64;
                out.clear();
            }
            if next_entry(&mut runs[j], &mut heads[j])? {
                heap_push(&mut heap, &heads, &self.cmp, cache, j)?;
            }
        }
        if !out.is_empty() {
            let fd = &*self.index;
            write_file!(fd, wpos, &out, "merge sorted runs")?;
        }
        Ok(())
    }

    /// Rewrite the sorted index as an inverted map: one entry per
    /// distinct key whose value is the offset of a `[len][value x
    /// len]` block inside the new blocks file at `blocks_loc`. With
    /// `dedup`, equal values inside a block are collapsed.
    pub fn group(
        &mut self,
        blocks_loc: Option<&ffi::OsStr>,
        dedup: bool,
        cache: &Cache,
    ) -> Result<()> {
        if !self.sorted {
            return err_at!(UnsortedIndex, msg: "group needs a sorted index {:?}", self.loc);
        }
        self.flush(cache)?;
        debug!(target: "indexer", "grouping {:?}, {} entries", self.loc, self.elem_no);

        let blocks_loc = match blocks_loc {
            Some(loc) => loc.to_os_string(),
            None => {
                let loc = scratch_loc("blocks");
                self.scratch.push(loc.clone());
                loc
            }
        };
        let dest_loc = {
            let mut loc = self.loc.clone();
            loc.push(".tmp");
            loc
        };

        let mut src = io::BufReader::new(err_at!(IOError, self.index.try_clone())?);
        err_at!(IOError, src.seek(io::SeekFrom::Start(0)))?;
        let mut iw = io::BufWriter::new(files::create_file_rw(&dest_loc)?);
        let mut bw = io::BufWriter::new(files::create_file_rw(&blocks_loc)?);

        let mut groups = 0;
        let mut bpos = 0;
        let mut cur_key: Option<u64> = None;
        let mut vals: Vec<u64> = vec![];

        for _ in 0..self.elem_no {
            let mut entry = (0, 0);
            if !next_entry(&mut src, &mut entry)? {
                return err_at!(Fatal, msg: "index truncated while grouping {:?}", self.loc);
            }
            let (key, value) = entry;

            if let Some(k) = cur_key {
                match self.cmp.compare(key, k, cache)? {
                    cmp::Ordering::Less => {
                        return err_at!(
                            UnsortedIndex, msg: "key order broken in {:?}", self.loc
                        )
                    }
                    cmp::Ordering::Greater => {
                        bpos = write_group(&mut iw, &mut bw, k, &mut vals, dedup, bpos)?;
                        groups += 1;
                        cur_key = Some(key);
                    }
                    cmp::Ordering::Equal => (),
                }
            } else {
                cur_key = Some(key);
            }
            vals.push(value);
        }
        if let Some(k) = cur_key {
            write_group(&mut iw, &mut bw, k, &mut vals, dedup, bpos)?;
            groups += 1;
        }

        // the old index file is going away; drop its pages first.
        cache.refresh_file(&self.index)?;

        let blocks = match bw.into_inner() {
            Ok(fd) => fd,
            Err(err) => return err_at!(IOError, Err(err.into_error())),
        };
        match iw.into_inner() {
            Ok(fd) => std::mem::drop(fd),
            Err(err) => return err_at!(IOError, Err(err.into_error())),
        }
        err_at!(IOError, fs::remove_file(&self.loc))?;
        err_at!(IOError, fs::rename(&dest_loc, &self.loc))?;
        self.index = Arc::new(files::open_file_rw(&self.loc)?);

        // file descriptors get recycled; shed any stale aliases.
        cache.refresh_file(&self.index)?;
        cache.refresh_file(&blocks)?;

        self.blocks = Some(Arc::new(blocks));
        self.elem_no = groups;
        self.wpos = (groups * ENTRY_SIZE) as u64;
        Ok(())
    }

    /// Slot of the first entry whose key equals the probe, if any.
    pub fn exact(&self, probe: &Probe, cache: &Cache) -> Result<Option<usize>> {
        self.check_lookup()?;
        if self.elem_no == 0 {
            return Ok(None);
        }

        let (mut l, mut r) = (0, self.elem_no - 1);
        while l < r {
            let m = (l + r) / 2;
            match self.cmp.compare_probe(probe, self.key_at(m, cache)?, cache)? {
                cmp::Ordering::Less => r = m.saturating_sub(1),
                cmp::Ordering::Greater => l = m + 1,
                cmp::Ordering::Equal => r = m,
            }
        }
        match self.cmp.compare_probe(probe, self.key_at(l, cache)?, cache)? {
            cmp::Ordering::Equal => Ok(Some(l)),
            _ => Ok(None),
        }
    }

    /// Smallest slot whose key is greater than or equal to the probe;
    /// `len()` when every key is smaller.
    pub fn lower_bound(&self, probe: &Probe, cache: &Cache) -> Result<usize> {
        self.check_lookup()?;
        if self.elem_no == 0 {
            return Ok(0);
        }

        let (mut l, mut r) = (0, self.elem_no - 1);
        while l < r {
            let m = (l + r) / 2;
            match self.cmp.compare_probe(probe, self.key_at(m, cache)?, cache)? {
                cmp::Ordering::Less => r = m.saturating_sub(1),
                cmp::Ordering::Greater => l = m + 1,
                cmp::Ordering::Equal => r = m,
            }
        }
        match self.cmp.compare_probe(probe, self.key_at(l, cache)?, cache)? {
            cmp::Ordering::Less | cmp::Ordering::Equal => Ok(l),
            cmp::Ordering::Greater => Ok(l + 1),
        }
    }

    fn check_lookup(&self) -> Result<()> {
        if self.wbuf.is_empty() {
            Ok(())
        } else {
            err_at!(Fatal, msg: "lookup on unflushed index {:?}", self.loc)
        }
    }

    /// Key stored at slot `i`.
    pub fn key_at(&self, i: usize, cache: &Cache) -> Result<u64> {
        self.check_slot(i)?;
        cache.get_pos(&self.index, (i * ENTRY_SIZE) as u64)
    }

    /// Value stored at slot `i`; a block offset once grouped.
    pub fn value_at(&self, i: usize, cache: &Cache) -> Result<u64> {
        self.check_slot(i)?;
        cache.get_pos(&self.index, (i * ENTRY_SIZE + 8) as u64)
    }

    fn check_slot(&self, i: usize) -> Result<()> {
        if i < self.elem_no {
            Ok(())
        } else {
            err_at!(Fatal, msg: "slot {} out of bounds {}", i, self.elem_no)
        }
    }

    /// Rewire `lazy` onto the record the value at slot `i` points to.
    pub fn value_as_lazy(&self, i: usize, cache: &Cache, lazy: &mut Lazy) -> Result<()> {
        let fpos = self.value_at(i, cache)?;
        lazy.retarget(Arc::clone(&self.values), fpos);
        Ok(())
    }

    /// Embedded value mapped by the probe, if the key exists.
    pub fn find(&self, probe: &Probe, cache: &Cache) -> Result<Option<u64>> {
        match self.exact(probe, cache)? {
            Some(i) => Ok(Some(self.value_at(i, cache)?)),
            None => Ok(None),
        }
    }

    /// Rewire `lazy` onto the record mapped by the probe. Returns
    /// false when the key is absent.
    pub fn find_as_lazy(&self, probe: &Probe, cache: &Cache, lazy: &mut Lazy) -> Result<bool> {
        match self.find(probe, cache)? {
            Some(fpos) => {
                lazy.retarget(Arc::clone(&self.values), fpos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of values in the group block at `block`.
    pub fn group_size(&self, block: u64, cache: &Cache) -> Result<usize> {
        let blocks = self.to_blocks()?;
        let n = cache.get_int(&blocks, block)?;
        err_at!(FailConvert, usize::try_from(n), "group size at {}", block)
    }

    /// The `elem`-th value of the group block at `block`.
    pub fn group_elem(&self, block: u64, elem: usize, cache: &Cache) -> Result<u64> {
        let blocks = self.to_blocks()?;
        cache.get_pos(&blocks, block + 4 + (elem as u64) * 8)
    }

    /// Rewire `lazy` onto the record the `elem`-th value of the group
    /// points to.
    pub fn group_elem_as_lazy(
        &self,
        block: u64,
        elem: usize,
        cache: &Cache,
        lazy: &mut Lazy,
    ) -> Result<()> {
        let fpos = self.group_elem(block, elem, cache)?;
        lazy.retarget(Arc::clone(&self.values), fpos);
        Ok(())
    }

    fn to_blocks(&self) -> Result<Arc<fs::File>> {
        match &self.blocks {
            Some(blocks) => Ok(Arc::clone(blocks)),
            None => err_at!(Fatal, msg: "index {:?} is not grouped", self.loc),
        }
    }
}

fn to_entries(data: &[u8]) -> Vec<(u64, u64)> {
    data.chunks_exact(ENTRY_SIZE)
        .map(|chunk| {
            let key = util::be_u64(&chunk[..8]).unwrap();
            let value = util::be_u64(&chunk[8..]).unwrap();
            (key, value)
        })
        .collect()
}

fn from_entries(entries: &[(u64, u64)]) -> Vec<u8> {
    let mut data = Vec::with_capacity(entries.len() * ENTRY_SIZE);
    for (key, value) in entries.iter() {
        data.extend_from_slice(&key.to_be_bytes());
        data.extend_from_slice(&value.to_be_bytes());
    }
    data
}

// read the next entry out of a run; false at end of file.
fn next_entry<R>(run: &mut R, entry: &mut (u64, u64)) -> Result<bool>
where
    R: Read,
{
    let mut buf = [0_u8; ENTRY_SIZE];
    match run.read_exact(&mut buf) {
        Ok(()) => {
            *entry = (util::be_u64(&buf[..8])?, util::be_u64(&buf[8..])?);
            Ok(true)
        }
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(err) => err_at!(IOError, Err(err)),
    }
}

fn write_group<W1, W2>(
    iw: &mut W1,
    bw: &mut W2,
    key: u64,
    vals: &mut Vec<u64>,
    dedup: bool,
    bpos: u64,
) -> Result<u64>
where
    W1: io::Write,
    W2: io::Write,
{
    if dedup {
        vals.sort_unstable();
        vals.dedup();
    }

    let mut block = Vec::with_capacity(4 + vals.len() * 8);
    block.extend_from_slice(&(vals.len() as i32).to_be_bytes());
    for value in vals.iter() {
        block.extend_from_slice(&value.to_be_bytes());
    }
    err_at!(IOError, bw.write_all(&block))?;

    let mut entry = Vec::with_capacity(ENTRY_SIZE);
    entry.extend_from_slice(&key.to_be_bytes());
    entry.extend_from_slice(&bpos.to_be_bytes());
    err_at!(IOError, iw.write_all(&entry))?;

    vals.clear();
    Ok(bpos + (block.len() as u64))
}

fn heap_push(
    heap: &mut Vec<usize>,
    heads: &[(u64, u64)],
    cmp: &KeyCmp,
    cache: &Cache,
    run: usize,
) -> Result<()> {
    heap.push(run);
    let mut pos = heap.len() - 1;
    while pos > 0 {
        let parent = (pos - 1) / 2;
        let ord = cmp.compare(heads[heap[parent]].0, heads[heap[pos]].0, cache)?;
        if ord == cmp::Ordering::Greater {
            heap.swap(parent, pos);
            pos = parent;
        } else {
            break;
        }
    }
    Ok(())
}

fn heap_pop(
    heap: &mut Vec<usize>,
    heads: &[(u64, u64)],
    cmp: &KeyCmp,
    cache: &Cache,
) -> Result<usize> {
    let top = heap[0];
    let last = heap.pop().unwrap();
    if !heap.is_empty() {
        heap[0] = last;
        let mut pos = 0;
        loop {
            let (l, r) = (2 * pos + 1, 2 * pos + 2);
            let mut smallest = pos;
            if l < heap.len() {
                let ord = cmp.compare(heads[heap[l]].0, heads[heap[smallest]].0, cache)?;
                if ord == cmp::Ordering::Less {
                    smallest = l;
                }
            }
            if r < heap.len() {
                let ord = cmp.compare(heads[heap[r]].0, heads[heap[smallest]].0, cache)?;
                if ord == cmp::Ordering::Less {
                    smallest = r;
                }
            }
            if smallest == pos {
                break;
            }
            heap.swap(pos, smallest);
            pos = smallest;
        }
    }
    Ok(top)
}

fn scratch_loc(tag: &str) -> ffi::OsString {
    static SEQ: AtomicUsize = AtomicUsize::new(0);

    let name = format!("gitcat-{}-{}.{}", std::process::id(), SEQ.fetch_add(1, SeqCst), tag);
    let loc: path::PathBuf = [env::temp_dir(), name.into()].iter().collect();
    loc.into_os_string()
}

#[cfg(test)]
#[path = "indexer_test.rs"]
mod indexer_test;
