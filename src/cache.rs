//! Module `cache` implement the shared page cache.
//!
//! The cache is the one I/O boundary between the catalog components
//! and the filesystem. Reads land in fixed-size pages keyed by
//! `(file, aligned-offset)`; writes mutate a page in place and mark it
//! dirty; the actual disk I/O happens on read-through misses and on
//! dirty write-back, when a page is evicted, flushed or the cache is
//! dropped.
//!
//! Concurrency follows the two-level locking the design calls for: a
//! cache-wide mutex guards the LRU list and the page map, per-page
//! mutexes guard the payloads. Locks are always taken cache-then-page,
//! and payload I/O happens under the page lock alone. The page count
//! must be at least the number of concurrently pinned pages; smaller
//! caches stay correct but thrash.

use log::{debug, error};

use std::{
    cmp,
    collections::HashMap,
    fs,
    os::unix::fs::FileExt,
    os::unix::io::{AsRawFd, RawFd},
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{err_at, util, Error, Result};

/// Size of one cache page, in bytes, also the unit of file I/O.
pub const PAGE_SIZE: usize = 1024;

const NIL: usize = usize::MAX;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
struct PageKey {
    fd: RawFd,
    fpos: u64, // aligned to PAGE_SIZE
}

impl PageKey {
    fn new(file: &fs::File, fpos: u64) -> PageKey {
        PageKey {
            fd: file.as_raw_fd(),
            fpos: fpos - fpos % (PAGE_SIZE as u64),
        }
    }
}

// LRU bookkeeping, guarded by the cache-wide mutex.
struct Lru {
    map: HashMap<PageKey, usize>,
    keys: Vec<Option<PageKey>>,
    prev: Vec<usize>,
    next: Vec<usize>,
    head: usize,
    tail: usize,
    hits: usize,
    misses: usize,
}

impl Lru {
    fn new(count: usize) -> Lru {
        let mut lru = Lru {
            map: HashMap::with_capacity(count),
            keys: vec![None; count],
            prev: (0..count).map(|i| i.wrapping_sub(1)).collect(),
            next: (1..=count).collect(),
            head: 0,
            tail: count - 1,
            hits: 0,
            misses: 0,
        };
        lru.prev[0] = NIL;
        lru.next[count - 1] = NIL;
        lru
    }

    // move slot to the most-recently-used end.
    fn touch(&mut self, slot: usize) {
        if slot == self.head {
            return;
        }
        if slot == self.tail {
            self.tail = self.prev[slot];
        } else {
            self.prev[self.next[slot]] = self.prev[slot];
        }
        self.next[self.prev[slot]] = self.next[slot];

        self.prev[slot] = NIL;
        self.next[slot] = self.head;
        self.prev[self.head] = slot;
        self.head = slot;
    }
}

// One page payload, guarded by its own mutex. `file` doubles as the
// write-back target for dirty data, it always matches the key the
// payload was loaded for.
struct Page {
    file: Option<Arc<fs::File>>,
    fpos: u64,
    loaded: bool,
    dirty: bool,
    data: Box<[u8]>,
}

impl Page {
    fn matches(&self, key: &PageKey) -> bool {
        match &self.file {
            Some(file) => file.as_raw_fd() == key.fd && self.fpos == key.fpos,
            None => false,
        }
    }

    fn write_back(&mut self) {
        if self.dirty {
            let file = self.file.as_ref().unwrap();
            if let Err(err) = file.write_at(&self.data, self.fpos) {
                error!(target: "cache", "write-back at {}: {}", self.fpos, err);
            }
            self.dirty = false;
        }
    }
}

/// Cache wide counters, for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct Stats {
    pub hits: usize,
    pub misses: usize,
}

/// File-agnostic LRU page cache. Shared across threads by reference.
pub struct Cache {
    lru: Mutex<Lru>,
    pages: Vec<Mutex<Page>>,
}

impl Drop for Cache {
    fn drop(&mut self) {
        if let Err(err) = self.flush_all() {
            error!(target: "cache", "flush on drop: {}", err);
        }
        let lru = self.lru.lock().unwrap();
        debug!(
            target: "cache",
            "dropping cache, {} pages in use, {} hits, {} misses",
            lru.map.len(), lru.hits, lru.misses
        );
    }
}

impl Cache {
    /// Create a cache holding `count` pages.
    pub fn new(count: usize) -> Result<Cache> {
        if count == 0 {
            return err_at!(Fatal, msg: "cache needs at least one page");
        }
        let pages = (0..count)
            .map(|_| {
                Mutex::new(Page {
                    file: None,
                    fpos: 0,
                    loaded: false,
                    dirty: false,
                    data: vec![0; PAGE_SIZE].into_boxed_slice(),
                })
            })
            .collect();

        Ok(Cache {
            lru: Mutex::new(Lru::new(count)),
            pages,
        })
    }

    pub fn to_stats(&self) -> Stats {
        let lru = self.lru.lock().unwrap();
        Stats { hits: lru.hits, misses: lru.misses }
    }

    // Pin the page covering `fpos`: look it up or claim the LRU
    // victim, then load it under the page lock. The cache-wide lock is
    // released before any I/O happens.
    fn pin(&self, file: &Arc<fs::File>, fpos: u64) -> Result<MutexGuard<Page>> {
        let key = PageKey::new(file, fpos);

        let mut lru = self.lru.lock().unwrap();
        let slot = match lru.map.get(&key).copied() {
            Some(slot) => {
                lru.hits += 1;
                slot
            }
            None => {
                lru.misses += 1;
                let slot = lru.tail;
                if let Some(old) = lru.keys[slot].take() {
                    lru.map.remove(&old);
                }
                lru.keys[slot] = Some(key);
                lru.map.insert(key, slot);
                slot
            }
        };
        lru.touch(slot);

        let mut page = self.pages[slot].lock().unwrap();
        std::mem::drop(lru);

        if !page.matches(&key) {
            page.write_back();
            page.file = Some(Arc::clone(file));
            page.fpos = key.fpos;
            page.loaded = false;
        }
        if !page.loaded {
            let n = err_at!(IOError, file.read_at(&mut page.data, key.fpos))?;
            // short read at end of file, null-fill the tail.
            page.data[n..].iter_mut().for_each(|b| *b = 0);
            page.loaded = true;
        }

        Ok(page)
    }

    /// Copy `buf.len()` bytes starting at `fpos` into `buf`. Bytes
    /// beyond the end of file read as zero.
    pub fn get_str(&self, file: &Arc<fs::File>, fpos: u64, buf: &mut [u8]) -> Result<()> {
        let mut off = 0;
        while off < buf.len() {
            let fpos = fpos + (off as u64);
            let at = (fpos % (PAGE_SIZE as u64)) as usize;
            let n = cmp::min(PAGE_SIZE - at, buf.len() - off);

            let page = self.pin(file, fpos)?;
            buf[off..off + n].copy_from_slice(&page.data[at..at + n]);
            off += n;
        }
        Ok(())
    }

    /// Fill `buf` with one line starting at `fpos`, stopping at a line
    /// break, a null byte, or the end of `buf`. Returns the number of
    /// bytes written; a trailing `\r` is dropped.
    pub fn get_line(&self, file: &Arc<fs::File>, fpos: u64, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        let mut fpos = fpos;

        'fill: while n < buf.len() {
            let at = (fpos % (PAGE_SIZE as u64)) as usize;
            let page = self.pin(file, fpos)?;
            for b in page.data[at..].iter() {
                if *b == b'\n' || *b == 0 || n >= buf.len() {
                    break 'fill;
                }
                buf[n] = *b;
                n += 1;
            }
            fpos += (PAGE_SIZE - at) as u64;
        }

        if n > 0 && buf[n - 1] == b'\r' {
            n -= 1;
        }
        Ok(n)
    }

    /// Big-endian i32 at `fpos`.
    pub fn get_int(&self, file: &Arc<fs::File>, fpos: u64) -> Result<i32> {
        let mut buf = [0_u8; 4];
        self.get_str(file, fpos, &mut buf)?;
        util::be_i32(&buf)
    }

    /// Big-endian u64 at `fpos`.
    pub fn get_pos(&self, file: &Arc<fs::File>, fpos: u64) -> Result<u64> {
        let mut buf = [0_u8; 8];
        self.get_str(file, fpos, &mut buf)?;
        util::be_u64(&buf)
    }

    /// Copy `buf` into the page(s) covering `fpos` and mark them
    /// dirty. The bytes reach the file on eviction or flush.
    pub fn set_str(&self, file: &Arc<fs::File>, fpos: u64, buf: &[u8]) -> Result<()> {
        let mut off = 0;
        while off < buf.len() {
            let fpos = fpos + (off as u64);
            let at = (fpos % (PAGE_SIZE as u64)) as usize;
            let n = cmp::min(PAGE_SIZE - at, buf.len() - off);

            let mut page = self.pin(file, fpos)?;
            page.data[at..at + n].copy_from_slice(&buf[off..off + n]);
            page.dirty = true;
            off += n;
        }
        Ok(())
    }

    /// Write back every dirty page of `file`.
    pub fn flush_file(&self, file: &fs::File) -> Result<()> {
        self.sweep(Some(file.as_raw_fd()), true, false)
    }

    /// Write back every dirty page.
    pub fn flush_all(&self) -> Result<()> {
        self.sweep(None, true, false)
    }

    /// Drop every page of `file` without writing back. For use after
    /// the file has been rewritten on disk behind the cache's back.
    pub fn refresh_file(&self, file: &fs::File) -> Result<()> {
        self.sweep(Some(file.as_raw_fd()), false, true)
    }

    /// Drop every page without writing back.
    pub fn refresh_all(&self) -> Result<()> {
        self.sweep(None, false, true)
    }

    /// Write back then drop every page of `file`.
    pub fn clear_file(&self, file: &fs::File) -> Result<()> {
        self.sweep(Some(file.as_raw_fd()), true, true)
    }

    /// Write back then drop every page.
    pub fn clear_all(&self) -> Result<()> {
        self.sweep(None, true, true)
    }

    // walk every assigned slot, write back and/or drop matching pages.
    // Holds the cache-wide lock across the walk so pages cannot be
    // rekeyed under our feet.
    fn sweep(&self, fd: Option<RawFd>, flush: bool, drop: bool) -> Result<()> {
        let mut lru = self.lru.lock().unwrap();
        for slot in 0..self.pages.len() {
            let key = match lru.keys[slot] {
                Some(key) if fd.map_or(true, |fd| fd == key.fd) => key,
                _ => continue,
            };
            let mut page = self.pages[slot].lock().unwrap();
            if flush {
                page.write_back();
            }
            if drop {
                page.file = None;
                page.loaded = false;
                page.dirty = false;
                lru.keys[slot] = None;
                lru.map.remove(&key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;
