//! Module `lazy` implement the on-demand record reader.
//!
//! A [Lazy] points at a binary record inside a file and materialises
//! only the fields the caller actually asks for, reading them through
//! the [Cache]. Field offsets are computed once and cached in a
//! running table; variable-length fields recursively materialise the
//! length member that sizes them. Members changed with [Lazy::set] are
//! written back in place by [Lazy::flush].

use std::{fs, sync::Arc};

use crate::{
    cache::Cache,
    err_at,
    format::{self, Format, Record, Value},
    util::Kind,
    Date, Error, Result,
};

/// Transient accessor over one on-disk binary record. Cheap to build
/// and cheaper to [retarget][Lazy::retarget], it owns neither the file
/// nor the descriptor schema.
pub struct Lazy {
    file: Arc<fs::File>,
    format: Format,
    rec: Record,
    loaded: Vec<bool>,
    dirty: Vec<bool>,
    // offsets[0] is the record base; offsets[i+1] = offsets[i] +
    // width(field_i); valid up to index `upto`.
    offsets: Vec<u64>,
    upto: usize,
}

impl Lazy {
    /// Create a lazy over the record at `fpos`. Only binary formats
    /// have computable field widths, anything else is refused.
    pub fn new(file: Arc<fs::File>, fpos: u64, format: &Format) -> Result<Lazy> {
        if !format.is_binary() {
            return err_at!(Fatal, msg: "lazy needs a binary format");
        }

        let members = format.members();
        let mut offsets = vec![0; members + 1];
        offsets[0] = fpos;

        Ok(Lazy {
            file,
            format: format.clone(),
            rec: format.new_record(),
            loaded: vec![false; members],
            dirty: vec![false; members],
            offsets,
            upto: 0,
        })
    }

    /// Point this lazy at another record, possibly in another file.
    /// All materialised state is discarded.
    pub fn retarget(&mut self, file: Arc<fs::File>, fpos: u64) {
        self.file = file;
        self.rec.iter_mut().for_each(|value| *value = Value::Nil);
        self.loaded.iter_mut().for_each(|b| *b = false);
        self.dirty.iter_mut().for_each(|b| *b = false);
        self.offsets[0] = fpos;
        self.upto = 0;
    }

    /// Discard every materialised field but keep the target and the
    /// offset table, so the next reads come fresh from the cache.
    pub fn rebind(&mut self) {
        self.rec.iter_mut().for_each(|value| *value = Value::Nil);
        self.loaded.iter_mut().for_each(|b| *b = false);
        self.dirty.iter_mut().for_each(|b| *b = false);
    }

    /// The record's base offset.
    pub fn to_fpos(&self) -> u64 {
        self.offsets[0]
    }

    // advance the offset table so that offsets[0..=upto] are valid,
    // materialising length members of variable fields on the way.
    fn load_offsets(&mut self, upto: usize, cache: &Cache) -> Result<()> {
        while self.upto < upto {
            let i = self.upto;
            let field = self.format.field(i);
            let width = match field.width() {
                0 => {
                    // a variable field; its length member precedes it,
                    // so the offset recursion below cannot overrun i.
                    let length = self.format.length_member_of(i).unwrap();
                    let n = self.get_int(length, cache)?;
                    if n < 0 {
                        return err_at!(InvalidFormat, msg: "negative length {}", n);
                    }
                    (n as usize) * field.elem_width()
                }
                n => n,
            };
            self.offsets[i + 1] = self.offsets[i] + (width as u64);
            self.upto = i + 1;
        }
        Ok(())
    }

    fn materialise(&mut self, i: usize, cache: &Cache) -> Result<()> {
        if self.loaded[i] {
            return Ok(());
        }
        self.load_offsets(i + 1, cache)?;

        let width = (self.offsets[i + 1] - self.offsets[i]) as usize;
        let mut buf = vec![0; width];
        cache.get_str(&self.file, self.offsets[i], &mut buf)?;

        self.rec[i] = format::read_binary_member(self.format.field(i), &buf)?;
        self.loaded[i] = true;
        Ok(())
    }

    /// Materialise and return field `i`.
    pub fn get(&mut self, i: usize, cache: &Cache) -> Result<&Value> {
        self.materialise(i, cache)?;
        Ok(&self.rec[i])
    }

    pub fn get_int(&mut self, i: usize, cache: &Cache) -> Result<i32> {
        self.materialise(i, cache)?;
        self.rec[i].as_int()
    }

    pub fn get_bool(&mut self, i: usize, cache: &Cache) -> Result<bool> {
        self.materialise(i, cache)?;
        self.rec[i].as_bool()
    }

    pub fn get_kind(&mut self, i: usize, cache: &Cache) -> Result<Kind> {
        self.materialise(i, cache)?;
        self.rec[i].as_kind()
    }

    pub fn get_date(&mut self, i: usize, cache: &Cache) -> Result<Date> {
        self.materialise(i, cache)?;
        self.rec[i].as_date()
    }

    pub fn get_str(&mut self, i: usize, cache: &Cache) -> Result<&str> {
        self.materialise(i, cache)?;
        self.rec[i].as_str()
    }

    pub fn get_opt_str(&mut self, i: usize, cache: &Cache) -> Result<Option<&str>> {
        self.materialise(i, cache)?;
        Ok(self.rec[i].opt_str())
    }

    pub fn get_ids(&mut self, i: usize, cache: &Cache) -> Result<&[i32]> {
        self.materialise(i, cache)?;
        self.rec[i].as_ids()
    }

    /// Overwrite field `i` in the record buffer and mark it dirty.
    /// The new value reaches the file on [Lazy::flush].
    pub fn set(&mut self, i: usize, value: Value) {
        self.rec[i] = value;
        self.loaded[i] = true;
        self.dirty[i] = true;
    }

    /// File position of field `i`.
    pub fn offset_of(&mut self, i: usize, cache: &Cache) -> Result<u64> {
        self.load_offsets(i, cache)?;
        Ok(self.offsets[i])
    }

    /// File position just after the record, which is also the base of
    /// the next record in a sequential scan.
    pub fn offset_after(&mut self, cache: &Cache) -> Result<u64> {
        self.offset_of(self.format.members(), cache)
    }

    /// Write every dirty member back at its known offset, through the
    /// cache.
    pub fn flush(&mut self, cache: &Cache) -> Result<()> {
        for i in 0..self.format.members() {
            if !self.dirty[i] {
                continue;
            }
            self.load_offsets(i + 1, cache)?;

            let mut buf = vec![];
            format::write_binary_member(self.format.field(i), &self.rec[i], &mut buf)?;
            cache.set_str(&self.file, self.offsets[i], &buf)?;
            self.dirty[i] = false;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "lazy_test.rs"]
mod lazy_test;
