use serde::de::DeserializeOwned;

use std::{ffi, fs, path};

use crate::{err_at, Error, Result};

/// Macro to read `n` bytes at `fpos` out of a positioned file,
/// failing on short reads.
#[macro_export]
macro_rules! read_file {
    ($fd:expr, $fpos:expr, $n:expr, $msg:expr) => {{
        use std::convert::TryFrom;
        use std::os::unix::fs::FileExt;

        let mut buf = vec![0; usize::try_from($n).unwrap()];
        match $fd.read_at(&mut buf, $fpos) {
            Ok(n) if buf.len() == n => Ok(buf),
            Ok(n) => {
                let m = buf.len();
                err_at!(Fatal, msg: concat!($msg, " {}/{} at {}"), m, n, $fpos)
            }
            Err(err) => err_at!(IOError, Err(err)),
        }
    }};
}

/// Macro to write a buffer at `fpos` into a positioned file, failing
/// on short writes.
#[macro_export]
macro_rules! write_file {
    ($fd:expr, $fpos:expr, $buffer:expr, $msg:expr) => {{
        use std::os::unix::fs::FileExt;

        match err_at!(IOError, $fd.write_at($buffer, $fpos))? {
            n if $buffer.len() == n => Ok(n),
            n => err_at!(
                Fatal, msg: "partial-wr {}, {}/{}", $msg, $buffer.len(), n
            ),
        }
    }};
}

/// Create a fresh file in read-write mode, removing any stale file at
/// the same location and creating parent directories as needed.
pub fn create_file_rw(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = {
        let os_file = path::Path::new(file);
        fs::remove_file(os_file).ok(); // NOTE: ignore remove errors.
        os_file
    };

    {
        let parent = match os_file.parent() {
            Some(parent) => Ok(parent),
            None => err_at!(InvalidFile, msg: "{:?}", file),
        }?;
        err_at!(IOError, fs::create_dir_all(parent))?;
    };

    let mut opts = fs::OpenOptions::new();
    Ok(err_at!(
        IOError,
        opts.read(true).write(true).create_new(true).open(os_file)
    )?)
}

/// Open an existing file in read-write mode, without truncating.
pub fn open_file_rw(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);
    let mut opts = fs::OpenOptions::new();
    Ok(err_at!(IOError, opts.read(true).write(true).open(os_file))?)
}

/// Open a file for reading.
pub fn open_file_r(file: &ffi::OsStr) -> Result<fs::File> {
    let os_file = path::Path::new(file);
    Ok(err_at!(
        IOError,
        fs::OpenOptions::new().read(true).open(os_file)
    )?)
}

/// Load a toml file and parse it into type `T`.
pub fn load_toml<P, T>(loc: P) -> Result<T>
where
    P: AsRef<path::Path>,
    T: DeserializeOwned,
{
    use std::str::from_utf8;

    let ploc: &path::Path = loc.as_ref();
    let data = err_at!(IOError, fs::read(ploc))?;
    let s = err_at!(FailConvert, from_utf8(&data), "not utf8 for {:?}", ploc)?;
    err_at!(FailConvert, toml::from_str(s), "file:{:?}", ploc)
}

#[cfg(test)]
#[path = "files_test.rs"]
mod files_test;
